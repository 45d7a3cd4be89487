use log::trace;

use crate::entry::{Entry, Fields, Utf8Buf};
use crate::parcelable::Parcelable;
use crate::registry;

/// Error type for archiving passes.
///
/// Every variant is fatal to the pass that raised it and to nothing else;
/// a failed pass never corrupts other passes or the variant registry. Note
/// that a type mismatch on [`Coder::decode_parcelable`] is not an error at
/// all — it surfaces as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum CoderError {
    /// A non-nullable decode requested a key never encoded in this pass.
    #[error("missing key: {0:?}")]
    MissingKey(String),
    /// The key exists but was archived as a different primitive kind.
    #[error("wrong kind for key {key:?}: expected {expected}, found {found}")]
    WrongKind {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    /// An encode pass wrote the same key twice.
    #[error("duplicate key in encode pass: {0:?}")]
    DuplicateKey(String),
    /// An encode operation on a decode pass, or vice versa.
    #[error("{op} called on a {mode} pass")]
    WrongPass { op: &'static str, mode: &'static str },
    /// A nested holder's type tag has no registered decode entry point.
    #[error("no decoder registered for type tag {0:?}")]
    UnknownTag(String),
    /// The archive bytes are not a well-formed payload.
    #[error("malformed archive payload: {0}")]
    Payload(String),
}

/// Whether this coder is the encode or the decode half of a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Encoding,
    Decoding,
}

impl Mode {
    fn name(self) -> &'static str {
        match self {
            Mode::Encoding => "encode",
            Mode::Decoding => "decode",
        }
    }
}

/// A transient session scoping the keyed fields of a single encode or
/// decode operation.
///
/// A coder represents exactly one pass: it is created either empty for
/// encoding ([`Coder::encoder`]) or from archive bytes for decoding
/// ([`Coder::from_payload`]), and is consumed when the pass completes.
/// Decode must use the identical keys, in the identical per-variant order,
/// that encode used; keys must be unique within one pass.
///
/// # Example
///
/// ```
/// use keepsake_core::Coder;
///
/// let mut coder = Coder::encoder();
/// coder.encode_int(42, "count").unwrap();
/// coder.encode_bool(true, "dirty").unwrap();
/// let payload = coder.into_payload().unwrap();
///
/// let coder = Coder::from_payload(&payload).unwrap();
/// assert_eq!(coder.decode_int("count").unwrap(), 42);
/// assert_eq!(coder.decode_bool("dirty").unwrap(), true);
/// ```
pub struct Coder {
    mode: Mode,
    fields: Fields,
}

impl Coder {
    /// Creates a coder for one encode pass.
    pub fn encoder() -> Self {
        Coder {
            mode: Mode::Encoding,
            fields: Fields::new(),
        }
    }

    /// Creates a coder for one decode pass over the given archive bytes.
    pub fn from_payload(payload: &[u8]) -> Result<Self, CoderError> {
        let fields: Fields =
            ciborium::de::from_reader(payload).map_err(|e| CoderError::Payload(e.to_string()))?;
        trace!("decode pass opened with {} field(s)", fields.len());
        Ok(Coder::decoder(fields))
    }

    /// Creates a decode pass over an already-parsed field namespace.
    /// Used for the nested pass of each archived holder.
    pub(crate) fn decoder(fields: Fields) -> Self {
        Coder {
            mode: Mode::Decoding,
            fields,
        }
    }

    /// Finishes an encode pass, producing the opaque payload for the
    /// external transport. Consumes the coder; a pass is not reusable.
    pub fn into_payload(self) -> Result<Vec<u8>, CoderError> {
        self.require(Mode::Encoding, "into_payload")?;
        let mut payload = Vec::new();
        ciborium::ser::into_writer(&self.fields, &mut payload)
            .map_err(|e| CoderError::Payload(e.to_string()))?;
        trace!(
            "encode pass closed: {} field(s), {} byte(s)",
            self.fields.len(),
            payload.len()
        );
        Ok(payload)
    }

    /// Consumes an encode pass into its raw field namespace.
    /// Used when archiving this pass as a nested holder entry.
    pub(crate) fn into_fields(self) -> Fields {
        self.fields
    }

    fn require(&self, mode: Mode, op: &'static str) -> Result<(), CoderError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(CoderError::WrongPass {
                op,
                mode: self.mode.name(),
            })
        }
    }

    fn insert(&mut self, key: &str, entry: Entry, op: &'static str) -> Result<(), CoderError> {
        self.require(Mode::Encoding, op)?;
        if self.fields.contains_key(key) {
            return Err(CoderError::DuplicateKey(key.to_string()));
        }
        self.fields.insert(key.to_string(), entry);
        Ok(())
    }

    fn lookup(&self, key: &str, op: &'static str) -> Result<&Entry, CoderError> {
        self.require(Mode::Decoding, op)?;
        self.fields
            .get(key)
            .ok_or_else(|| CoderError::MissingKey(key.to_string()))
    }

    /// Encodes a fixed-width signed integer under `key`.
    pub fn encode_int(&mut self, value: i32, key: &str) -> Result<(), CoderError> {
        self.insert(key, Entry::Int(value), "encode_int")
    }

    /// Decodes the integer encoded under `key`.
    ///
    /// Fails with [`CoderError::MissingKey`] if the key was never encoded
    /// in this pass; there is no default-value fallback at this layer.
    pub fn decode_int(&self, key: &str) -> Result<i32, CoderError> {
        match self.lookup(key, "decode_int")? {
            Entry::Int(value) => Ok(*value),
            other => Err(CoderError::WrongKind {
                key: key.to_string(),
                expected: "int",
                found: other.kind(),
            }),
        }
    }

    /// Encodes a boolean under `key`.
    pub fn encode_bool(&mut self, value: bool, key: &str) -> Result<(), CoderError> {
        self.insert(key, Entry::Bool(value), "encode_bool")
    }

    /// Decodes the boolean encoded under `key`.
    pub fn decode_bool(&self, key: &str) -> Result<bool, CoderError> {
        match self.lookup(key, "decode_bool")? {
            Entry::Bool(value) => Ok(*value),
            other => Err(CoderError::WrongKind {
                key: key.to_string(),
                expected: "bool",
                found: other.kind(),
            }),
        }
    }

    /// Encodes text under `key`, transcoded to a length-bearing UTF-8
    /// byte buffer before it reaches the archiver.
    pub fn encode_string(&mut self, value: &str, key: &str) -> Result<(), CoderError> {
        self.insert(key, Entry::Text(Utf8Buf::from_str(value)), "encode_string")
    }

    /// Decodes the text encoded under `key`, reversing the transcoding
    /// exactly — including zero-length and multi-byte-codepoint text.
    pub fn decode_string(&self, key: &str) -> Result<String, CoderError> {
        match self.lookup(key, "decode_string")? {
            Entry::Text(buf) => String::from_utf8(buf.as_bytes().to_vec()).map_err(|_| {
                CoderError::Payload(format!("text under key {key:?} is not valid UTF-8"))
            }),
            other => Err(CoderError::WrongKind {
                key: key.to_string(),
                expected: "string",
                found: other.kind(),
            }),
        }
    }

    /// Encodes a persistable value under `key`.
    ///
    /// `None` archives an explicit "no value" marker for the key. `Some`
    /// wraps the value in its [`Holder`](crate::Holder), runs the holder's
    /// field-level encode in a nested pass, and archives the result
    /// together with the variant's stable type tag.
    pub fn encode_parcelable<T: Parcelable>(
        &mut self,
        value: Option<&T>,
        key: &str,
    ) -> Result<(), CoderError> {
        let entry = match value {
            None => Entry::Absent,
            Some(value) => {
                let holder = value.as_holder();
                let mut nested = Coder::encoder();
                holder.encode_with_coder(&mut nested)?;
                Entry::Parcel {
                    tag: holder.type_tag().to_string(),
                    fields: nested.into_fields(),
                }
            }
        };
        self.insert(key, entry, "encode_parcelable")
    }

    /// Decodes whatever holder is archived under `key` and narrows its
    /// owned value to `T`.
    ///
    /// Returns `Ok(None)` when nothing was archived under the key, when
    /// the absent marker was archived, and when the archived value's
    /// concrete variant does not match `T` — a mismatch is a normal,
    /// checked outcome, not a fault. An archived tag with no registered
    /// decode entry point is unrecoverable and fails the pass.
    pub fn decode_parcelable<T: Parcelable>(&self, key: &str) -> Result<Option<T>, CoderError> {
        self.require(Mode::Decoding, "decode_parcelable")?;
        let Some(entry) = self.fields.get(key) else {
            return Ok(None);
        };
        match entry {
            Entry::Parcel { tag, fields } => {
                let decode =
                    registry::lookup(tag).ok_or_else(|| CoderError::UnknownTag(tag.clone()))?;
                let nested = Coder::decoder(fields.clone());
                let holder = decode(&nested)?;
                Ok(holder.into_value::<T>())
            }
            // Absent marker or a primitive under this key: no value is
            // available under the requested shape.
            _ => Ok(None),
        }
    }
}
