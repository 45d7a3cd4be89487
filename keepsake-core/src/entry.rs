use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The keyed field namespace of one archiving pass.
///
/// Insertion order is preserved so fields travel in the order the variant
/// declares them.
pub(crate) type Fields = IndexMap<String, Entry>;

/// One archived field: a primitive, a nested holder, or an explicit
/// absent marker.
///
/// Every entry carries its kind on the wire, so a decode that asks for the
/// wrong primitive kind is detectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum Entry {
    Int(i32),
    Bool(bool),
    Text(Utf8Buf),
    Parcel { tag: String, fields: Fields },
    Absent,
}

impl Entry {
    /// Wire-kind name, used in error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Entry::Int(_) => "int",
            Entry::Bool(_) => "bool",
            Entry::Text(_) => "string",
            Entry::Parcel { .. } => "parcelable",
            Entry::Absent => "absent",
        }
    }
}

/// A length-bearing UTF-8 byte buffer.
///
/// Text is transcoded to bytes before archiving because the archiver's
/// native string representation is not trusted to preserve arbitrary or
/// empty strings across the bridge. Serialized as a CBOR byte string
/// (major type 2), not as an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Utf8Buf(Vec<u8>);

impl Utf8Buf {
    pub(crate) fn from_str(text: &str) -> Self {
        Utf8Buf(text.as_bytes().to_vec())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Utf8Buf {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Utf8Buf {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BufVisitor;

        impl<'de> serde::de::Visitor<'de> for BufVisitor {
            type Value = Utf8Buf;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("byte buffer")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Utf8Buf(v.to_vec()))
            }

            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Utf8Buf(v))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                Ok(Utf8Buf(bytes))
            }
        }

        deserializer.deserialize_bytes(BufVisitor)
    }
}
