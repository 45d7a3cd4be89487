use log::trace;

use crate::coder::{Coder, CoderError};
use crate::parcelable::Parcelable;

/// Key the single root value is archived under by [`archive`] /
/// [`unarchive`].
const ROOT_KEY: &str = "root";

/// Archives a single value into an opaque payload for the external
/// transport.
///
/// Convenience over running the pass by hand: wraps `value` in its holder
/// and encodes it under a fixed root key in a fresh encode pass.
pub fn archive<T: Parcelable>(value: &T) -> Result<Vec<u8>, CoderError> {
    trace!("archiving root value {:?}", T::TYPE_TAG);
    let mut coder = Coder::encoder();
    coder.encode_parcelable(Some(value), ROOT_KEY)?;
    coder.into_payload()
}

/// Restores the value archived by [`archive`], narrowed to `T`.
///
/// Returns `Ok(None)` when the archived variant does not match `T` —
/// callers treat that as "no saved state under this shape" and compose
/// their own recovery, typically falling back to first-launch defaults.
/// Malformed bytes and unregistered tags fail the pass.
pub fn unarchive<T: Parcelable>(payload: &[u8]) -> Result<Option<T>, CoderError> {
    let coder = Coder::from_payload(payload)?;
    coder.decode_parcelable::<T>(ROOT_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry;

    #[derive(Debug, Clone, PartialEq)]
    struct State {
        count: i32,
    }

    impl Parcelable for State {
        const TYPE_TAG: &'static str = "test.archive.State";

        fn encode(&self, coder: &mut Coder) -> Result<(), CoderError> {
            coder.encode_int(self.count, "count")
        }

        fn decode(coder: &Coder) -> Result<Self, CoderError> {
            Ok(State {
                count: coder.decode_int("count")?,
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Other {
        label: String,
    }

    impl Parcelable for Other {
        const TYPE_TAG: &'static str = "test.archive.Other";

        fn encode(&self, coder: &mut Coder) -> Result<(), CoderError> {
            coder.encode_string(&self.label, "label")
        }

        fn decode(coder: &Coder) -> Result<Self, CoderError> {
            Ok(Other {
                label: coder.decode_string("label")?,
            })
        }
    }

    #[test]
    fn archive_roundtrip() {
        registry::register::<State>();

        let payload = archive(&State { count: 42 }).unwrap();
        let restored = unarchive::<State>(&payload).unwrap();
        assert_eq!(restored, Some(State { count: 42 }));
    }

    #[test]
    fn archive_shape_mismatch_falls_back() {
        registry::register::<State>();
        registry::register::<Other>();

        let payload = archive(&State { count: 42 }).unwrap();

        // Saved state has a different shape than requested: treat as
        // first launch.
        let restored = unarchive::<Other>(&payload).unwrap();
        let state = restored.unwrap_or(Other {
            label: "default".to_string(),
        });
        assert_eq!(state.label, "default");
    }

    #[test]
    fn unarchive_garbage_fails() {
        let err = unarchive::<State>(b"not an archive").unwrap_err();
        assert!(matches!(err, CoderError::Payload(_)));
    }
}
