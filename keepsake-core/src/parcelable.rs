use std::fmt::Debug;

use crate::coder::{Coder, CoderError};
use crate::holder::Holder;

/// The capability a state value implements to make itself persistable.
///
/// A parcelable value is an immutable snapshot belonging to exactly one
/// concrete variant. It declares the ordered set of fields it persists:
/// `encode` writes them through the [`Coder`]'s primitive codec in a fixed
/// declared order, and `decode` reads the same keys in the same order to
/// reconstruct the value. Callers never enumerate variants themselves —
/// they operate through [`as_holder`](Parcelable::as_holder) when encoding
/// and through the variant registry when decoding.
///
/// `TYPE_TAG` is the stable identifier that associates this variant's
/// decode entry point with a registry entry. It travels in the archive, so
/// it must not change once data has been persisted under it.
///
/// Implementations are usually generated with `#[derive(Parcelable)]`,
/// which also registers the variant; hand-written impls must be registered
/// with [`registry::register`](crate::registry::register) before the first
/// decode that needs them.
///
/// # Example
///
/// ```
/// use keepsake_core::{Coder, CoderError, Parcelable};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct State {
///     count: i32,
/// }
///
/// impl Parcelable for State {
///     const TYPE_TAG: &'static str = "State";
///
///     fn encode(&self, coder: &mut Coder) -> Result<(), CoderError> {
///         coder.encode_int(self.count, "count")
///     }
///
///     fn decode(coder: &Coder) -> Result<Self, CoderError> {
///         Ok(State {
///             count: coder.decode_int("count")?,
///         })
///     }
/// }
/// ```
pub trait Parcelable: Debug + Clone + Send + Sync + 'static {
    /// Stable tag identifying this variant in archives.
    const TYPE_TAG: &'static str;

    /// Writes this value's declared fields into the coder, in declared
    /// order.
    fn encode(&self, coder: &mut Coder) -> Result<(), CoderError>;

    /// Reads the declared fields back, in the exact order used at encode,
    /// and reconstructs the value. Any field read failure fails the whole
    /// decode of this value; there is no partial-decode recovery.
    fn decode(coder: &Coder) -> Result<Self, CoderError>;

    /// Wraps a snapshot of this value in a [`Holder`] for one archiving
    /// pass.
    fn as_holder(&self) -> Holder {
        Holder::new(self.clone())
    }
}
