use std::any::Any;
use std::fmt;

use crate::coder::{Coder, CoderError};
use crate::parcelable::Parcelable;

/// Object-safe view of a parcelable value, so holders of different
/// variants share one wrapper type.
trait ErasedValue: Send + Sync {
    fn type_tag(&self) -> &'static str;
    fn encode_with_coder(&self, coder: &mut Coder) -> Result<(), CoderError>;
    fn debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Parcelable> ErasedValue for T {
    fn type_tag(&self) -> &'static str {
        T::TYPE_TAG
    }

    fn encode_with_coder(&self, coder: &mut Coder) -> Result<(), CoderError> {
        self.encode(coder)
    }

    fn debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A reference wrapper exclusively owning one parcelable value for the
/// duration of a single encode or decode call.
///
/// The archiver only manipulates opaque reference objects; the holder is
/// the bridge between those and the value-semantics world of
/// [`Parcelable`] types. A holder wraps exactly one value — never zero,
/// never multiple — is never shared, and is never mutated after
/// construction. It is created transiently around one
/// [`encode_parcelable`](Coder::encode_parcelable) call, or synthesized by
/// a registered decode entry point, and discarded as soon as its value has
/// been handed to the caller.
pub struct Holder {
    inner: Box<dyn ErasedValue>,
}

impl Holder {
    /// Wraps a value for one archiving pass.
    pub fn new<T: Parcelable>(value: T) -> Self {
        Holder {
            inner: Box::new(value),
        }
    }

    /// The wrapped variant's stable type tag, as archived alongside the
    /// holder's fields.
    pub fn type_tag(&self) -> &'static str {
        self.inner.type_tag()
    }

    /// Writes the wrapped value's declared fields into the coder, in the
    /// variant's fixed declared order.
    pub fn encode_with_coder(&self, coder: &mut Coder) -> Result<(), CoderError> {
        self.inner.encode_with_coder(coder)
    }

    /// Borrows the owned value narrowed to `T`, or `None` if the wrapped
    /// variant is not `T`.
    pub fn downcast_ref<T: Parcelable>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Unwraps the owned value narrowed to `T`.
    ///
    /// Returns `None` when the wrapped variant is not `T`; the mismatch is
    /// a checked outcome, mirroring
    /// [`decode_parcelable`](Coder::decode_parcelable).
    pub fn into_value<T: Parcelable>(self) -> Option<T> {
        self.inner.into_any().downcast::<T>().ok().map(|b| *b)
    }
}

impl fmt::Debug for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Holder")
            .field("type_tag", &self.inner.type_tag())
            .field("value", &DebugValue(self.inner.as_ref()))
            .finish()
    }
}

struct DebugValue<'a>(&'a dyn ErasedValue);

impl fmt::Debug for DebugValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.debug(f)
    }
}
