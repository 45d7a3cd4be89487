//! Process-wide mapping from stable type tags to decode entry points.
//!
//! The archiver knows nothing about the concrete-variant taxonomy of the
//! values it carries — it sees opaque holder entries and the type tag
//! archived with each one. The registry is the single bridge that lets a
//! decode pass, starting from bytes alone, recover the decode logic for
//! the variant those bytes were encoded from.
//!
//! Entries are collected at first use from every [`inventory::submit!`]
//! in the linked program (the derive macro emits one per variant), so
//! derived variants are decodable with no setup code. Hand-written
//! [`Parcelable`] impls call [`register`] during initialization, before
//! any decode that needs them can run.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use log::{debug, trace};

use crate::coder::{Coder, CoderError};
use crate::holder::Holder;
use crate::parcelable::Parcelable;

/// A decode entry point: reads one variant's declared fields from a
/// nested decode pass and reconstructs its holder.
pub type DecodeFn = fn(&Coder) -> Result<Holder, CoderError>;

/// A link-time registration record, submitted via `inventory`.
pub struct Variant {
    pub tag: &'static str,
    pub decode: DecodeFn,
}

impl Variant {
    /// The registration record for `T`, usable inside
    /// `inventory::submit!`.
    pub const fn of<T: Parcelable>() -> Self {
        Variant {
            tag: T::TYPE_TAG,
            decode: decode_holder::<T>,
        }
    }
}

inventory::collect!(Variant);

static REGISTRY: LazyLock<RwLock<HashMap<&'static str, DecodeFn>>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for variant in inventory::iter::<Variant> {
        map.insert(variant.tag, variant.decode);
    }
    debug!("variant registry initialized with {} entries", map.len());
    RwLock::new(map)
});

/// Registers `T`'s decode entry point under its type tag.
///
/// Registration and lookup are both safe to run concurrently, but the
/// registry is read-mostly state: register during initialization, before
/// the first decode that needs the entry. Re-registering a tag is a caller
/// error the registry does not detect; the last write wins.
pub fn register<T: Parcelable>() {
    trace!("registering variant {:?}", T::TYPE_TAG);
    REGISTRY
        .write()
        .unwrap()
        .insert(T::TYPE_TAG, decode_holder::<T>);
}

/// Looks up the decode entry point for a tag met at decode time.
/// `None` means the tag was never registered, which is an unrecoverable
/// fault for the pass that needed it.
pub(crate) fn lookup(tag: &str) -> Option<DecodeFn> {
    REGISTRY.read().unwrap().get(tag).copied()
}

/// Synthesizes a holder around `T`'s field-level decode.
fn decode_holder<T: Parcelable>(coder: &Coder) -> Result<Holder, CoderError> {
    Ok(Holder::new(T::decode(coder)?))
}
