//! Keepsake is a keyed state-archiving bridge: structured, immutable
//! application state declares how to persist and restore itself, so that
//! UI or process state survives destruction and re-creation events it
//! does not control.
//!
//! Core concepts:
//! - **Parcelable**: the capability a value type implements to make
//!   itself persistable via a holder
//! - **Holder**: a reference wrapper owning exactly one value for one
//!   encode/decode pass
//! - **Coder**: a transient session scoping the keyed fields of a single
//!   encode or decode operation
//! - **Variant registry**: process-wide mapping from stable type tag to
//!   decode entry point, used to recover concrete types dynamically at
//!   decode time
//!
//! # Example
//!
//! ```
//! use keepsake_core::parcelable;
//!
//! #[parcelable]
//! struct State {
//!     count: i32,
//! }
//!
//! let payload = keepsake_core::archive(&State { count: 42 }).unwrap();
//! let restored: Option<State> = keepsake_core::unarchive(&payload).unwrap();
//! assert_eq!(restored.unwrap().count, 42);
//! ```
//!
//! # Compatibility Note
//!
//! An archive is only guaranteed decodable by the exact encode/decode
//! pairing that produced it: same variant shape, same field order, same
//! type tags. Schema evolution across versions of a persisted variant is
//! the caller's responsibility.

mod archive;
mod coder;
mod entry;
mod holder;
mod parcelable;
pub mod registry;

pub use archive::{archive, unarchive};
pub use coder::{Coder, CoderError};
pub use holder::Holder;
pub use parcelable::Parcelable;

#[cfg(feature = "derive")]
pub use keepsake_derive::{parcelable, Parcelable};

// The derive macro expands to `keepsake_core::inventory::submit!`.
#[doc(hidden)]
pub use inventory;
