/*!
Key manager registry and primitive-set wrapping.

A [`registry::Registry`] maps key type identifiers to [`key_manager::KeyManager`]s
and primitive categories to [`wrapper::PrimitiveWrapper`]s. Every enabled key of a
[`keyset::Keyset`] becomes one entry of a [`primitive_set::PrimitiveSet`], and the
category's wrapper turns that set into one composite primitive that produces
output with the primary key and verifies against any key in the set.
*/

use std::sync::Arc;
use trace_err::*;
use tracing::{debug, info, trace};

mod error;

pub mod key;
pub mod key_manager;
pub mod keyset;
pub mod keyset_manager;
pub mod prefix;
pub mod primitive_set;
pub mod registry;
pub mod wrapper;

#[cfg(test)]
mod test_util;

pub use error::{CaptureFieldErr, Error, ErrorKind};

/// A specialized `Result` type for registry and keyset operations.
pub type Result<T> = core::result::Result<T, Error>;

pub mod prelude {
    pub use super::key::{KeyData, KeyMetadata, KeyStatus, KeyTemplate, OutputPrefixType};
    pub use super::key_manager::KeyManager;
    pub use super::keyset::{Key, Keyset, KeysetInfo};
    pub use super::keyset_manager::KeysetManager;
    pub use super::primitive_set::{Entry, PrimitiveSet};
    pub use super::registry::Registry;
    pub use super::wrapper::PrimitiveWrapper;
    pub use super::{Error, ErrorKind, Result};
}
