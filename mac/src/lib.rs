/*!
Message authentication codes over keysets.

[`register`] adds the HMAC key manager and the MAC wrapper to a
[`Registry`]; afterwards `registry.primitive::<dyn Mac>(&keyset)` returns one
[`Mac`] that tags with the keyset's primary key and verifies tags made by any
enabled key of the keyset.
*/

use keyweave_core::{
    Error, Result,
    key::{KeyData, KeyTemplate, OutputPrefixType},
    prefix,
    registry::Registry,
};
use std::sync::Arc;
use trace_err::*;
use tracing::{debug, trace};

mod config;
mod hmac_sha2;
mod wrapper;

pub mod templates;

pub use config::{Config, register, register_with};
pub use hmac_sha2::{HMAC_KEY_TYPE, HashType, HmacKeyFormat, HmacKeyManager, HmacMac};
pub use wrapper::MacWrapper;

/// Computes and verifies message authentication codes.
pub trait Mac: Send + Sync {
    /// Computes the MAC of `data`.
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Checks `mac` is a valid MAC of `data`, failing with [`Error::VerificationFailed`] otherwise.
    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()>;
}
