// Minimal primitive category for exercising the registry without real cryptography.

use super::*;
use crate::key::KeyData;
use crate::key_manager::KeyManager;
use crate::primitive_set::{Entry, PrimitiveSet};
use crate::wrapper::PrimitiveWrapper;

pub const ECHO_KEY_TYPE: &str = "test.EchoKey";

pub trait Echo: Send + Sync {
    fn echo(&self) -> &[u8];
}

pub struct EchoKey(pub Vec<u8>);

impl Echo for EchoKey {
    fn echo(&self) -> &[u8] {
        &self.0
    }
}

pub struct EchoKeyManager;

impl KeyManager<dyn Echo> for EchoKeyManager {
    fn key_type(&self) -> &str {
        ECHO_KEY_TYPE
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Box<dyn Echo>> {
        self.ensure_supported(key_data)?;
        if key_data.value.is_empty() {
            return Err(Error::InvalidKey("empty echo key".into()));
        }
        Ok(Box::new(EchoKey(key_data.value.to_vec())))
    }

    // The format is a single length byte
    fn new_key(&self, key_format: &[u8]) -> Result<KeyData> {
        let len = key_format.first().copied().unwrap_or(16);
        Ok(KeyData::new(ECHO_KEY_TYPE, vec![0xab; len as usize]))
    }
}

/// Same key type as [`EchoKeyManager`], different implementation.
pub struct OtherEchoKeyManager;

impl KeyManager<dyn Echo> for OtherEchoKeyManager {
    fn key_type(&self) -> &str {
        ECHO_KEY_TYPE
    }

    fn primitive(&self, _key_data: &KeyData) -> Result<Box<dyn Echo>> {
        Ok(Box::new(EchoKey(b"other".to_vec())))
    }

    fn new_key(&self, _key_format: &[u8]) -> Result<KeyData> {
        Err(Error::NewKeyForbidden(ECHO_KEY_TYPE.into()))
    }
}

pub struct EchoWrapper;

impl PrimitiveWrapper<dyn Echo> for EchoWrapper {
    fn wrap(&self, primitives: PrimitiveSet<dyn Echo>) -> Result<Box<dyn Echo>> {
        Ok(Box::new(WrappedEcho(primitives.primary()?.clone())))
    }
}

pub struct OtherEchoWrapper;

impl PrimitiveWrapper<dyn Echo> for OtherEchoWrapper {
    fn wrap(&self, _primitives: PrimitiveSet<dyn Echo>) -> Result<Box<dyn Echo>> {
        Ok(Box::new(EchoKey(b"other".to_vec())))
    }
}

struct WrappedEcho(Arc<Entry<dyn Echo>>);

impl Echo for WrappedEcho {
    fn echo(&self) -> &[u8] {
        self.0.primitive().echo()
    }
}
