#![allow(dead_code)]

use keyweave_core::{
    Error, Result,
    key::{KeyMetadata, KeyStatus, OutputPrefixType},
    primitive_set::{Entry, PrimitiveSet},
};
use keyweave_mac::Mac;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A MAC whose tag is its name wrapped around the data.
#[derive(Clone)]
pub struct DummyMac {
    name: String,
    verify_calls: Arc<AtomicUsize>,
}

impl DummyMac {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            verify_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn tag(&self, data: &[u8]) -> Vec<u8> {
        [self.name.as_bytes(), b"(", data, b")"].concat()
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl Mac for DummyMac {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.tag(data))
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if mac == self.tag(data) {
            Ok(())
        } else {
            Err(Error::VerificationFailed)
        }
    }
}

pub fn metadata(key_id: u32, output_prefix_type: OutputPrefixType) -> KeyMetadata {
    KeyMetadata::new("test.DummyMac", key_id, KeyStatus::Enabled, output_prefix_type)
}

pub fn add(
    primitives: &mut PrimitiveSet<dyn Mac>,
    mac: &DummyMac,
    key_id: u32,
    output_prefix_type: OutputPrefixType,
) -> Arc<Entry<dyn Mac>> {
    primitives
        .add_primitive(Box::new(mac.clone()), metadata(key_id, output_prefix_type))
        .expect("Failed to add primitive")
}
