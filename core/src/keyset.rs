use super::*;
use crate::key::{KeyData, KeyMetadata, KeyStatus, OutputPrefixType};

/// One key of a keyset: its material plus the metadata the primitive set needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub key_data: KeyData,
    pub key_id: u32,
    pub status: KeyStatus,
    pub output_prefix_type: OutputPrefixType,
}

impl Key {
    pub fn metadata(&self) -> KeyMetadata {
        KeyMetadata {
            key_type: self.key_data.type_url.clone(),
            key_id: self.key_id,
            status: self.status,
            output_prefix_type: self.output_prefix_type,
        }
    }
}

/// An ordered collection of keys, one of which is designated primary by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyset {
    pub primary_key_id: u32,
    pub keys: Vec<Key>,
}

/// A keyset with the key material stripped, safe to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysetInfo {
    pub primary_key_id: u32,
    pub keys: Vec<KeyMetadata>,
}

impl Keyset {
    pub fn info(&self) -> KeysetInfo {
        KeysetInfo {
            primary_key_id: self.primary_key_id,
            keys: self.keys.iter().map(Key::metadata).collect(),
        }
    }

    pub fn key(&self, key_id: u32) -> Option<&Key> {
        self.keys.iter().find(|k| k.key_id == key_id)
    }

    /// Checks the keyset is usable: it has keys, every key names its type,
    /// at least one key is enabled, and exactly one enabled key carries the primary id.
    pub fn validate(&self) -> Result<()> {
        if self.keys.is_empty() {
            return Err(Error::InvalidKeyset("keyset has no keys"));
        }

        let mut primaries = 0;
        let mut enabled = 0;
        for key in &self.keys {
            if key.key_data.type_url.is_empty() {
                return Err(Error::InvalidKeyset("key has no key type"));
            }
            if key.status != KeyStatus::Enabled {
                continue;
            }
            enabled += 1;
            if key.key_id == self.primary_key_id {
                primaries += 1;
            }
        }

        if enabled == 0 {
            return Err(Error::InvalidKeyset("keyset has no enabled keys"));
        }
        match primaries {
            0 => Err(Error::InvalidKeyset("keyset has no enabled primary key")),
            1 => Ok(()),
            _ => Err(Error::InvalidKeyset("keyset has multiple primary keys")),
        }
    }
}
