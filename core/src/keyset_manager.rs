use super::*;
use crate::key::{KeyStatus, KeyTemplate};
use crate::keyset::{Key, Keyset};
use crate::registry::Registry;
use zeroize::Zeroizing;

/// Builds and rotates a [`Keyset`].
///
/// The primary key can never be disabled, destroyed or deleted; promote
/// another key with [`set_primary`](Self::set_primary) first.
#[derive(Debug, Default)]
pub struct KeysetManager {
    keyset: Keyset,
}

impl KeysetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_keyset(keyset: Keyset) -> Self {
        Self { keyset }
    }

    pub fn keyset(&self) -> &Keyset {
        &self.keyset
    }

    pub fn into_keyset(self) -> Keyset {
        self.keyset
    }

    /// Generates a new enabled key from `template`, returning its key id.
    pub fn add(&mut self, registry: &Registry, template: &KeyTemplate) -> Result<u32> {
        let key_data = registry.new_key_data(template)?;
        let key_id = self.unused_key_id();
        self.keyset.keys.push(Key {
            key_data,
            key_id,
            status: KeyStatus::Enabled,
            output_prefix_type: template.output_prefix_type,
        });
        debug!("Added key {key_id} of type {}", template.type_url);
        Ok(key_id)
    }

    /// As [`add`](Self::add), then makes the new key primary.
    pub fn add_primary(&mut self, registry: &Registry, template: &KeyTemplate) -> Result<u32> {
        let key_id = self.add(registry, template)?;
        self.set_primary(key_id)?;
        Ok(key_id)
    }

    pub fn set_primary(&mut self, key_id: u32) -> Result<()> {
        let key = self.key_mut(key_id)?;
        if key.status != KeyStatus::Enabled {
            return Err(Error::KeyNotEnabled(key_id));
        }
        self.keyset.primary_key_id = key_id;
        Ok(())
    }

    pub fn enable(&mut self, key_id: u32) -> Result<()> {
        let key = self.key_mut(key_id)?;
        if key.status == KeyStatus::Destroyed {
            return Err(Error::KeyDestroyed(key_id));
        }
        key.status = KeyStatus::Enabled;
        Ok(())
    }

    pub fn disable(&mut self, key_id: u32) -> Result<()> {
        self.ensure_not_primary(key_id)?;
        let key = self.key_mut(key_id)?;
        if key.status == KeyStatus::Destroyed {
            return Err(Error::KeyDestroyed(key_id));
        }
        key.status = KeyStatus::Disabled;
        Ok(())
    }

    /// Drops the key material but keeps the key id reserved.
    pub fn destroy(&mut self, key_id: u32) -> Result<()> {
        self.ensure_not_primary(key_id)?;
        let key = self.key_mut(key_id)?;
        key.key_data.value = Zeroizing::new(Vec::new());
        key.status = KeyStatus::Destroyed;
        debug!("Destroyed key {key_id}");
        Ok(())
    }

    pub fn delete(&mut self, key_id: u32) -> Result<()> {
        self.ensure_not_primary(key_id)?;
        let idx = self
            .keyset
            .keys
            .iter()
            .position(|k| k.key_id == key_id)
            .ok_or(Error::NoSuchKey(key_id))?;
        self.keyset.keys.remove(idx);
        debug!("Deleted key {key_id}");
        Ok(())
    }

    fn ensure_not_primary(&self, key_id: u32) -> Result<()> {
        if self.keyset.primary_key_id == key_id && self.keyset.key(key_id).is_some() {
            Err(Error::PrimaryKey(key_id))
        } else {
            Ok(())
        }
    }

    fn key_mut(&mut self, key_id: u32) -> Result<&mut Key> {
        self.keyset
            .keys
            .iter_mut()
            .find(|k| k.key_id == key_id)
            .ok_or(Error::NoSuchKey(key_id))
    }

    fn unused_key_id(&self) -> u32 {
        loop {
            let key_id = rand::random::<u32>();
            if self.is_available(key_id) {
                return key_id;
            }
        }
    }

    // Until a primary is set the default primary id names no key, so it is never handed out
    fn is_available(&self, key_id: u32) -> bool {
        key_id != self.keyset.primary_key_id && self.keyset.key(key_id).is_none()
    }
}
