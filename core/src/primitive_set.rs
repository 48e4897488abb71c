use super::*;
use crate::key::{KeyMetadata, KeyStatus, OutputPrefixType};
use std::collections::HashMap;

/// A single-key primitive together with the metadata of the key that built it.
///
/// Entries are created by [`PrimitiveSet::add_primitive`] and never change afterwards.
pub struct Entry<P: ?Sized> {
    primitive: Box<P>,
    metadata: KeyMetadata,
    identifier: Box<[u8]>,
}

impl<P: ?Sized> Entry<P> {
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn metadata(&self) -> &KeyMetadata {
        &self.metadata
    }

    pub fn key_id(&self) -> u32 {
        self.metadata.key_id
    }

    pub fn output_prefix_type(&self) -> OutputPrefixType {
        self.metadata.output_prefix_type
    }

    /// The output prefix of this entry's key, empty for `Raw` keys.
    pub fn identifier(&self) -> &[u8] {
        &self.identifier
    }
}

impl<P: ?Sized> std::fmt::Debug for Entry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("metadata", &self.metadata)
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// The primitives built from one keyset, indexed by output prefix, with at most one primary.
///
/// A set is built once with [`add_primitive`](Self::add_primitive) and
/// [`set_primary`](Self::set_primary), then handed to a wrapper which shares it
/// read-only for the lifetime of the composite primitive.
pub struct PrimitiveSet<P: ?Sized> {
    entries: Vec<Arc<Entry<P>>>,
    buckets: HashMap<Box<[u8]>, Vec<Arc<Entry<P>>>>,
    primary: Option<Arc<Entry<P>>>,
}

impl<P: ?Sized> Default for PrimitiveSet<P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            buckets: HashMap::new(),
            primary: None,
        }
    }
}

impl<P: ?Sized> PrimitiveSet<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a primitive built from an enabled key, returning the handle to pass to [`set_primary`](Self::set_primary).
    pub fn add_primitive(
        &mut self,
        primitive: Box<P>,
        metadata: KeyMetadata,
    ) -> Result<Arc<Entry<P>>> {
        if metadata.status != KeyStatus::Enabled {
            return Err(Error::KeyNotEnabled(metadata.key_id));
        }

        let entry = Arc::new(Entry {
            primitive,
            identifier: metadata.output_prefix(),
            metadata,
        });

        trace!(
            "Added key {} ({:?}) to primitive set",
            entry.key_id(),
            entry.output_prefix_type()
        );

        self.buckets
            .entry(entry.identifier.clone())
            .or_default()
            .push(entry.clone());
        self.entries.push(entry.clone());
        Ok(entry)
    }

    pub fn set_primary(&mut self, entry: &Arc<Entry<P>>) -> Result<()> {
        if !self.entries.iter().any(|e| Arc::ptr_eq(e, entry)) {
            return Err(Error::ForeignEntry);
        }
        self.primary = Some(entry.clone());
        Ok(())
    }

    pub fn primary(&self) -> Result<&Arc<Entry<P>>> {
        self.primary.as_ref().ok_or(Error::NoPrimary)
    }

    /// All entries whose output prefix is `prefix`, in insertion order.
    pub fn primitives(&self, prefix: &[u8]) -> &[Arc<Entry<P>>] {
        self.buckets.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All entries of `Raw` keys, in insertion order.
    pub fn raw_primitives(&self) -> &[Arc<Entry<P>>] {
        self.primitives(prefix::RAW_PREFIX)
    }

    /// Every entry, in insertion order.
    pub fn all(&self) -> &[Arc<Entry<P>>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: ?Sized> std::fmt::Debug for PrimitiveSet<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveSet")
            .field("entries", &self.entries)
            .field("primary", &self.primary.as_ref().map(|e| e.key_id()))
            .finish()
    }
}
