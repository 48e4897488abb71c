use super::*;
use zeroize::Zeroizing;

/// Lifecycle status of a key within a keyset. Only `Enabled` keys are usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStatus {
    Enabled,
    Disabled,
    Destroyed,
}

/// How a primitive's output is framed with a key identifying prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputPrefixType {
    /// No prefix, the output is the algorithm's raw bytes.
    Raw,
    /// Current prefix format, see [`prefix`].
    Tink,
    /// Older prefix format, also signals legacy input framing to wrappers.
    Legacy,
    /// Older prefix format, same prefix bytes as `Legacy`.
    Crunchy,
}

/// Everything about a key except its material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyMetadata {
    pub key_type: String,
    pub key_id: u32,
    pub status: KeyStatus,
    pub output_prefix_type: OutputPrefixType,
}

impl KeyMetadata {
    pub fn new(
        key_type: impl Into<String>,
        key_id: u32,
        status: KeyStatus,
        output_prefix_type: OutputPrefixType,
    ) -> Self {
        Self {
            key_type: key_type.into(),
            key_id,
            status,
            output_prefix_type,
        }
    }

    /// The output prefix for this key, empty for `Raw`.
    pub fn output_prefix(&self) -> Box<[u8]> {
        prefix::output_prefix(self.output_prefix_type, self.key_id)
    }
}

/// Serialized key material tagged with the key type identifier that can parse it.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyData {
    pub type_url: String,
    pub value: Zeroizing<Vec<u8>>,
}

impl KeyData {
    pub fn new(type_url: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            type_url: type_url.into(),
            value: Zeroizing::new(value),
        }
    }
}

impl std::fmt::Debug for KeyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyData")
            .field("type_url", &self.type_url)
            .field("value", &format_args!("<{} bytes>", self.value.len()))
            .finish()
    }
}

/// Describes how to generate a new key: the key type, its serialized key
/// format, and the output prefix type the new key should carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTemplate {
    pub type_url: String,
    pub value: Vec<u8>,
    pub output_prefix_type: OutputPrefixType,
}

impl KeyTemplate {
    pub fn new(
        type_url: impl Into<String>,
        value: Vec<u8>,
        output_prefix_type: OutputPrefixType,
    ) -> Self {
        Self {
            type_url: type_url.into(),
            value,
            output_prefix_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_data_debug_hides_material() {
        let data = KeyData::new("test.Key", b"super secret".to_vec());
        let s = format!("{data:?}");
        assert!(s.contains("test.Key"));
        assert!(s.contains("<12 bytes>"));
        assert!(!s.contains("secret"));
    }

    #[test]
    fn metadata_prefix_follows_type() {
        let raw = KeyMetadata::new("t", 7, KeyStatus::Enabled, OutputPrefixType::Raw);
        assert!(raw.output_prefix().is_empty());

        let tink = KeyMetadata::new("t", 7, KeyStatus::Enabled, OutputPrefixType::Tink);
        assert_eq!(tink.output_prefix().len(), prefix::PREFIX_SIZE);
    }
}
