use super::*;
use crate::key::KeyData;

/// Builds single-key primitives of category `P` for one key type.
///
/// Managers are stateless factories; a [`registry::Registry`] indexes them by [`key_type`](Self::key_type).
pub trait KeyManager<P: ?Sized>: Send + Sync {
    /// The key type identifier this manager handles.
    fn key_type(&self) -> &str;

    /// Builds a primitive from serialized key material.
    ///
    /// Fails with an `InvalidArgument` kind error if the key data is not of this
    /// manager's key type, or its value cannot be parsed.
    fn primitive(&self, key_data: &KeyData) -> Result<Box<P>>;

    /// Generates fresh key data from a serialized key format.
    fn new_key(&self, key_format: &[u8]) -> Result<KeyData>;

    fn does_support(&self, key_type: &str) -> bool {
        key_type == self.key_type()
    }

    fn ensure_supported(&self, key_data: &KeyData) -> Result<()> {
        if self.does_support(&key_data.type_url) {
            Ok(())
        } else {
            Err(Error::UnsupportedKeyType {
                expected: self.key_type().to_string(),
                key_type: key_data.type_url.clone(),
            })
        }
    }
}
