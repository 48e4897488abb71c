use super::*;
use serde::Deserialize;

/// Selects what [`register_with`] adds to a registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Register the [`HmacKeyManager`].
    pub hmac: bool,

    /// Allow registered key managers to generate new keys.
    pub new_keys_allowed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hmac: true,
            new_keys_allowed: true,
        }
    }
}

/// Registers the HMAC key manager and the MAC wrapper with the default [`Config`].
pub fn register(registry: &Registry) -> Result<()> {
    register_with(registry, &Config::default())
}

/// Registers the MAC wrapper, then the key managers `config` selects.
///
/// The wrapper goes first, so a registry already holding a different MAC wrapper
/// is left untouched. A key manager conflict leaves the wrapper registered.
pub fn register_with(registry: &Registry, config: &Config) -> Result<()> {
    debug!("Registering MAC primitives: {config:?}");

    registry.register_primitive_wrapper::<dyn Mac, _>(MacWrapper)?;
    if config.hmac {
        registry.register_key_manager::<dyn Mac, _>(HmacKeyManager, config.new_keys_allowed)?;
    }
    Ok(())
}
