//! Key templates for the HMAC key manager.

use super::*;

fn hmac_template(alg: HashType, key_size: usize, tag_size: usize) -> KeyTemplate {
    let value = serde_json::to_vec(&HmacKeyFormat {
        alg,
        tag_size,
        key_size,
    })
    .trace_expect("Failed to serialize HMAC key format");
    KeyTemplate::new(HMAC_KEY_TYPE, value, OutputPrefixType::Tink)
}

/// HMAC-SHA256, 32 byte key, 16 byte tag.
pub fn hmac_sha256_half_size_tag() -> KeyTemplate {
    hmac_template(HashType::Sha256, 32, 16)
}

/// HMAC-SHA256, 32 byte key, 32 byte tag.
pub fn hmac_sha256() -> KeyTemplate {
    hmac_template(HashType::Sha256, 32, 32)
}

/// HMAC-SHA512, 64 byte key, 32 byte tag.
pub fn hmac_sha512_half_size_tag() -> KeyTemplate {
    hmac_template(HashType::Sha512, 64, 32)
}

/// HMAC-SHA512, 64 byte key, 64 byte tag.
pub fn hmac_sha512() -> KeyTemplate {
    hmac_template(HashType::Sha512, 64, 64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyweave_core::key_manager::KeyManager;

    #[test]
    fn templates_generate_keys() {
        let registry = Registry::new();
        register(&registry).unwrap();

        for (template, tag_size) in [
            (hmac_sha256_half_size_tag(), 16),
            (hmac_sha256(), 32),
            (hmac_sha512_half_size_tag(), 32),
            (hmac_sha512(), 64),
        ] {
            assert_eq!(template.output_prefix_type, OutputPrefixType::Tink);

            let key_data = registry.new_key_data(&template).unwrap();
            let mac = HmacKeyManager.primitive(&key_data).unwrap();
            assert_eq!(mac.compute_mac(b"template").unwrap().len(), tag_size);
        }
    }
}
