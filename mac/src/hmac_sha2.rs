use super::*;
use base64::prelude::*;
use hmac::{Hmac, digest::KeyInit};
use keyweave_core::{CaptureFieldErr, key_manager::KeyManager};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

/// Key type identifier of [`HmacKeyManager`] keys.
pub const HMAC_KEY_TYPE: &str = "keyweave.mac.HmacKey";

const VERSION: u32 = 0;
const MIN_KEY_SIZE: usize = 16;
const MAX_KEY_SIZE: usize = 1024;
const MIN_TAG_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashType {
    #[serde(rename = "HS256")]
    Sha256,
    #[serde(rename = "HS384")]
    Sha384,
    #[serde(rename = "HS512")]
    Sha512,
}

impl HashType {
    /// Length in bytes of an untruncated tag.
    pub fn output_size(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

/// Serialized form of an HMAC key, the `value` of its [`KeyData`].
#[derive(Serialize, Deserialize)]
struct HmacKey {
    #[serde(default)]
    version: u32,
    alg: HashType,
    tag_size: usize,
    #[serde(rename = "k", with = "base64_url")]
    key: Zeroizing<Vec<u8>>,
}

/// Parameters for generating a new HMAC key, the `value` of a [`KeyTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HmacKeyFormat {
    pub alg: HashType,
    pub tag_size: usize,
    pub key_size: usize,
}

mod base64_url {
    use super::*;

    pub fn serialize<S: Serializer>(
        key: &Zeroizing<Vec<u8>>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_URL_SAFE_NO_PAD.encode(key.as_slice()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Zeroizing<Vec<u8>>, D::Error> {
        let s = Zeroizing::new(String::deserialize(deserializer)?);
        BASE64_URL_SAFE_NO_PAD
            .decode(s.as_bytes())
            .map(Zeroizing::new)
            .map_err(serde::de::Error::custom)
    }
}

fn validate_params(hash: HashType, tag_size: usize) -> Result<()> {
    if tag_size < MIN_TAG_SIZE {
        return Err(Error::InvalidKey(format!(
            "HMAC tag size {tag_size} is less than {MIN_TAG_SIZE}"
        )));
    }
    if tag_size > hash.output_size() {
        return Err(Error::InvalidKey(format!(
            "HMAC tag size {tag_size} is more than {} for {hash:?}",
            hash.output_size()
        )));
    }
    Ok(())
}

fn validate_key_size(key_size: usize) -> Result<()> {
    if key_size < MIN_KEY_SIZE {
        Err(Error::InvalidKey(format!(
            "HMAC key size {key_size} is less than {MIN_KEY_SIZE}"
        )))
    } else if key_size > MAX_KEY_SIZE {
        Err(Error::InvalidKey(format!(
            "HMAC key size {key_size} is more than {MAX_KEY_SIZE}"
        )))
    } else {
        Ok(())
    }
}

fn calculate_hmac<M: hmac::Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<M> {
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|e| Error::InvalidKey(e.to_string()))?;
    mac.update(data);
    Ok(mac)
}

fn finalize<M: hmac::Mac>(mac: M) -> Vec<u8> {
    mac.finalize().into_bytes().to_vec()
}

/// A single-key HMAC-SHA2 MAC with tags truncated to `tag_size` bytes.
pub struct HmacMac {
    hash: HashType,
    key: Zeroizing<Vec<u8>>,
    tag_size: usize,
}

impl HmacMac {
    pub fn new(hash: HashType, key: &[u8], tag_size: usize) -> Result<Self> {
        validate_key_size(key.len())?;
        validate_params(hash, tag_size)?;
        Ok(Self {
            hash,
            key: Zeroizing::new(key.to_vec()),
            tag_size,
        })
    }
}

impl Mac for HmacMac {
    fn compute_mac(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut tag = match self.hash {
            HashType::Sha256 => finalize(calculate_hmac::<Hmac<Sha256>>(&self.key, data)?),
            HashType::Sha384 => finalize(calculate_hmac::<Hmac<Sha384>>(&self.key, data)?),
            HashType::Sha512 => finalize(calculate_hmac::<Hmac<Sha512>>(&self.key, data)?),
        };
        tag.truncate(self.tag_size);
        Ok(tag)
    }

    fn verify_mac(&self, mac: &[u8], data: &[u8]) -> Result<()> {
        if mac.len() != self.tag_size {
            return Err(Error::VerificationFailed);
        }
        match self.hash {
            HashType::Sha256 => hmac::Mac::verify_truncated_left(
                calculate_hmac::<Hmac<Sha256>>(&self.key, data)?,
                mac,
            ),
            HashType::Sha384 => hmac::Mac::verify_truncated_left(
                calculate_hmac::<Hmac<Sha384>>(&self.key, data)?,
                mac,
            ),
            HashType::Sha512 => hmac::Mac::verify_truncated_left(
                calculate_hmac::<Hmac<Sha512>>(&self.key, data)?,
                mac,
            ),
        }
        .map_err(|_| Error::VerificationFailed)
    }
}

impl std::fmt::Debug for HmacMac {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacMac")
            .field("hash", &self.hash)
            .field("tag_size", &self.tag_size)
            .finish()
    }
}

/// Builds [`HmacMac`]s from `keyweave.mac.HmacKey` key data.
///
/// Key values are JSON objects:
/// `{"version": 0, "alg": "HS256", "tag_size": 16, "k": "<base64url key>"}`.
/// Key formats for [`new_key`](KeyManager::new_key) are JSON [`HmacKeyFormat`]s.
pub struct HmacKeyManager;

impl KeyManager<dyn Mac> for HmacKeyManager {
    fn key_type(&self) -> &str {
        HMAC_KEY_TYPE
    }

    fn primitive(&self, key_data: &KeyData) -> Result<Box<dyn Mac>> {
        self.ensure_supported(key_data)?;

        let key: HmacKey = serde_json::from_slice(&key_data.value).map_field_err("HMAC key")?;
        if key.version != VERSION {
            return Err(Error::InvalidKey(format!(
                "Unsupported HMAC key version {}",
                key.version
            )));
        }
        Ok(Box::new(HmacMac::new(key.alg, &key.key, key.tag_size)?))
    }

    fn new_key(&self, key_format: &[u8]) -> Result<KeyData> {
        let format: HmacKeyFormat =
            serde_json::from_slice(key_format).map_field_err("HMAC key format")?;
        validate_key_size(format.key_size)?;
        validate_params(format.alg, format.tag_size)?;

        let mut key = Zeroizing::new(vec![0u8; format.key_size]);
        rand::rng().fill(key.as_mut_slice());

        let value = serde_json::to_vec(&HmacKey {
            version: VERSION,
            alg: format.alg,
            tag_size: format.tag_size,
            key,
        })
        .map_field_err("HMAC key")?;
        Ok(KeyData::new(HMAC_KEY_TYPE, value))
    }
}
