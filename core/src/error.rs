use thiserror::Error;

/// The broad class of an [`Error`], for callers that only care about the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    AlreadyExists,
    VerificationFailed,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("No key manager registered for key type {0}")]
    KeyManagerNotFound(String),

    #[error("No primitive wrapper registered for {0}")]
    WrapperNotFound(&'static str),

    #[error("Key type {key_type} is already registered with key manager {existing}")]
    KeyManagerExists {
        key_type: String,
        existing: &'static str,
    },

    #[error("Key manager for key type {0} forbids key generation, it cannot be re-registered to allow it")]
    NewKeyAllowedConflict(String),

    #[error("A different primitive wrapper {existing} is already registered for {primitive}")]
    WrapperExists {
        primitive: &'static str,
        existing: &'static str,
    },

    #[error("Key manager for key type {key_type} produces {registered}, not {requested}")]
    WrongPrimitive {
        key_type: String,
        registered: &'static str,
        requested: &'static str,
    },

    #[error("Key manager for {expected} does not support key type {key_type}")]
    UnsupportedKeyType {
        expected: String,
        key_type: String,
    },

    #[error("Key generation is not allowed for key type {0}")]
    NewKeyForbidden(String),

    #[error("Key {0} is not enabled")]
    KeyNotEnabled(u32),

    #[error("Entry does not belong to this primitive set")]
    ForeignEntry,

    #[error("Primitive set has no primary")]
    NoPrimary,

    #[error("Invalid keyset: {0}")]
    InvalidKeyset(&'static str),

    #[error("No key with id {0} in keyset")]
    NoSuchKey(u32),

    #[error("Key {0} is the primary key")]
    PrimaryKey(u32),

    #[error("Key {0} has been destroyed")]
    KeyDestroyed(u32),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Failed to parse {field}: {source}")]
    InvalidField {
        field: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Verification failed")]
    VerificationFailed,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyManagerNotFound(_) | Self::WrapperNotFound(_) | Self::NoSuchKey(_) => {
                ErrorKind::NotFound
            }
            Self::KeyManagerExists { .. }
            | Self::NewKeyAllowedConflict(_)
            | Self::WrapperExists { .. } => ErrorKind::AlreadyExists,
            Self::VerificationFailed => ErrorKind::VerificationFailed,
            Self::WrongPrimitive { .. }
            | Self::UnsupportedKeyType { .. }
            | Self::NewKeyForbidden(_)
            | Self::KeyNotEnabled(_)
            | Self::ForeignEntry
            | Self::NoPrimary
            | Self::InvalidKeyset(_)
            | Self::PrimaryKey(_)
            | Self::KeyDestroyed(_)
            | Self::InvalidKey(_)
            | Self::InvalidField { .. } => ErrorKind::InvalidArgument,
        }
    }
}

pub trait CaptureFieldErr<T> {
    fn map_field_err(self, field: &'static str) -> Result<T, Error>;
}

impl<T, E: Into<Box<dyn std::error::Error + Send + Sync>>> CaptureFieldErr<T>
    for std::result::Result<T, E>
{
    fn map_field_err(self, field: &'static str) -> Result<T, Error> {
        self.map_err(|e| Error::InvalidField {
            field,
            source: e.into(),
        })
    }
}
