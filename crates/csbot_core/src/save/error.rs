use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted data")]
    Corrupted,

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Duplicate player id: {id}")]
    DuplicatePlayer { id: u64 },

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

impl SaveError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::Unavailable(_) => true,
            SaveError::VersionMismatch { .. } => true, // Can try migration
            SaveError::Corrupted => false,
            SaveError::ChecksumMismatch => false,
            SaveError::DuplicatePlayer { .. } => false,
            _ => false,
        }
    }
}
