use std::fmt;

use crate::save::SaveError;

#[derive(Debug)]
pub enum CoreError {
    /// Operation invoked in a state that forbids it.
    StateConflict(String),
    /// Map or player id absent from the container the operation expected it in.
    NotFound(String),
    InvalidInput(String),
    /// Active map pool could not be fetched and no cached copy exists.
    MapPool(String),
    Persistence(SaveError),
    Config(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::StateConflict(msg) => write!(f, "State conflict: {}", msg),
            CoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CoreError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CoreError::MapPool(msg) => write!(f, "Map pool unavailable: {}", msg),
            CoreError::Persistence(err) => write!(f, "Persistence error: {}", err),
            CoreError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl CoreError {
    /// Whether the session can keep going after reporting this error to the caller.
    ///
    /// Nothing in the core is fatal to the process, but a failed write means the
    /// registry on disk no longer matches memory.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::StateConflict(_) => true,
            CoreError::NotFound(_) => true,
            CoreError::InvalidInput(_) => true,
            CoreError::MapPool(_) => true,
            CoreError::Persistence(err) => err.is_recoverable(),
            CoreError::Config(_) => false,
        }
    }
}

impl From<SaveError> for CoreError {
    fn from(err: SaveError) -> Self {
        CoreError::Persistence(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = CoreError::StateConflict("no open registration".to_string());
        assert_eq!(err.to_string(), "State conflict: no open registration");

        let err = CoreError::NotFound("map Nuke is not banned".to_string());
        assert_eq!(err.to_string(), "Not found: map Nuke is not banned");
    }

    #[test]
    fn test_persistence_error_keeps_source() {
        let err: CoreError = SaveError::Corrupted.into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_recoverable());
    }
}
