//! Error types for recall-core.

use thiserror::Error;

/// Result type alias using recall-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for recall operations
#[derive(Error, Debug)]
pub enum Error {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("Invalid configuration for {field}: {message}")]
    Config { field: String, message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    // Storage errors
    #[error("No writable storage directory: {0}")]
    StorageRoot(String),

    #[error("Memory store lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Create a configuration error for a field
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a storage root error
    pub fn storage_root(message: impl Into<String>) -> Self {
        Self::StorageRoot(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("conversation.max_messages", "must be greater than 0");
        assert!(err.to_string().contains("conversation.max_messages"));
        assert!(err.to_string().contains("greater than 0"));

        let err = Error::storage_root("home directory not found");
        assert!(err.to_string().contains("home directory"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
