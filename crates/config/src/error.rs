//! Configuration error types

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid writer rule (bad pattern, duplicate default rule)
    #[error(transparent)]
    Level(#[from] scribe_levels::LevelError),

    /// The same setting was registered twice with different defaults
    #[error("setting '{section}.{key}' registered with conflicting defaults")]
    DuplicateDefault {
        /// Section name
        section: String,
        /// Key within the section
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::DuplicateDefault {
            section: "file".into(),
            key: "queue_size".into(),
        };
        assert!(err.to_string().contains("file.queue_size"));

        let err = ConfigError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(err.to_string().contains("failed to read"));
    }
}
