//! Level engine error types

use thiserror::Error;

/// Result type for level operations
pub type Result<T> = std::result::Result<T, LevelError>;

/// Errors raised while building level configuration
///
/// These are setup errors: they surface at configuration time, never on the
/// write path.
#[derive(Debug, Error)]
pub enum LevelError {
    /// A wildcard or regex pattern failed to compile
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern text
        pattern: String,
        /// Compiler diagnostic
        message: String,
    },

    /// The registry has no free level ids left
    #[error("level registry full ({capacity} levels), cannot register '{name}'")]
    RegistryFull {
        /// Name that could not be registered
        name: String,
        /// Mask capacity
        capacity: usize,
    },

    /// A level name that is reserved for sentinel use
    #[error("level name '{name}' is reserved")]
    ReservedName {
        /// The reserved name
        name: String,
    },

    /// More than one writer entry is marked as default
    #[error("writer entry set already has a default entry")]
    DuplicateDefault,
}

impl LevelError {
    /// Create an InvalidPattern error
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LevelError::invalid_pattern("[", "unclosed class");
        assert!(err.to_string().contains("invalid pattern"));
        assert!(err.to_string().contains("unclosed class"));

        let err = LevelError::RegistryFull {
            name: "Audit".into(),
            capacity: 32,
        };
        assert!(err.to_string().contains("Audit"));
        assert!(err.to_string().contains("32"));

        let err = LevelError::ReservedName { name: "All".into() };
        assert!(err.to_string().contains("reserved"));

        assert!(LevelError::DuplicateDefault
            .to_string()
            .contains("default"));
    }
}
