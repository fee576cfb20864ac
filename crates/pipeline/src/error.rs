//! Pipeline error types
//!
//! Setup and state errors surface through these; runtime processing errors
//! never do - they are caught at the stage boundary and reported via the
//! diagnostic log.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// `initialize()` called on an already-initialized stage
    ///
    /// Intentional: accidental double-wiring of a pipeline is caught early.
    #[error("stage '{stage}' is already initialized")]
    AlreadyInitialized {
        /// Stage name
        stage: String,
    },

    /// A message reached a stage that has not been initialized
    #[error("stage '{stage}' is not initialized")]
    NotInitialized {
        /// Stage name
        stage: String,
    },

    /// A setter was used after the stage was attached/initialized
    #[error("stage '{stage}': {reason}")]
    InvalidState {
        /// Stage name
        stage: String,
        /// What was attempted
        reason: String,
    },

    /// Two stages with the same name wired into one parent
    #[error("duplicate stage name '{name}'")]
    DuplicateStage {
        /// The conflicting name
        name: String,
    },

    /// Stage logic failed during `on_initialize`
    #[error("stage '{stage}' failed to initialize: {message}")]
    Stage {
        /// Stage name
        stage: String,
        /// Failure description
        message: String,
    },

    /// Level configuration error (patterns, registry capacity)
    #[error(transparent)]
    Level(#[from] scribe_levels::LevelError),

    /// Setting registration error
    #[error(transparent)]
    Setting(#[from] scribe_config::ConfigError),
}

impl PipelineError {
    /// Create an InvalidState error
    pub fn invalid_state(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create a Stage error
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::AlreadyInitialized {
            stage: "console".into(),
        };
        assert!(err.to_string().contains("console"));
        assert!(err.to_string().contains("already initialized"));

        let err = PipelineError::NotInitialized {
            stage: "splitter".into(),
        };
        assert!(err.to_string().contains("not initialized"));

        let err = PipelineError::invalid_state("file", "queue size is immutable after attach");
        assert!(err.to_string().contains("immutable"));

        let err = PipelineError::DuplicateStage { name: "x".into() };
        assert!(err.to_string().contains("duplicate"));

        let err = PipelineError::stage("es", "connection refused");
        assert!(err.to_string().contains("connection refused"));
    }
}
