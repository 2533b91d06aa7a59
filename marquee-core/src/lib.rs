//! Marquee Core - Configuration, errors and logging shared by every Marquee crate
//!
//! This crate holds the pieces that sit underneath the search pipeline:
//! sectioned configuration with environment overrides, the top-level error
//! type surfaced by the CLI, and tracing initialization.

pub mod config;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::{ApiConfig, MarqueeConfig, PipelineConfig, PosterConfig};

/// Top-level errors that can bubble up to the command-line surface.
///
/// Search failures are not errors at this level: the pipeline reports them as
/// outcomes. What remains is configuration, bad input and local I/O.
#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("HTTP client error: {reason}")]
    Http { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MarqueeError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            MarqueeError::Configuration { reason } => format!("Configuration problem: {reason}"),
            MarqueeError::InvalidInput { reason } => reason.clone(),
            MarqueeError::Http { .. } => "Could not set up the HTTP client".to_string(),
            MarqueeError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MarqueeError::Configuration { .. } | MarqueeError::InvalidInput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_classified() {
        let config_error = MarqueeError::Configuration {
            reason: "missing API key".to_string(),
        };
        let input_error = MarqueeError::InvalidInput {
            reason: "Please enter a movie title.".to_string(),
        };
        let io_error = MarqueeError::Io(std::io::Error::other("disk full"));

        assert!(config_error.is_user_error());
        assert!(input_error.is_user_error());
        assert!(!io_error.is_user_error());
    }

    #[test]
    fn test_invalid_input_message_is_shown_verbatim() {
        let error = MarqueeError::InvalidInput {
            reason: "Please enter a movie title.".to_string(),
        };
        assert_eq!(error.user_message(), "Please enter a movie title.");
    }
}
