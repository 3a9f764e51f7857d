//! Error types for the planner domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Provider failures have
//! their own enum and convert into [`Error::Provider`].

use thiserror::Error;

use crate::tier::TemplateId;

/// The top-level error type for all planner operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No tier registry claims this template id.
    #[error("Unknown template: {0}")]
    UnknownTemplate(TemplateId),

    /// Malformed or missing static configuration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Session position outside `0..total_sessions`, or an empty plan.
    #[error("Invalid session position {index} of {total}")]
    InvalidSession { index: u32, total: u32 },

    /// The assignment lists no topics to build exercises around.
    #[error("Assignment {0} lists no topics")]
    EmptyAssignment(String),

    // --- Content provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The learner response does not fit the exercise's answer key.
    #[error("Invalid response for {template}: {reason}")]
    InvalidResponse { template: TemplateId, reason: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this failure came from the content provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by a content provider while generating or grading.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered, but the payload could not be used.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Operation not supported by provider '{provider}': {operation}")]
    Unsupported { provider: String, operation: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
        assert!(err.is_provider_failure());
    }

    #[test]
    fn unknown_template_is_not_a_provider_failure() {
        let err = Error::UnknownTemplate(TemplateId::from("crossword"));
        assert!(err.to_string().contains("crossword"));
        assert!(!err.is_provider_failure());
    }

    #[test]
    fn config_shorthand() {
        let err = Error::config("quiz table is empty");
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("quiz table is empty"));
    }
}
