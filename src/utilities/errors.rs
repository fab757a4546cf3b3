//! Error types for the temple oracle service.
//!
//! `OracleError` is the surface taxonomy: anything a request handler can
//! report to a caller. Extraction failures are a separate type; they are
//! always recovered locally (a scroll with empty text is still a valid
//! scroll) and never cross a handler boundary.

use thiserror::Error;

/// Errors surfaced by the question-answering and ingestion pipelines.
#[derive(Debug, Error)]
pub enum OracleError {
    /// A required provider secret is not configured.
    ///
    /// Detected lazily at first use, never at startup.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An external AI provider returned a non-success response or the
    /// transport failed. Never retried at this layer.
    #[error("{provider} API error: {message}")]
    Provider { provider: String, message: String },

    /// The caller named a persona outside the known set, or the
    /// reserved-but-inactive one.
    #[error("Unsupported persona: {0}")]
    UnsupportedPersona(String),

    /// A required filesystem write failed (uploads, audio, collection save).
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Malformed request body (missing multipart field, bad payload).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl OracleError {
    /// Shorthand for a missing-secret configuration error.
    pub fn missing_key(var: &str) -> Self {
        Self::Configuration {
            message: format!("{} not set", var),
        }
    }

    /// Shorthand for a provider failure.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Errors from document text extraction.
///
/// Recovered at the ingestion site: logged, extraction yields empty text,
/// the upload still succeeds.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The document bytes could not be parsed by the format handler.
    #[error("Failed to extract text: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message() {
        let err = OracleError::missing_key("XAI_API_KEY");
        assert_eq!(err.to_string(), "Configuration error: XAI_API_KEY not set");
    }

    #[test]
    fn test_provider_error_display() {
        let err = OracleError::provider("xAI", "429 - rate limited");
        assert_eq!(err.to_string(), "xAI API error: 429 - rate limited");
    }

    #[test]
    fn test_unsupported_persona_display() {
        let err = OracleError::UnsupportedPersona("Thoth".to_string());
        assert!(err.to_string().contains("Thoth"));
    }
}
