//! Error types for the Tutor answer-acquisition pipeline.
//!
//! Expected outcomes of a pipeline run (blank input, unreadable images,
//! rate limiting) are values, not errors. The types here describe what the
//! collaborators report so the pipeline can classify them.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Tutor operations that can genuinely fail.
#[derive(Error, Debug)]
pub enum TutorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An external service could not be set up or reached
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Image could not be prepared for upload
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// A failed exchange with an external HTTP collaborator.
///
/// `status_code` is set whenever the service answered with a non-success
/// HTTP status; transport failures (DNS, refused connection, timeout) and
/// unparseable bodies leave it `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// True when the service refused the call because of call volume (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        self.status_code == Some(429)
    }
}

/// Question text rejected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Question text is blank")]
    Blank,

    #[error("Question is too long ({len} characters, maximum is {max})")]
    TooLong { len: usize, max: usize },
}

/// Terminal result of a [`RetryPolicy`](crate::retry::RetryPolicy) run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerminalError {
    /// Every attempt was rate limited.
    #[error("Rate limited after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    /// A non-rate-limit failure; never retried.
    #[error("{0}")]
    Failed(ServiceError),
}

/// Problems reading an image before it is sent to the OCR service.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image not found: {0}")]
    NotFound(PathBuf),

    #[error("Image too large: {name} ({size_mb}MB > {max_mb}MB)")]
    TooLarge {
        name: String,
        size_mb: u64,
        max_mb: u64,
    },

    #[error("Unsupported image format for {0}")]
    UnsupportedFormat(String),

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Tutor results.
pub type Result<T> = std::result::Result<T, TutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(ServiceError::with_status("slow down", 429).is_rate_limited());
        assert!(!ServiceError::with_status("boom", 500).is_rate_limited());
        assert!(!ServiceError::new("connection refused").is_rate_limited());
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::Blank.to_string(), "Question text is blank");
        let err = ValidationError::TooLong { len: 1200, max: 1000 };
        assert!(err.to_string().contains("1200"));
    }

    #[test]
    fn test_service_error_converts_to_tutor_error() {
        let err: TutorError = ServiceError::new("dns failure").into();
        assert!(err.to_string().contains("dns failure"));
    }
}
