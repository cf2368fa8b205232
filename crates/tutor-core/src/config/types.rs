//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// OCR service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Parse endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Recognition language code
    pub language: String,

    /// OCR engine selector (2 is the high-accuracy engine)
    pub engine: u8,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.ocr.space/parse/image".to_string(),
            api_key: "${OCR_SPACE_API_KEY}".to_string(),
            language: "eng".to_string(),
            engine: 2,
            timeout_ms: 30_000,
        }
    }
}

/// Question-answering inference service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Route requests to GPU-backed models
    pub gpu: bool,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.nlpcloud.io/v1".to_string(),
            api_key: "${NLPCLOUD_API_KEY}".to_string(),
            model: "finetuned-llama-3-70b".to_string(),
            gpu: true,
            timeout_ms: 60_000,
        }
    }
}

/// Backoff settings for rate-limited inference calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay unit in milliseconds; the wait after attempt n is n times this
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
        }
    }
}

/// Consultant chat settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// API base URL
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_ms: 60_000,
        }
    }
}

/// Input limits checked before anything is sent over the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum question length in characters
    pub max_question_chars: usize,

    /// Maximum image size in megabytes
    pub max_image_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_question_chars: crate::types::MAX_QUESTION_CHARS,
            max_image_size_mb: 5,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
