//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be > 0".into(),
            ));
        }
        if self.ocr.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "ocr.timeout_ms must be > 0".into(),
            ));
        }
        if !matches!(self.ocr.engine, 1..=3) {
            return Err(ConfigError::ValidationError(
                "ocr.engine must be 1, 2 or 3".into(),
            ));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ocr.language must not be empty".into(),
            ));
        }
        if self.inference.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "inference.timeout_ms must be > 0".into(),
            ));
        }
        if self.inference.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "inference.model must not be empty".into(),
            ));
        }
        if self.chat.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "chat.timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_question_chars == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_question_chars must be > 0".into(),
            ));
        }
        if self.limits.max_image_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_size_mb must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validate_allows_zero_base_delay() {
        let mut config = Config::default();
        config.retry.base_delay_ms = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_engine() {
        let mut config = Config::default();
        config.ocr.engine = 7;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ocr.engine"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.inference.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("inference.timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_blank_model() {
        let mut config = Config::default();
        config.inference.model = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("inference.model"));
    }
}
