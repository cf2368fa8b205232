//! OCR client that uploads an image as multipart form data.
//!
//! Failures are reported immediately: OCR is never retried.

use super::image::{ImageHandle, LoadedImage};
use super::response::OcrResponse;
use crate::config::{resolve_env_var, OcrConfig};
use crate::error::ServiceError;
use crate::types::ExtractionResult;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Anything that can turn an image into question text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Service name for logging.
    fn name(&self) -> &str;

    /// Extract text from `image` using the given recognition language.
    async fn extract(&self, image: &ImageHandle, language: &str) -> ExtractionResult;
}

/// Client for the OCR.space parse endpoint.
pub struct OcrSpaceClient {
    api_key: String,
    endpoint: String,
    engine: u8,
    max_image_bytes: u64,
    timeout: Duration,
    client: reqwest::Client,
}

impl OcrSpaceClient {
    pub fn new(api_key: &str, endpoint: &str) -> Self {
        let defaults = OcrConfig::default();
        Self {
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            engine: defaults.engine,
            max_image_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(defaults.timeout_ms),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from config, resolving the API key reference.
    pub fn from_config(config: &OcrConfig, max_image_size_mb: u64) -> Result<Self, ServiceError> {
        let api_key = resolve_env_var(&config.api_key).ok_or_else(|| {
            ServiceError::new("OCR API key not set. Set OCR_SPACE_API_KEY env var.")
        })?;
        Ok(Self {
            engine: config.engine,
            max_image_bytes: max_image_size_mb.saturating_mul(1024 * 1024),
            timeout: Duration::from_millis(config.timeout_ms),
            ..Self::new(&api_key, &config.endpoint)
        })
    }

    /// Non-file form fields, in the order they are sent.
    fn form_fields(&self, language: &str) -> Vec<(&'static str, String)> {
        vec![
            ("language", language.to_string()),
            ("apikey", self.api_key.clone()),
            ("isOverlayRequired", "false".to_string()),
            ("detectOrientation", "true".to_string()),
            ("scale", "true".to_string()),
            ("OCREngine", self.engine.to_string()),
        ]
    }

    async fn send(&self, image: LoadedImage, language: &str) -> Result<OcrResponse, ServiceError> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.media_type)
            .map_err(|e| ServiceError::new(format!("Invalid image MIME type: {e}")))?;

        let form = self
            .form_fields(language)
            .into_iter()
            .fold(Form::new().part("file", part), |form, (name, value)| {
                form.text(name, value)
            });

        let resp = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .header("apikey", &self.api_key)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::new(format!("OCR request failed: {e}")))?;

        let status = resp.status();
        tracing::debug!("OCR response status: {status}");
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::with_status(
                format!("OCR HTTP {status}: {text}"),
                status.as_u16(),
            ));
        }

        resp.json::<OcrResponse>()
            .await
            .map_err(|e| ServiceError::new(format!("Failed to parse OCR response: {e}")))
    }
}

#[async_trait]
impl TextExtractor for OcrSpaceClient {
    fn name(&self) -> &str {
        "ocr.space"
    }

    async fn extract(&self, image: &ImageHandle, language: &str) -> ExtractionResult {
        let loaded = match image.load(self.max_image_bytes).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Cannot prepare {} for OCR: {e}", image.display_name());
                return ExtractionResult::Failure {
                    reason: e.to_string(),
                };
            }
        };

        tracing::debug!(
            "Sending {} ({} bytes, {}) to OCR",
            loaded.file_name,
            loaded.bytes.len(),
            loaded.media_type
        );

        match self.send(loaded, language).await {
            Ok(response) => response.interpret(),
            Err(e) => {
                tracing::warn!("OCR failed for {}: {e}", image.display_name());
                ExtractionResult::Failure { reason: e.message }
            }
        }
    }
}
