//! Inference backend trait and the NLP Cloud question endpoint.
//!
//! A backend performs exactly one request/response cycle. Retrying and
//! response normalization belong to [`AnswerClient`](super::AnswerClient).

use crate::config::{resolve_env_var, InferenceConfig};
use crate::error::ServiceError;
use crate::types::Question;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Body of a question-answering call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRequest {
    pub question: String,
    pub context: String,
}

impl QuestionRequest {
    pub fn for_question(question: &Question) -> Self {
        Self {
            question: question.text().to_string(),
            context: question.context(),
        }
    }
}

/// Trait that all inference backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn InferenceBackend>` shared across invocations).
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Model identifier requests are routed to.
    fn model(&self) -> &str;

    /// Send one question and return the raw JSON body.
    ///
    /// Non-success HTTP statuses must be reported with `status_code` set so
    /// rate limiting (429) can be told apart from other failures.
    async fn question(&self, request: &QuestionRequest) -> Result<Value, ServiceError>;
}

/// NLP Cloud question-answering backend.
pub struct NlpCloudBackend {
    api_key: String,
    model: String,
    gpu: bool,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl NlpCloudBackend {
    pub fn new(endpoint: &str, api_key: &str, model: &str, gpu: bool) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            gpu,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }

    /// Build a backend from config, resolving the API key reference.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, ServiceError> {
        let api_key = resolve_env_var(&config.api_key).ok_or_else(|| {
            ServiceError::new("Inference API key not set. Set NLPCLOUD_API_KEY env var.")
        })?;
        let mut backend = Self::new(&config.endpoint, &api_key, &config.model, config.gpu);
        backend.timeout = Duration::from_millis(config.timeout_ms);
        Ok(backend)
    }

    fn url(&self) -> String {
        if self.gpu {
            format!("{}/gpu/{}/question", self.endpoint, self.model)
        } else {
            format!("{}/{}/question", self.endpoint, self.model)
        }
    }
}

#[async_trait]
impl InferenceBackend for NlpCloudBackend {
    fn name(&self) -> &str {
        "nlpcloud"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn question(&self, request: &QuestionRequest) -> Result<Value, ServiceError> {
        let resp = self
            .client
            .post(self.url())
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::new(format!("Inference request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::with_status(
                format!("Inference HTTP {status}: {text}"),
                status.as_u16(),
            ));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| ServiceError::new(format!("Failed to parse inference response: {e}")))
    }
}
