//! Question answering with rate-limit retry.

use super::backend::{InferenceBackend, NlpCloudBackend, QuestionRequest};
use super::extract::{clean_answer, extract_answer};
use crate::config::Config;
use crate::error::{ServiceError, TerminalError};
use crate::retry::RetryPolicy;
use crate::types::{AnswerOutcome, Question};
use std::sync::Arc;

/// Reason reported for every non-rate-limit failure. The underlying cause is
/// logged, not surfaced.
pub const GENERIC_FAILURE: &str = "generic error";

/// Asks questions through an [`InferenceBackend`], retrying rate limits.
#[derive(Clone)]
pub struct AnswerClient {
    backend: Arc<dyn InferenceBackend>,
    policy: RetryPolicy,
}

impl AnswerClient {
    pub fn new(backend: Arc<dyn InferenceBackend>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    /// Build the production client (NLP Cloud backend, configured retry).
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let backend = NlpCloudBackend::from_config(&config.inference)?;
        Ok(Self::new(
            Arc::new(backend),
            RetryPolicy::from_config(&config.retry),
        ))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Ask one question and normalize whatever comes back.
    pub async fn ask(&self, question: &Question) -> AnswerOutcome {
        let request = QuestionRequest::for_question(question);
        let backend = &self.backend;
        let request = &request;

        tracing::debug!(
            "Asking {} ({}) a {} question",
            backend.name(),
            backend.model(),
            question.subject()
        );

        match self.policy.run(move || backend.question(request)).await {
            Ok(body) => match extract_answer(&body).map(|raw| clean_answer(&raw)) {
                Some(text) if !text.is_empty() => AnswerOutcome::Success { text },
                _ => {
                    tracing::warn!("{} returned no usable answer: {body}", backend.name());
                    AnswerOutcome::Failure {
                        reason: GENERIC_FAILURE.to_string(),
                    }
                }
            },
            Err(TerminalError::RateLimited { attempts }) => {
                tracing::warn!("{} still rate limited after {attempts} attempt(s)", backend.name());
                AnswerOutcome::RateLimited
            }
            Err(TerminalError::Failed(e)) => {
                tracing::warn!("{} request failed: {e}", backend.name());
                AnswerOutcome::Failure {
                    reason: GENERIC_FAILURE.to_string(),
                }
            }
        }
    }
}
