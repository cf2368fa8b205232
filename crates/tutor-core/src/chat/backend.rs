//! Generative chat backend (Gemini `generateContent`).

use crate::config::{resolve_env_var, ChatConfig};
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anything that can reply to a free-form prompt.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Generate a reply for a single prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Google Gemini provider.
pub struct GeminiBackend {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Result<Self, ServiceError> {
        let api_key = resolve_env_var(&config.api_key).ok_or_else(|| {
            ServiceError::new("Chat API key not set. Set GEMINI_API_KEY env var.")
        })?;
        let mut backend = Self::new(&config.endpoint, &api_key, &config.model);
        backend.timeout = Duration::from_millis(config.timeout_ms);
        Ok(backend)
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let resp = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ServiceError::new(format!("Chat request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ServiceError::with_status(
                format!("Chat HTTP {status}: {text}"),
                status.as_u16(),
            ));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::new(format!("Failed to parse chat response: {e}")))?;

        parsed
            .text()
            .ok_or_else(|| ServiceError::new("Chat model returned no candidates"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub_server::{direct_client, StubServer};

    #[test]
    fn test_url_names_model() {
        let backend = GeminiBackend::new("https://example.com/v1beta/", "k", "gemini-1.5-flash");
        assert_eq!(
            backend.url(),
            "https://example.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some("hi".into()),
                }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_response_parts_are_joined() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "there."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("Hello there."));
    }

    #[test]
    fn test_response_without_candidates() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert_eq!(resp.text(), None);
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ChatConfig {
            api_key: "${DEFINITELY_NOT_SET_TUTOR_CHAT}".into(),
            ..ChatConfig::default()
        };
        let err = GeminiBackend::from_config(&config).err().unwrap();
        assert!(err.message.contains("GEMINI_API_KEY"));
    }

    #[tokio::test]
    async fn test_reply_over_http() {
        let server = StubServer::respond(
            "200 OK",
            "application/json",
            r#"{"candidates":[{"content":{"parts":[{"text":"Momentum is mass times velocity."}]}}]}"#,
        )
        .await;
        let mut backend = GeminiBackend::new(&server.url, "g-key", "gemini-1.5-flash");
        backend.client = direct_client();

        let reply = backend.generate("What is momentum?").await.unwrap();
        assert_eq!(reply, "Momentum is mass times velocity.");

        let raw = server.received().await;
        assert!(
            raw.starts_with("POST /models/gemini-1.5-flash:generateContent?key=g-key "),
            "Got: {raw}"
        );
    }

    #[tokio::test]
    async fn test_http_429_keeps_status() {
        let server = StubServer::respond("429 Too Many Requests", "application/json", "{}").await;
        let mut backend = GeminiBackend::new(&server.url, "g-key", "gemini-1.5-flash");
        backend.client = direct_client();

        let err = backend.generate("hi").await.unwrap_err();
        assert!(err.is_rate_limited());
    }
}
