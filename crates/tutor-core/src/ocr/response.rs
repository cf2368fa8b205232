//! OCR service response shape and its interpretation.

use crate::types::ExtractionResult;
use serde::Deserialize;

/// Body returned by the OCR parse endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct OcrResponse {
    #[serde(default)]
    pub is_errored_on_processing: bool,
    #[serde(default)]
    pub error_message: Option<ErrorMessage>,
    #[serde(default)]
    pub parsed_results: Option<Vec<ParsedResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ParsedResult {
    #[serde(default)]
    pub parsed_text: Option<String>,
}

/// The service reports errors either as one string or as a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn first(&self) -> Option<&str> {
        let msg = match self {
            ErrorMessage::One(s) => Some(s.as_str()),
            ErrorMessage::Many(v) => v.first().map(String::as_str),
        };
        msg.map(str::trim).filter(|s| !s.is_empty())
    }
}

impl OcrResponse {
    /// Map the raw response onto an [`ExtractionResult`].
    ///
    /// A processing error wins over any parsed text; only the first parsed
    /// result is considered.
    pub fn interpret(&self) -> ExtractionResult {
        if self.is_errored_on_processing {
            let reason = self
                .error_message
                .as_ref()
                .and_then(ErrorMessage::first)
                .unwrap_or("Unknown error")
                .to_string();
            return ExtractionResult::Failure { reason };
        }

        let text = self
            .parsed_results
            .as_deref()
            .and_then(|results| results.first())
            .and_then(|r| r.parsed_text.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        if text.is_empty() {
            ExtractionResult::Empty
        } else {
            ExtractionResult::Success {
                text: text.to_string(),
            }
        }
    }
}
