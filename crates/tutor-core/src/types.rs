//! Core data types for the Tutor answer-acquisition pipeline.
//!
//! These are the values that flow between the OCR step, the answering step
//! and the host UI.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest question the inference service accepts, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Subject area a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Physics,
    Chemistry,
    Mathematics,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Physics, Subject::Chemistry, Subject::Mathematics];

    /// Lowercase name embedded in the inference context string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Mathematics => "mathematics",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "physics" => Ok(Subject::Physics),
            "chemistry" => Ok(Subject::Chemistry),
            "mathematics" | "math" | "maths" => Ok(Subject::Mathematics),
            other => Err(format!("Unknown subject: {other}")),
        }
    }
}

/// A validated question, ready to send to the inference service.
///
/// The text is trimmed and guaranteed non-blank. Construct through
/// [`Question::new`] or [`Question::with_limit`]; there is no way to build an
/// empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    subject: Subject,
    text: String,
}

impl Question {
    /// Validate `text` against the default length limit.
    pub fn new(subject: Subject, text: &str) -> Result<Self, ValidationError> {
        Self::with_limit(subject, text, MAX_QUESTION_CHARS)
    }

    /// Validate `text` against a caller-supplied character limit.
    pub fn with_limit(subject: Subject, text: &str, max_chars: usize) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Blank);
        }
        let len = trimmed.chars().count();
        if len > max_chars {
            return Err(ValidationError::TooLong { len, max: max_chars });
        }
        Ok(Self {
            subject,
            text: trimmed.to_string(),
        })
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Context string that biases the inference service toward the subject.
    pub fn context(&self) -> String {
        format!("This is a {} related question: {}", self.subject, self.text)
    }
}

/// Result of running an image through the OCR service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionResult {
    /// Readable text was found (already trimmed).
    Success { text: String },
    /// The service processed the image but found no readable text.
    Empty,
    /// The service or the transport reported an error.
    Failure { reason: String },
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }
}

/// Result of asking the inference service a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Cleaned answer text (label stripped, trimmed).
    Success { text: String },
    /// Every attempt was refused with a rate-limit response.
    RateLimited,
    /// Any other failure; never retried.
    Failure { reason: String },
}

impl AnswerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AnswerOutcome::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_trims_text() {
        let q = Question::new(Subject::Physics, "  what is inertia?\n").unwrap();
        assert_eq!(q.text(), "what is inertia?");
        assert_eq!(q.subject(), Subject::Physics);
    }

    #[test]
    fn test_question_rejects_blank() {
        assert_eq!(Question::new(Subject::Chemistry, ""), Err(ValidationError::Blank));
        assert_eq!(
            Question::new(Subject::Chemistry, " \t\n "),
            Err(ValidationError::Blank)
        );
    }

    #[test]
    fn test_question_length_limit_counts_chars() {
        let exactly = "é".repeat(MAX_QUESTION_CHARS);
        assert!(Question::new(Subject::Mathematics, &exactly).is_ok());

        let over = "a".repeat(MAX_QUESTION_CHARS + 1);
        assert_eq!(
            Question::new(Subject::Mathematics, &over),
            Err(ValidationError::TooLong {
                len: MAX_QUESTION_CHARS + 1,
                max: MAX_QUESTION_CHARS
            })
        );
    }

    #[test]
    fn test_context_embeds_subject_and_text() {
        let q = Question::new(Subject::Chemistry, "What is a mole?").unwrap();
        assert_eq!(
            q.context(),
            "This is a chemistry related question: What is a mole?"
        );
    }

    #[test]
    fn test_subject_parsing() {
        assert_eq!("Physics".parse::<Subject>(), Ok(Subject::Physics));
        assert_eq!("maths".parse::<Subject>(), Ok(Subject::Mathematics));
        assert!("biology".parse::<Subject>().is_err());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(AnswerOutcome::RateLimited).unwrap();
        assert_eq!(json["status"], "rate_limited");

        let json = serde_json::to_value(ExtractionResult::Success {
            text: "2 + 2".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["text"], "2 + 2");
    }
}
