//! Tutor Core - question answering for physics, chemistry and mathematics.
//!
//! Turns a question, typed or photographed, into an answer from a hosted
//! inference service, while coping with rate limits, transient failures and
//! unreadable images.
//!
//! # Architecture
//!
//! ```text
//! Image → OCR (no retry) → Question → Validate → Inference (retry on 429) → Answer
//! ```
//!
//! Every run ends in a value ([`PipelineOutcome`]); nothing here panics or
//! exits on a service failure.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tutor_core::{AnswerPipeline, Config, PipelineInput, Subject};
//!
//! #[tokio::main]
//! async fn main() -> tutor_core::Result<()> {
//!     let config = Config::load()?;
//!     let pipeline = AnswerPipeline::from_config(&config)?;
//!
//!     let report = pipeline
//!         .run(PipelineInput::Text("What is Newton's second law?".into()), Subject::Physics)
//!         .await;
//!     println!("{}", report.outcome.user_message());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod answer;
pub mod chat;
pub mod config;
pub mod error;
pub mod format;
pub mod ocr;
pub mod pipeline;
pub mod retry;
pub mod types;

#[cfg(test)]
mod stub_server;

// Re-exports for convenient access
pub use answer::{AnswerClient, InferenceBackend, NlpCloudBackend};
pub use chat::{ChatBackend, ChatSession, GeminiBackend};
pub use config::Config;
pub use error::{
    ConfigError, ImageError, Result, ServiceError, TerminalError, TutorError, ValidationError,
};
pub use format::format_answer;
pub use ocr::{ImageHandle, OcrSpaceClient, TextExtractor};
pub use pipeline::{AnswerPipeline, PendingAnswer, PipelineInput, PipelineOutcome, PipelineReport, Stage};
pub use retry::RetryPolicy;
pub use types::{AnswerOutcome, ExtractionResult, Question, Subject};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
