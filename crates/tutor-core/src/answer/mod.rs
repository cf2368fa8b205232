//! Question answering against a hosted inference service.
//!
//! Provides a backend abstraction for the transport, the ordered answer
//! extractors that normalize response shapes, and the client that ties them
//! together under a [`RetryPolicy`](crate::retry::RetryPolicy).

mod backend;
mod client;
mod extract;

pub use backend::{InferenceBackend, NlpCloudBackend, QuestionRequest};
pub use client::{AnswerClient, GENERIC_FAILURE};
pub use extract::{clean_answer, extract_answer, Extractor, EXTRACTORS};
