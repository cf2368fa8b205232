//! Answer-acquisition pipeline.
//!
//! One invocation takes either typed text or an image, and walks
//!
//! ```text
//! Idle → Extracting (image only) → Validating → Asking → Resolved
//! ```
//!
//! exactly once. Extraction problems and blank input end the run before the
//! inference service is contacted. Nothing is cached: asking the same
//! question twice calls the service twice.

use crate::answer::AnswerClient;
use crate::config::Config;
use crate::error::{ServiceError, ValidationError};
use crate::ocr::{ImageHandle, OcrSpaceClient, TextExtractor};
use crate::types::{AnswerOutcome, ExtractionResult, Question, Subject, MAX_QUESTION_CHARS};
use futures_util::future::{AbortHandle, Abortable};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What the user handed over.
#[derive(Debug, Clone)]
pub enum PipelineInput {
    /// Question typed by the user
    Text(String),
    /// Photo or upload of the question
    Image(ImageHandle),
}

/// Pipeline progress, in the only order it can advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    Extracting,
    Validating,
    Asking,
    Resolved,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Idle => "idle",
            Stage::Extracting => "reading image",
            Stage::Validating => "checking question",
            Stage::Asking => "waiting for answer",
            Stage::Resolved => "done",
        };
        f.write_str(label)
    }
}

/// Callback notified on every stage transition.
pub type StageObserver = Arc<dyn Fn(Stage) + Send + Sync>;

/// Final result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The inference service was asked; its outcome is passed through as-is.
    Answered(AnswerOutcome),
    /// The question was rejected locally.
    Invalid(ValidationError),
    /// OCR produced no question text (`Empty` or `Failure` only).
    ExtractionFailed(ExtractionResult),
}

impl PipelineOutcome {
    /// The answer text, if the run produced one.
    pub fn answer(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Answered(AnswerOutcome::Success { text }) => Some(text),
            _ => None,
        }
    }

    /// Message the host shows for this outcome.
    pub fn user_message(&self) -> String {
        match self {
            PipelineOutcome::Answered(AnswerOutcome::Success { text }) => text.clone(),
            PipelineOutcome::Answered(AnswerOutcome::RateLimited) => {
                "The service is currently busy. Please try again in a few moments.".to_string()
            }
            PipelineOutcome::Answered(AnswerOutcome::Failure { .. }) => {
                "I'm sorry, I encountered an error. Please try again.".to_string()
            }
            PipelineOutcome::Invalid(ValidationError::Blank) => {
                "Please enter a question first.".to_string()
            }
            PipelineOutcome::Invalid(e) => e.to_string(),
            PipelineOutcome::ExtractionFailed(ExtractionResult::Failure { reason }) => {
                format!("OCR Processing Error: {reason}")
            }
            PipelineOutcome::ExtractionFailed(_) => {
                "No readable text found in the image. Please try again with a clearer image."
                    .to_string()
            }
        }
    }
}

/// Outcome plus the intermediate text the host may want to show or edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// Text read from the image, when the input was an image and OCR succeeded
    pub extracted: Option<String>,
    pub outcome: PipelineOutcome,
}

/// Orchestrates OCR and question answering for one question at a time.
///
/// Cheap to clone; clones share the underlying clients. Every invocation owns
/// its own retry state, so concurrent runs never interfere.
#[derive(Clone)]
pub struct AnswerPipeline {
    /// `Err` holds why OCR is unavailable; typed questions still work.
    extractor: Result<Arc<dyn TextExtractor>, ServiceError>,
    answerer: AnswerClient,
    language: String,
    max_question_chars: usize,
    observer: Option<StageObserver>,
}

impl AnswerPipeline {
    pub fn new(extractor: Arc<dyn TextExtractor>, answerer: AnswerClient) -> Self {
        Self::with_extractor(Ok(extractor), answerer)
    }

    /// Pipeline that answers typed questions only. Image runs end in
    /// `ExtractionFailed` carrying `reason`.
    pub fn without_extractor(reason: ServiceError, answerer: AnswerClient) -> Self {
        Self::with_extractor(Err(reason), answerer)
    }

    fn with_extractor(
        extractor: Result<Arc<dyn TextExtractor>, ServiceError>,
        answerer: AnswerClient,
    ) -> Self {
        Self {
            extractor,
            answerer,
            language: "eng".to_string(),
            max_question_chars: MAX_QUESTION_CHARS,
            observer: None,
        }
    }

    /// Build the production pipeline from config.
    ///
    /// Only the inference credential is required. A missing OCR credential is
    /// reported when an image is submitted.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        let answerer = AnswerClient::from_config(config)?;
        let extractor =
            OcrSpaceClient::from_config(&config.ocr, config.limits.max_image_size_mb)
                .map(|client| Arc::new(client) as Arc<dyn TextExtractor>);
        if let Err(e) = &extractor {
            tracing::debug!("Image questions disabled: {e}");
        }
        Ok(Self::with_extractor(extractor, answerer)
            .with_language(&config.ocr.language)
            .with_max_question_chars(config.limits.max_question_chars))
    }

    /// OCR recognition language.
    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_max_question_chars(mut self, max: usize) -> Self {
        self.max_question_chars = max;
        self
    }

    pub fn with_observer(mut self, observer: StageObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run one invocation to completion.
    pub async fn run(&self, input: PipelineInput, subject: Subject) -> PipelineReport {
        let mut stages = StageTracker::new(self.observer.as_ref());

        let (text, extracted) = match input {
            PipelineInput::Text(text) => (text, None),
            PipelineInput::Image(image) => {
                stages.enter(Stage::Extracting);
                let result = match &self.extractor {
                    Ok(extractor) => {
                        tracing::debug!(
                            "Extracting text from {} via {}",
                            image.display_name(),
                            extractor.name()
                        );
                        extractor.extract(&image, &self.language).await
                    }
                    Err(unavailable) => ExtractionResult::Failure {
                        reason: unavailable.message.clone(),
                    },
                };
                match result {
                    ExtractionResult::Success { text } => {
                        tracing::info!("Extracted {} characters from image", text.chars().count());
                        (text.clone(), Some(text))
                    }
                    problem => {
                        tracing::info!("No question text from image: {problem:?}");
                        stages.enter(Stage::Resolved);
                        return PipelineReport {
                            extracted: None,
                            outcome: PipelineOutcome::ExtractionFailed(problem),
                        };
                    }
                }
            }
        };

        stages.enter(Stage::Validating);
        let question = match Question::with_limit(subject, &text, self.max_question_chars) {
            Ok(q) => q,
            Err(e) => {
                tracing::debug!("Question rejected before dispatch: {e}");
                stages.enter(Stage::Resolved);
                return PipelineReport {
                    extracted,
                    outcome: PipelineOutcome::Invalid(e),
                };
            }
        };

        stages.enter(Stage::Asking);
        let outcome = self.answerer.ask(&question).await;
        stages.enter(Stage::Resolved);

        PipelineReport {
            extracted,
            outcome: PipelineOutcome::Answered(outcome),
        }
    }

    /// Start an invocation on the tokio runtime and return a cancellable handle.
    pub fn spawn(&self, input: PipelineInput, subject: Subject) -> PendingAnswer {
        let (abort, registration) = AbortHandle::new_pair();
        let pipeline = self.clone();
        let task = tokio::spawn(Abortable::new(
            async move { pipeline.run(input, subject).await },
            registration,
        ));
        PendingAnswer { task, abort }
    }
}

/// A running invocation started with [`AnswerPipeline::spawn`].
pub struct PendingAnswer {
    task: JoinHandle<Result<PipelineReport, futures_util::future::Aborted>>,
    abort: AbortHandle,
}

impl PendingAnswer {
    /// Abandon the invocation. A request already on the wire is not recalled,
    /// but its result is discarded and no further attempts are made.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Handle that cancels this invocation from elsewhere (e.g. a signal task).
    pub fn canceller(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Wait for the report; `None` if the invocation was cancelled.
    pub async fn wait(self) -> Option<PipelineReport> {
        match self.task.await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(_aborted)) => {
                tracing::debug!("Pipeline invocation cancelled");
                None
            }
            Err(e) => {
                tracing::error!("Pipeline task failed: {e}");
                None
            }
        }
    }
}

/// Enforces forward-only stage transitions and notifies the observer.
struct StageTracker<'a> {
    current: Stage,
    observer: Option<&'a StageObserver>,
}

impl<'a> StageTracker<'a> {
    fn new(observer: Option<&'a StageObserver>) -> Self {
        Self {
            current: Stage::Idle,
            observer,
        }
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(next > self.current, "stage {next:?} after {:?}", self.current);
        tracing::trace!("Stage {:?} -> {next:?}", self.current);
        self.current = next;
        if let Some(observer) = self.observer {
            observer(next);
        }
    }
}
