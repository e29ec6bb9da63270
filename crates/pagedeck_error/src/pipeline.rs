//! Orchestration failures.

use crate::{ApiError, JsonError, StorageError};

/// Conditions that abort a pipeline run (or, for the per-slide kinds, a
/// single slide).
#[derive(Debug, Clone, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A request-style step failed
    #[display("{}", _0)]
    Api(ApiError),
    /// A step required the auth token before authentication succeeded
    #[display("Session has no auth token")]
    NotAuthenticated,
    /// A step required the presentation id before it was generated
    #[display("Session has no presentation id")]
    NoPresentation,
    /// Slides were requested before the first slide id was known
    #[display("Session has no primary slide id")]
    NoPrimarySlide,
    /// The presentation id was already assigned for this session
    #[display("Presentation id already assigned: {}", _0)]
    PresentationIdReassigned(String),
    /// Fewer presentation questions than fixed answers
    #[display("Expected at least {} presentation questions, got {}", expected, actual)]
    TooFewQuestions {
        /// Number of answers the policy provides
        expected: usize,
        /// Number of questions returned
        actual: usize,
    },
    /// A streaming exchange closed without a single usable message
    #[display("Streaming exchange '{}' produced no responses", _0)]
    EmptyExchange(String),
    /// A variant exchange returned too few messages for one slide
    #[display("Slide {} received {} variant messages, need at least 2", slide_id, received)]
    TooFewVariantMessages {
        /// Slide being processed
        slide_id: String,
        /// Messages received
        received: usize,
    },
    /// The variant descriptor lacked an id
    #[display("No variant id found in responses for slide {}", _0)]
    MissingVariantId(String),
    /// The slide already has an active variant
    #[display("Slide {} already has active variant {}", slide_id, active)]
    VariantAlreadyActive {
        /// Slide being processed
        slide_id: String,
        /// Variant already active
        active: String,
    },
    /// A server payload could not be interpreted
    #[display("Malformed payload in {}: {}", step, message)]
    MalformedPayload {
        /// Step that received the payload
        step: String,
        /// Parse failure description
        message: String,
    },
    /// A payload could not be serialized
    #[display("{}", _0)]
    Json(JsonError),
    /// Audit persistence failed
    #[display("{}", _0)]
    Storage(StorageError),
}

/// Pipeline error with source location tracking.
///
/// # Examples
///
/// ```
/// use pagedeck_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyExchange("generate_slides_outline".into()));
/// assert!(err.to_string().contains("produced no responses"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<ApiError> for PipelineError {
    #[track_caller]
    fn from(err: ApiError) -> Self {
        Self::new(PipelineErrorKind::Api(err))
    }
}

impl From<JsonError> for PipelineError {
    #[track_caller]
    fn from(err: JsonError) -> Self {
        Self::new(PipelineErrorKind::Json(err))
    }
}

impl From<StorageError> for PipelineError {
    #[track_caller]
    fn from(err: StorageError) -> Self {
        Self::new(PipelineErrorKind::Storage(err))
    }
}

/// Result type for orchestration steps.
pub type PipelineResult<T> = Result<T, PipelineError>;
