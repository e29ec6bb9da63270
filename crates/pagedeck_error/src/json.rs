//! JSON error types.

/// JSON serialization/deserialization error with source location.
///
/// # Examples
///
/// ```
/// use pagedeck_error::{JsonError, PipelineError, PipelineErrorKind};
///
/// let parse: serde_json::Error = serde_json::from_str::<u8>("oops").unwrap_err();
/// let err = PipelineError::from(JsonError::from(parse));
/// assert!(matches!(err.kind, PipelineErrorKind::Json(_)));
/// assert!(err.to_string().contains("JSON Error"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// The underlying error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError with the given message at the current location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<serde_json::Error> for JsonError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}
