//! Errors raised by request/response calls against the presentation API.

/// Why a single remote call failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ApiErrorKind {
    /// The service answered with a status other than 200
    #[display("Status {}: {}", status, body)]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response text
        body: String,
    },
    /// The request never completed
    #[display("Transport failure: {}", _0)]
    Transport(String),
    /// A 200 response carried a body that was not valid JSON
    #[display("Unparseable response body: {}", _0)]
    Parse(String),
    /// A 200 response did not carry what the step needs
    #[display("{}", _0)]
    Rejected(String),
    /// A local file destined for upload could not be read
    #[display("Upload file unreadable: {}", _0)]
    Upload(String),
}

/// Failed remote call, tagged with the audit step it belonged to.
///
/// # Examples
///
/// ```
/// use pagedeck_error::{ApiError, ApiErrorKind};
///
/// let err = ApiError::new(
///     "create_new_presentation",
///     ApiErrorKind::Status { status: 500, body: "boom".into() },
/// );
/// assert!(err.to_string().contains("Status 500: boom"));
/// assert_eq!(err.step, "create_new_presentation");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("API Error [{}]: {} at line {} in {}", step, kind, line, file)]
pub struct ApiError {
    /// Audit step name of the call
    pub step: String,
    /// The kind of error that occurred
    pub kind: ApiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ApiError {
    /// Create a new ApiError with automatic location tracking.
    #[track_caller]
    pub fn new(step: impl Into<String>, kind: ApiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            step: step.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
