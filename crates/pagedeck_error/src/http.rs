//! Transport-level HTTP errors.

/// A request that never produced a status line: connect failure, timeout,
/// or a body that could not be read.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} ({}) at line {} in {}", message, url, line, file)]
pub struct HttpError {
    /// The underlying error message
    pub message: String,
    /// Target URL of the failed request
    pub url: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError for `url` at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagedeck_error::HttpError;
    ///
    /// let err = HttpError::new("https://example.com", "connection refused");
    /// assert!(err.to_string().contains("connection refused"));
    /// assert_eq!(err.url, "https://example.com");
    /// ```
    #[track_caller]
    pub fn new(url: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            url: url.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
