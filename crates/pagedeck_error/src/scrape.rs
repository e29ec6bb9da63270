//! Content acquisition errors.

/// Failures while scraping a page or normalizing one of its images.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ScrapeErrorKind {
    /// Scraping credential missing or still the placeholder value
    #[display("Please provide a valid API token")]
    InvalidToken,
    /// Target URL is not http(s)
    #[display("URL must start with http:// or https://: {}", _0)]
    InvalidUrl(String),
    /// Scraping service answered with an error status
    #[display("HTTP Error {}: {}", status, body)]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response text
        body: String,
    },
    /// Request failed before a status was received
    #[display("Unexpected error: {}", _0)]
    Transport(String),
    /// Response body was not the expected JSON document
    #[display("Unexpected error: invalid scrape response: {}", _0)]
    InvalidResponse(String),
    /// Data URI payload was not valid base64
    #[display("Base64 decode error: {}", _0)]
    Base64(String),
    /// Bytes could not be decoded as an image
    #[display("Failed to process image: {}", _0)]
    ImageDecode(String),
    /// Image could not be re-encoded
    #[display("Failed to encode image: {}", _0)]
    ImageEncode(String),
    /// Writing scraped artifacts failed
    #[display("Failed to persist scrape output: {}", _0)]
    Persist(String),
}

/// Scrape error with source location tracking.
///
/// # Examples
///
/// ```
/// use pagedeck_error::{ScrapeError, ScrapeErrorKind};
///
/// let err = ScrapeError::new(ScrapeErrorKind::Http { status: 401, body: "nope".into() });
/// assert_eq!(err.kind.to_string(), "HTTP Error 401: nope");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Scrape Error: {} at line {} in {}", kind, line, file)]
pub struct ScrapeError {
    /// The kind of error that occurred
    pub kind: ScrapeErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ScrapeError {
    /// Create a new ScrapeError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ScrapeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
