//! Streaming exchange (WebSocket) errors.

/// Streaming session failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StreamErrorKind {
    /// Connection or handshake failed
    #[display("WebSocket connection failed: {}", _0)]
    Connect(String),
    /// TLS client configuration could not be built
    #[display("TLS configuration failed: {}", _0)]
    Tls(String),
    /// The request message could not be serialized
    #[display("Request serialization failed: {}", _0)]
    Serialize(String),
    /// Sending the request message failed
    #[display("Send error: {}", _0)]
    Send(String),
    /// The connection broke while awaiting responses
    #[display("Receive error: {}", _0)]
    Receive(String),
}

/// Streaming error with source location tracking.
///
/// # Examples
///
/// ```
/// use pagedeck_error::{StreamError, StreamErrorKind};
///
/// let err = StreamError::new(StreamErrorKind::Connect("refused".into()));
/// assert!(err.to_string().contains("WebSocket connection failed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Stream Error: {} at line {} in {}", kind, line, file)]
pub struct StreamError {
    /// The kind of error that occurred
    pub kind: StreamErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StreamError {
    /// Create a new StreamError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StreamErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
