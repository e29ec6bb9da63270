//! Configuration error types.

/// Configuration problems detected before any network call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A required environment variable is unset or empty
    #[display("Required environment variable {} is not set", _0)]
    MissingEnv(String),
    /// The settings file or environment overrides could not be parsed
    #[display("Invalid settings: {}", _0)]
    InvalidSettings(String),
    /// The log file or subscriber could not be initialized
    #[display("Logging setup failed: {}", _0)]
    Logging(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use pagedeck_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::MissingEnv("ALAI_EMAIL".into()));
/// assert!(err.to_string().contains("ALAI_EMAIL"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
