//! Top-level error wrapper types.

use crate::{ConfigError, PipelineError, ScrapeError, StorageError};

/// Every error a pagedeck run can surface.
///
/// # Examples
///
/// ```
/// use pagedeck_error::{PagedeckError, PagedeckErrorKind, StorageError, StorageErrorKind};
///
/// let err: PagedeckError =
///     StorageError::new(StorageErrorKind::FileWrite("audit.json".into())).into();
/// assert!(matches!(err.kind(), PagedeckErrorKind::Storage(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PagedeckErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Local storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Content acquisition error
    #[from(ScrapeError)]
    Scrape(ScrapeError),
    /// Orchestration error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// pagedeck error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("pagedeck Error: {}", _0)]
pub struct PagedeckError(Box<PagedeckErrorKind>);

impl PagedeckError {
    /// Create a new error from a kind.
    pub fn new(kind: PagedeckErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PagedeckErrorKind {
        &self.0
    }
}

impl<T> From<T> for PagedeckError
where
    T: Into<PagedeckErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for pagedeck operations.
pub type PagedeckResult<T> = std::result::Result<T, PagedeckError>;
