//! Error types for pagedeck.
//!
//! Every error follows the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind and records where it was raised
//! - constructors use `#[track_caller]` so the location is captured automatically
//!
//! # Examples
//!
//! ```
//! use pagedeck_error::{ConfigError, ConfigErrorKind, PagedeckResult};
//!
//! fn load() -> PagedeckResult<String> {
//!     Err(ConfigError::new(ConfigErrorKind::MissingEnv("ALAI_API_KEY".into())))?
//! }
//!
//! assert!(load().unwrap_err().to_string().contains("ALAI_API_KEY"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod config;
mod error;
mod http;
mod json;
mod pipeline;
mod scrape;
mod storage;
mod stream;

pub use api::{ApiError, ApiErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{PagedeckError, PagedeckErrorKind, PagedeckResult};
pub use http::HttpError;
pub use json::JsonError;
pub use pipeline::{PipelineError, PipelineErrorKind, PipelineResult};
pub use scrape::{ScrapeError, ScrapeErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use stream::{StreamError, StreamErrorKind};
