//! Append-only audit journal.

use chrono::{DateTime, Local};
use derive_getters::Getters;
use pagedeck_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Outcome of one meaningful operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct AuditEntry {
    /// When the entry was recorded
    timestamp: DateTime<Local>,
    /// Step name, e.g. `authentication` or `create_slides_from_outlines_response`
    step: String,
    /// Whether the operation succeeded
    #[getter(copy)]
    success: bool,
    /// Payload received (or sent, for `*_request` entries)
    data: Value,
    /// Raw error text for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Ordered journal of every step outcome in a run.
///
/// # Examples
///
/// ```
/// use pagedeck_core::AuditLog;
/// use serde_json::json;
///
/// let mut log = AuditLog::new();
/// log.record_success("authentication", json!({"access_token": "t"}));
/// log.record_failure("get_presentation_details", json!({}), "No slides found in the presentation");
///
/// assert_eq!(log.len(), 2);
/// assert!(!log.entries()[1].success());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful entry.
    pub fn record_success(&mut self, step: impl Into<String>, data: Value) {
        self.push(step.into(), true, data, None);
    }

    /// Append a failed entry with its error text.
    pub fn record_failure(
        &mut self,
        step: impl Into<String>,
        data: Value,
        error: impl Into<String>,
    ) {
        self.push(step.into(), false, data, Some(error.into()));
    }

    fn push(&mut self, step: String, success: bool, data: Value, error: Option<String>) {
        tracing::trace!(step = %step, success, "audit entry");
        self.entries.push(AuditEntry {
            timestamp: Local::now(),
            step,
            success,
            data,
            error,
        });
    }

    /// All entries in chronological order.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step names in order, convenient for assertions and summaries.
    pub fn steps(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.step.as_str()).collect()
    }

    /// The persisted document: run metadata plus every entry.
    pub fn to_document(&self, presentation_id: Option<&str>, slide_id: Option<&str>) -> Value {
        json!({
            "metadata": {
                "generated_at": Local::now().to_rfc3339(),
                "presentation_id": presentation_id,
                "slide_id": slide_id,
            },
            "responses": self.entries,
        })
    }

    /// Write the journal to `presentation_responses_{timestamp}.json` in `dir`.
    ///
    /// Returns the path written.
    #[tracing::instrument(skip(self), fields(entries = self.entries.len()))]
    pub async fn persist(
        &self,
        dir: &Path,
        presentation_id: Option<&str>,
        slide_id: Option<&str>,
    ) -> Result<PathBuf, StorageError> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        let filename = format!(
            "presentation_responses_{}.json",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);

        let document = self.to_document(presentation_id, slide_id);
        let body = serde_json::to_vec_pretty(&document).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", path.display(), e)))
        })?;

        tokio::fs::write(&path, body).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", path.display(), e)))
        })?;

        tracing::info!(path = %path.display(), "All responses saved");
        Ok(path)
    }
}
