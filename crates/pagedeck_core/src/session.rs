//! Mutable state threaded through every orchestration step.

use crate::{AuditLog, Outline};
use pagedeck_error::{PipelineError, PipelineErrorKind, PipelineResult};
use std::collections::HashSet;
use uuid::Uuid;

/// State shared across the steps of one run.
///
/// Owned by the orchestrator and passed by `&mut` into each step; there is
/// exactly one writer at a time.
///
/// # Examples
///
/// ```
/// use pagedeck_core::SessionState;
///
/// let mut session = SessionState::new();
/// assert!(session.require_token().is_err());
///
/// session.set_auth_token("secret");
/// assert_eq!(session.require_token().unwrap(), "secret");
///
/// session.assign_presentation_id("p-1").unwrap();
/// assert!(session.assign_presentation_id("p-2").is_err());
/// ```
#[derive(Debug, Default)]
pub struct SessionState {
    auth_token: Option<String>,
    presentation_id: Option<String>,
    primary_slide_id: Option<String>,
    slide_outlines: Vec<Outline>,
    audit: AuditLog,
}

impl SessionState {
    /// Fresh session with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bearer token, if authenticated.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Store the bearer token from authentication.
    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    /// Bearer token, or an error when authentication has not happened.
    pub fn require_token(&self) -> PipelineResult<&str> {
        self.auth_token
            .as_deref()
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::NotAuthenticated))
    }

    /// Presentation id, if generated.
    pub fn presentation_id(&self) -> Option<&str> {
        self.presentation_id.as_deref()
    }

    /// Set the presentation id. It can only be set once.
    pub fn assign_presentation_id(&mut self, id: impl Into<String>) -> PipelineResult<()> {
        if let Some(existing) = &self.presentation_id {
            return Err(PipelineError::new(
                PipelineErrorKind::PresentationIdReassigned(existing.clone()),
            ));
        }
        self.presentation_id = Some(id.into());
        Ok(())
    }

    /// Presentation id, or an error when it has not been generated.
    pub fn require_presentation_id(&self) -> PipelineResult<&str> {
        self.presentation_id
            .as_deref()
            .ok_or_else(|| PipelineError::new(PipelineErrorKind::NoPresentation))
    }

    /// First slide of the created presentation.
    pub fn primary_slide_id(&self) -> Option<&str> {
        self.primary_slide_id.as_deref()
    }

    /// Record the first slide id.
    pub fn set_primary_slide_id(&mut self, id: impl Into<String>) {
        self.primary_slide_id = Some(id.into());
    }

    /// Outlines accumulated from outline generation.
    pub fn slide_outlines(&self) -> &[Outline] {
        &self.slide_outlines
    }

    /// Append one generated outline.
    pub fn push_outline(&mut self, outline: Outline) {
        self.slide_outlines.push(outline);
    }

    /// Mutable outlines, for splicing uploaded images before re-submission.
    pub fn slide_outlines_mut(&mut self) -> &mut [Outline] {
        &mut self.slide_outlines
    }

    /// The run's audit journal.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Mutable audit journal.
    pub fn audit_mut(&mut self) -> &mut AuditLog {
        &mut self.audit
    }
}

/// Generate a random UUID v4 not present in `existing`.
pub fn generate_unique_id(existing: &HashSet<String>) -> String {
    generate_unique_id_with(existing, || Uuid::new_v4().to_string())
}

/// Draw candidates from `candidate` until one is not in `existing`.
///
/// Terminates as long as the generator eventually yields an unused id.
pub fn generate_unique_id_with<F>(existing: &HashSet<String>, mut candidate: F) -> String
where
    F: FnMut() -> String,
{
    loop {
        let id = candidate();
        if !existing.contains(&id) {
            return id;
        }
        tracing::debug!(id = %id, "Generated presentation id collides, retrying");
    }
}
