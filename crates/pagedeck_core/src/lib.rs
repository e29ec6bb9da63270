//! Core data types for pagedeck.
//!
//! This crate holds the state threaded through a presentation run:
//! - [`SessionState`] - credentials and identifiers accumulated step by step
//! - [`Outline`], [`Slide`], [`Variant`] - the few server records the
//!   orchestrator inspects; everything else passes through untouched
//! - [`AuditLog`] - the append-only journal persisted at the end of a run

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod outline;
mod session;

pub use audit::{AuditEntry, AuditLog};
pub use outline::{Outline, Slide, Variant};
pub use session::{SessionState, generate_unique_id, generate_unique_id_with};
