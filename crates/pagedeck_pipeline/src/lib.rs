//! Orchestration of a presentation run.
//!
//! A [`Pipeline`] drives one run through a fixed sequence of steps, each an
//! awaited remote call or streaming exchange against the presentation
//! service:
//!
//! 1. authenticate
//! 2. create a presentation under a fresh, collision-checked id
//! 3. read the first slide id
//! 4. answer the service's questions and stream slide outlines
//! 5. upload images and splice them into the outlines (optional)
//! 6. fetch the calibration sample (failure tolerated)
//! 7. stream slides from the outlines
//! 8. generate, activate and persist one variant per slide
//! 9. create the share link, falling back to a direct link
//!
//! The audit log is written whether the run succeeds or aborts.

#![warn(missing_docs)]

mod images;
mod pipeline;
mod variants;

pub use images::{select_upload_images, splice_images};
pub use pipeline::{
    DEFAULT_MAX_UPLOAD_IMAGES, Pipeline, QUESTION_ANSWERS, RunReport, RunRequest,
    RunRequestBuilder, RunRequestBuilderError,
};
pub use variants::{SlideOutcome, SlideStatus, parse_slides};
