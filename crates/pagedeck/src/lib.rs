//! pagedeck: turn a web page into a shareable Alai presentation.
//!
//! The binary scrapes the page with [`pagedeck_scrape`], then hands the
//! cleaned text and JPEG images to [`pagedeck_pipeline`], which drives the
//! presentation service and writes the audit log.

#![warn(missing_docs)]

mod app;
mod cli;
mod config;
pub mod logging;

pub use app::run;
pub use cli::Cli;
pub use config::{
    ALAI_API_KEY, ALAI_EMAIL, ALAI_PASSWORD, FIRE_CRAWL_API_KEY, OutputSettings,
    PresentationSettings, ScrapeSettings, Secrets, Settings, StreamingSettings, UploadSettings,
};

pub use pagedeck_client as client;
pub use pagedeck_core as core;
pub use pagedeck_error as error;
pub use pagedeck_pipeline as pipeline;
pub use pagedeck_scrape as scrape;
