//! Command-line arguments.

use clap::Parser;

/// Generate a presentation from a web page.
#[derive(Debug, Clone, Parser)]
#[command(name = "pagedeck")]
#[command(about = "Generate an Alai presentation from a webpage", long_about = None)]
#[command(version)]
pub struct Cli {
    /// URL of the webpage to convert into a presentation
    pub url: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
