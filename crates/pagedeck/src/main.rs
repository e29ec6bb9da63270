//! pagedeck CLI binary.

use clap::Parser;
use pagedeck::{Cli, Settings, logging};
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // .env is optional; real environment variables win
    let _ = dotenvy::dotenv();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(cli.debug, settings.output().log_file()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match pagedeck::run(&cli, &settings).await {
        Ok(report) => {
            info!("Presentation available at: {}", report.link());
            println!("{}", report.link());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to create presentation: {}", e);
            ExitCode::FAILURE
        }
    }
}
