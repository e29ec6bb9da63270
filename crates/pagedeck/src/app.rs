//! One end-to-end run: scrape, generate, share.

use crate::{Cli, Secrets, Settings};
use pagedeck_client::{AlaiApi, HttpTransport, ReqwestTransport, WsConnector};
use pagedeck_error::{ConfigError, ConfigErrorKind, PagedeckResult};
use pagedeck_pipeline::{Pipeline, RunReport, RunRequestBuilder};
use pagedeck_scrape::{ContentAcquirer, ScrapeStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Scrape `cli.url` and turn it into a presentation.
///
/// A page that cannot be scraped aborts before the presentation service is
/// contacted.
#[instrument(skip_all, fields(url = %cli.url))]
pub async fn run(cli: &Cli, settings: &Settings) -> PagedeckResult<RunReport> {
    let secrets = Secrets::from_env()?;
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());

    let acquirer = ContentAcquirer::new(
        transport.clone(),
        secrets.firecrawl_key().as_str(),
        ScrapeStore::new(settings.output().scrape_dir()),
    )
    .with_max_images(settings.scrape().max_images())
    .with_image_timeout(settings.scrape().image_timeout());

    let page = acquirer.try_acquire(&cli.url).await?;
    info!(chars = page.text().len(), images = page.images().len(), "Scraped page");

    let image_paths = acquirer.store().jpeg_images().await?;
    debug!("Found image paths: {:?}", image_paths);

    let pipeline = Pipeline::new(
        AlaiApi::new(transport),
        Arc::new(WsConnector::accept_invalid_certs(
            settings.streaming().accept_invalid_certs(),
        )),
        secrets.credentials().clone(),
    )
    .with_audit_dir(settings.output().audit_dir())
    .with_max_upload_images(settings.upload().max_images());

    let request = RunRequestBuilder::default()
        .content(page.text().as_str())
        .instructions(settings.presentation().instructions().as_str())
        .image_paths(image_paths)
        .build()
        .map_err(|e| ConfigError::new(ConfigErrorKind::InvalidSettings(e.to_string())))?;

    Ok(pipeline.run(&request).await?)
}
