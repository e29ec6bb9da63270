//! Firecrawl-backed page acquisition.

use crate::{ImageSource, ScrapeStore, clean_markdown, decode_data_uri, extract_image_sources, normalize_image};
use derive_getters::Getters;
use pagedeck_client::endpoints::FIRECRAWL_SCRAPE_URL;
use pagedeck_client::{ApiRequest, HttpTransport};
use pagedeck_error::{ScrapeError, ScrapeErrorKind};
use reqwest::Url;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Credential value shipped in sample configuration; never valid.
pub const PLACEHOLDER_TOKEN: &str = "your_api_token_here";

/// Result of scraping one page.
///
/// When acquisition fails, `failed` is set and `text` holds the error text
/// so callers that only want prose still get a uniform value.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ScrapedPage {
    url: String,
    text: String,
    text_path: Option<PathBuf>,
    images: Vec<PathBuf>,
    #[getter(copy)]
    failed: bool,
}

impl ScrapedPage {
    fn failure(url: &str, message: String) -> Self {
        Self {
            url: url.to_string(),
            text: message,
            text_path: None,
            images: Vec::new(),
            failed: true,
        }
    }
}

/// Scrapes pages through Firecrawl and stores their text and images.
pub struct ContentAcquirer {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    store: ScrapeStore,
    max_images: usize,
    image_timeout: Duration,
}

impl ContentAcquirer {
    /// Acquirer writing into `store`, with the default limits of 10 images
    /// and a 10 second download timeout per image.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        api_key: impl Into<String>,
        store: ScrapeStore,
    ) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            store,
            max_images: 10,
            image_timeout: Duration::from_secs(10),
        }
    }

    /// Accept at most `max` images per page.
    pub fn with_max_images(mut self, max: usize) -> Self {
        self.max_images = max;
        self
    }

    /// Per-image download timeout.
    pub fn with_image_timeout(mut self, timeout: Duration) -> Self {
        self.image_timeout = timeout;
        self
    }

    /// Output location.
    pub fn store(&self) -> &ScrapeStore {
        &self.store
    }

    /// Scrape `url`, folding any failure into a [`ScrapedPage`] with `failed` set.
    pub async fn acquire(&self, url: &str) -> ScrapedPage {
        match self.try_acquire(url).await {
            Ok(page) => page,
            Err(e) => {
                let message = e.kind.to_string();
                error!("{}", message);
                ScrapedPage::failure(url, message)
            }
        }
    }

    /// Scrape `url`.
    ///
    /// The credential and URL are checked before any request is made.
    /// Per-image failures are logged and skipped; only the page request
    /// itself, or saving its text, can fail the acquisition.
    #[instrument(skip(self))]
    pub async fn try_acquire(&self, url: &str) -> Result<ScrapedPage, ScrapeError> {
        if self.api_key.trim().is_empty() || self.api_key == PLACEHOLDER_TOKEN {
            return Err(ScrapeError::new(ScrapeErrorKind::InvalidToken));
        }
        if !url.starts_with("http") {
            return Err(ScrapeError::new(ScrapeErrorKind::InvalidUrl(url.to_string())));
        }

        self.store.prepare().await.map_err(persist_err)?;

        info!("Scraping webpage: {}", url);
        let document = self.fetch_page(url).await?;
        let data = &document["data"];

        let (text, text_path) = match data["markdown"].as_str() {
            Some(markdown) => {
                let text = clean_markdown(markdown);
                let path = self.store.save_text(url, &text).await.map_err(persist_err)?;
                (text, Some(path))
            }
            None => {
                warn!("No markdown content found in the scraped result.");
                (String::new(), None)
            }
        };

        let images = match data["html"].as_str() {
            Some(html) => self.collect_images(url, html).await,
            None => Vec::new(),
        };
        if images.is_empty() {
            warn!("No images found in the scraped result.");
            self.store.mark_no_images(url).await.map_err(persist_err)?;
        }

        Ok(ScrapedPage {
            url: url.to_string(),
            text,
            text_path,
            images,
            failed: false,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<Value, ScrapeError> {
        let payload = json!({
            "url": url,
            "formats": ["markdown", "html"],
            "onlyMainContent": true,
            "removeBase64Images": false,
            "blockAds": true,
        });
        let request = ApiRequest::post_json(FIRECRAWL_SCRAPE_URL, payload)
            .header("Authorization", format!("Bearer {}", self.api_key));

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| ScrapeError::new(ScrapeErrorKind::Transport(e.message)))?;

        if !(200..300).contains(&response.status) {
            return Err(ScrapeError::new(ScrapeErrorKind::Http {
                status: response.status,
                body: response.text(),
            }));
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| ScrapeError::new(ScrapeErrorKind::InvalidResponse(e.to_string())))
    }

    async fn collect_images(&self, url: &str, html: &str) -> Vec<PathBuf> {
        let page = match Url::parse(url) {
            Ok(page) => page,
            Err(e) => {
                warn!("Cannot resolve image sources against {}: {}", url, e);
                return Vec::new();
            }
        };

        let mut saved = Vec::new();
        for src in extract_image_sources(html) {
            if saved.len() >= self.max_images {
                break;
            }
            let Some(source) = ImageSource::resolve(&src, &page) else {
                warn!("Skipping unsupported image source {}", truncate(&src));
                continue;
            };

            let result = match self.image_bytes(&source).await {
                Ok(bytes) => normalize_image(&bytes),
                Err(e) => Err(e),
            };
            let image = match result {
                Ok(image) => image,
                Err(e) => {
                    error!("Failed to process image {}: {}", truncate(&src), e.kind);
                    continue;
                }
            };

            match self.store.save_image(saved.len() + 1, &image).await {
                Ok(path) => saved.push(path),
                Err(e) => error!("Failed to save image {}: {}", truncate(&src), e.kind),
            }
        }
        saved
    }

    async fn image_bytes(&self, source: &ImageSource) -> Result<Vec<u8>, ScrapeError> {
        match source {
            ImageSource::Embedded(uri) => decode_data_uri(uri),
            ImageSource::Linked(url) => {
                let request = ApiRequest::get(url.as_str()).timeout(self.image_timeout);
                let response = self
                    .transport
                    .execute(request)
                    .await
                    .map_err(|e| ScrapeError::new(ScrapeErrorKind::Transport(e.message)))?;
                if !(200..300).contains(&response.status) {
                    return Err(ScrapeError::new(ScrapeErrorKind::Http {
                        status: response.status,
                        body: response.text(),
                    }));
                }
                Ok(response.body)
            }
        }
    }
}

fn persist_err(e: pagedeck_error::StorageError) -> ScrapeError {
    ScrapeError::new(ScrapeErrorKind::Persist(e.kind.to_string()))
}

// Data URIs can be megabytes long.
fn truncate(src: &str) -> &str {
    match src.char_indices().nth(80) {
        Some((idx, _)) => &src[..idx],
        None => src,
    }
}
