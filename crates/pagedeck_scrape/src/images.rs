//! Image discovery and normalization.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat};
use pagedeck_error::{ScrapeError, ScrapeErrorKind};
use regex::Regex;
use reqwest::Url;
use std::io::Cursor;
use std::sync::LazyLock;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("Valid img tag regex")
});

/// `src` values of every `<img>` tag in document order, empty ones dropped.
///
/// ```
/// use pagedeck_scrape::extract_image_sources;
///
/// let html = r#"<p><img alt="a" src="/a.png"><IMG SRC='b.jpg'/><img src=""></p>"#;
/// assert_eq!(extract_image_sources(html), vec!["/a.png", "b.jpg"]);
/// ```
pub fn extract_image_sources(html: &str) -> Vec<String> {
    IMG_SRC
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
        .collect()
}

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// `data:image/...;base64,` URI carried inline
    Embedded(String),
    /// Absolute URL to download
    Linked(Url),
}

impl ImageSource {
    /// Classify `src`, resolving relative references against `page`.
    ///
    /// Returns `None` for sources that are neither inline images nor
    /// http(s) URLs once resolved.
    pub fn resolve(src: &str, page: &Url) -> Option<Self> {
        if src.starts_with("data:image") {
            return Some(Self::Embedded(src.to_string()));
        }
        let url = page.join(src).ok()?;
        matches!(url.scheme(), "http" | "https").then_some(Self::Linked(url))
    }
}

/// Decode the payload of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ScrapeError> {
    let (_, payload) = uri.split_once(',').ok_or_else(|| {
        ScrapeError::new(ScrapeErrorKind::Base64("data URI has no payload".to_string()))
    })?;
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| ScrapeError::new(ScrapeErrorKind::Base64(e.to_string())))
}

/// An image re-encoded into one of the formats kept on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// Output format
    pub format: ImageFormat,
    /// Encoded bytes
    pub bytes: Vec<u8>,
}

impl NormalizedImage {
    /// File extension for [`format`](Self::format).
    pub fn extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            _ => "jpg",
        }
    }
}

/// Decode `bytes`, flatten transparency, and re-encode.
///
/// JPEG, PNG, GIF and WebP input keep their format; anything else the
/// decoder understands becomes JPEG. Images with an alpha channel (which
/// includes expanded palettes) are flattened to RGB.
pub fn normalize_image(bytes: &[u8]) -> Result<NormalizedImage, ScrapeError> {
    let format = match image::guess_format(bytes) {
        Ok(f @ (ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP)) => f,
        _ => ImageFormat::Jpeg,
    };

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ScrapeError::new(ScrapeErrorKind::ImageDecode(e.to_string())))?;

    let flattened = if decoded.color().has_alpha() || format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(decoded.to_rgb8())
    } else {
        decoded
    };

    let mut buffer = Cursor::new(Vec::new());
    flattened
        .write_to(&mut buffer, format)
        .map_err(|e| ScrapeError::new(ScrapeErrorKind::ImageEncode(e.to_string())))?;

    Ok(NormalizedImage {
        format,
        bytes: buffer.into_inner(),
    })
}
