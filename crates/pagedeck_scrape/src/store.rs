//! On-disk layout for scraped artifacts.

use crate::NormalizedImage;
use pagedeck_error::{StorageError, StorageErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Marker written when a page yields no usable image.
pub const NO_IMAGES_SENTINEL: &str = ".no_images_found";

/// Text file name for a page: the URL without its scheme, `/` replaced by `_`.
///
/// ```
/// use pagedeck_scrape::text_file_name;
///
/// assert_eq!(text_file_name("https://example.com/blog/post"), "example.com_blog_post.txt");
/// ```
pub fn text_file_name(url: &str) -> String {
    let bare = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    format!("{}.txt", bare.replace('/', "_"))
}

/// Root directory holding page text and an `images/` subdirectory.
#[derive(Debug, Clone)]
pub struct ScrapeStore {
    root: PathBuf,
}

impl ScrapeStore {
    /// Store rooted at `root`; nothing is created until [`prepare`](Self::prepare).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Image directory.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Create the root and image directories.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn prepare(&self) -> Result<(), StorageError> {
        let images = self.images_dir();
        tokio::fs::create_dir_all(&images).await.map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                images.display(),
                e
            )))
        })?;
        debug!("Scrape directories ready");
        Ok(())
    }

    /// Save cleaned page text, returning the written path.
    pub async fn save_text(&self, url: &str, text: &str) -> Result<PathBuf, StorageError> {
        let path = self.root.join(text_file_name(url));
        write(&path, text.as_bytes()).await?;
        info!("Saved clean text to {}", path.display());
        Ok(path)
    }

    /// Save the `index`-th accepted image (1-based) as `img{index}.{ext}`.
    pub async fn save_image(
        &self,
        index: usize,
        image: &NormalizedImage,
    ) -> Result<PathBuf, StorageError> {
        let path = self
            .images_dir()
            .join(format!("img{}.{}", index, image.extension()));
        write(&path, &image.bytes).await?;
        info!("Saved image to {}", path.display());
        Ok(path)
    }

    /// Record that `url` produced no images.
    pub async fn mark_no_images(&self, url: &str) -> Result<PathBuf, StorageError> {
        let path = self.images_dir().join(NO_IMAGES_SENTINEL);
        write(&path, format!("No images found for {}", url).as_bytes()).await?;
        Ok(path)
    }

    /// JPEG files in the image directory.
    pub async fn jpeg_images(&self) -> Result<Vec<PathBuf>, StorageError> {
        jpeg_images(&self.images_dir()).await
    }
}

async fn write(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    tokio::fs::write(path, contents).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })
}

/// Regular files in `dir` with a `.jpg` or `.jpeg` extension, sorted by path.
///
/// A missing directory yields an empty list.
pub async fn jpeg_images(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let read_err = |e: std::io::Error| {
        StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_err(e)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        let is_jpeg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
        if is_jpeg && entry.file_type().await.map_err(read_err)?.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
