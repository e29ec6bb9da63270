//! Image selection for upload and splicing into outlines.

use pagedeck_core::Outline;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Existing `.jpg`/`.jpeg` files from `paths`, in order, at most `max`.
///
/// Missing files and other extensions are skipped with a warning.
pub async fn select_upload_images(paths: &[PathBuf], max: usize) -> Vec<PathBuf> {
    let mut selected = Vec::new();
    for path in paths {
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            warn!("File not found: {}", path.display());
            continue;
        }
        let is_jpeg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
        if !is_jpeg {
            warn!("Skipping non-JPG file: {}", path.display());
            continue;
        }
        selected.push(path.clone());
    }
    selected.truncate(max);
    debug!(count = selected.len(), "Selected images for upload");
    selected
}

/// Attach uploaded image descriptors to outlines pairwise: the i-th image
/// goes to the i-th outline, for at most `max` images.
///
/// `upload` is the upload response; descriptors are read from its `images`
/// array. Returns the number of images attached.
pub fn splice_images(outlines: &mut [Outline], upload: &Value, max: usize) -> usize {
    let Some(images) = upload.get("images").and_then(Value::as_array) else {
        warn!("Upload response carried no images");
        return 0;
    };

    let mut attached = 0;
    for (index, image) in images.iter().take(max).enumerate() {
        let Some(outline) = outlines.get_mut(index) else {
            warn!("No more slides to add images to (tried to add to slide {})", index);
            break;
        };
        outline.attach_image(image.clone());
        attached += 1;
    }
    attached
}
