//! Web page acquisition for pagedeck.
//!
//! [`ContentAcquirer`] asks the Firecrawl service for a page's markdown and
//! HTML, reduces the markdown to plain prose with [`clean_markdown`], and
//! saves up to a configured number of the page's images under a
//! [`ScrapeStore`].
//!
//! ```text
//! scraped_data/
//! ├── example.com_article.txt
//! └── images/
//!     ├── img1.jpg
//!     ├── img2.png
//!     └── .no_images_found   (only when nothing was accepted)
//! ```

#![warn(missing_docs)]

mod acquirer;
mod images;
mod markdown;
mod store;

pub use acquirer::{ContentAcquirer, PLACEHOLDER_TOKEN, ScrapedPage};
pub use images::{
    ImageSource, NormalizedImage, decode_data_uri, extract_image_sources, normalize_image,
};
pub use markdown::clean_markdown;
pub use store::{NO_IMAGES_SENTINEL, ScrapeStore, jpeg_images, text_file_name};
