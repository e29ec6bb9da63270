//! Tests for page acquisition against a scripted transport.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use pagedeck_client::Method;
use pagedeck_client::testing::MockTransport;
use pagedeck_error::ScrapeErrorKind;
use pagedeck_scrape::{ContentAcquirer, NO_IMAGES_SENTINEL, PLACEHOLDER_TOKEN, ScrapeStore};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

const PAGE: &str = "https://example.com/blog/post";

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).expect("encode test image");
    buffer.into_inner()
}

fn firecrawl_body(markdown: &str, html: &str) -> Vec<u8> {
    json!({"success": true, "data": {"markdown": markdown, "html": html}})
        .to_string()
        .into_bytes()
}

fn acquirer(transport: &MockTransport, dir: &TempDir) -> ContentAcquirer {
    ContentAcquirer::new(
        Arc::new(transport.clone()),
        "fc-key",
        ScrapeStore::new(dir.path().join("scraped_data")),
    )
}

#[tokio::test]
async fn test_embedded_and_linked_images_saved() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let jpeg = encode(DynamicImage::ImageRgb8(RgbImage::new(8, 8)), ImageFormat::Jpeg);
    let png = encode(DynamicImage::ImageRgba8(RgbaImage::new(8, 8)), ImageFormat::Png);
    let html = format!(
        r#"<img src="data:image/jpeg;base64,{}"><img src="/a.png"><img src="b.png">"#,
        STANDARD.encode(&jpeg)
    );

    let transport = MockTransport::new();
    transport.respond(Method::Post, "firecrawl.dev", 200, firecrawl_body("# Hello\n\n**World**", &html));
    transport.respond(Method::Get, "example.com/a.png", 200, png.clone());
    transport.respond(Method::Get, "example.com/blog/b.png", 200, png);

    let page = acquirer(&transport, &dir).try_acquire(PAGE).await?;

    assert!(!page.failed());
    assert_eq!(page.text(), "Hello\n\nWorld");
    let names: Vec<_> = page
        .images()
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    assert_eq!(names, vec!["img1.jpg", "img2.png", "img3.png"]);

    let text_path = dir.path().join("scraped_data/example.com_blog_post.txt");
    assert_eq!(tokio::fs::read_to_string(&text_path).await?, "Hello\n\nWorld");
    assert!(!dir.path().join("scraped_data/images").join(NO_IMAGES_SENTINEL).exists());

    let firecrawl = &transport.requests_to("firecrawl.dev")[0];
    assert_eq!(firecrawl.header_value("Authorization"), Some("Bearer fc-key"));
    let linked = transport.requests_to("a.png");
    assert_eq!(linked[0].timeout, Some(std::time::Duration::from_secs(10)));
    Ok(())
}

#[tokio::test]
async fn test_bad_image_skipped_and_numbering_continues() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let png = encode(DynamicImage::ImageRgb8(RgbImage::new(4, 4)), ImageFormat::Png);
    let html = r#"<img src="broken.png"><img src="missing.png"><img src="good.png">"#;

    let transport = MockTransport::new();
    transport.respond(Method::Post, "firecrawl.dev", 200, firecrawl_body("text", html));
    transport.respond(Method::Get, "broken.png", 200, b"garbage".to_vec());
    transport.respond(Method::Get, "missing.png", 404, "not found");
    transport.respond(Method::Get, "good.png", 200, png);

    let page = acquirer(&transport, &dir).try_acquire(PAGE).await?;

    assert_eq!(page.images().len(), 1);
    assert!(page.images()[0].ends_with("images/img1.png"));
    Ok(())
}

#[tokio::test]
async fn test_image_limit_respected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let png = encode(DynamicImage::ImageRgb8(RgbImage::new(2, 2)), ImageFormat::Png);
    let html: String = (0..5).map(|i| format!(r#"<img src="i{}.png">"#, i)).collect();

    let transport = MockTransport::new();
    transport.respond(Method::Post, "firecrawl.dev", 200, firecrawl_body("text", &html));
    transport.respond(Method::Get, "example.com/blog/i", 200, png);

    let page = acquirer(&transport, &dir)
        .with_max_images(2)
        .try_acquire(PAGE)
        .await?;

    assert_eq!(page.images().len(), 2);
    assert_eq!(transport.requests_to("example.com/blog/i").len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_no_images_writes_sentinel() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let transport = MockTransport::new();
    transport.respond(Method::Post, "firecrawl.dev", 200, firecrawl_body("just text", "<p>hi</p>"));

    let page = acquirer(&transport, &dir).try_acquire(PAGE).await?;

    assert!(page.images().is_empty());
    let sentinel = dir.path().join("scraped_data/images").join(NO_IMAGES_SENTINEL);
    assert_eq!(
        tokio::fs::read_to_string(sentinel).await?,
        format!("No images found for {}", PAGE)
    );
    Ok(())
}

#[tokio::test]
async fn test_placeholder_token_makes_no_request() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let transport = MockTransport::new();
    let acquirer = ContentAcquirer::new(
        Arc::new(transport.clone()),
        PLACEHOLDER_TOKEN,
        ScrapeStore::new(dir.path()),
    );

    let err = acquirer.try_acquire(PAGE).await.expect_err("placeholder");
    assert_eq!(err.kind, ScrapeErrorKind::InvalidToken);

    let page = acquirer.acquire(PAGE).await;
    assert!(page.failed());
    assert_eq!(page.text(), "Please provide a valid API token");
    assert!(transport.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_non_http_url_makes_no_request() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let transport = MockTransport::new();

    let err = acquirer(&transport, &dir)
        .try_acquire("ftp://example.com")
        .await
        .expect_err("bad url");

    assert!(matches!(err.kind, ScrapeErrorKind::InvalidUrl(_)));
    assert!(transport.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_http_error_becomes_failed_page() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let transport = MockTransport::new();
    transport.respond(Method::Post, "firecrawl.dev", 402, "payment required");

    let page = acquirer(&transport, &dir).acquire(PAGE).await;

    assert!(page.failed());
    assert_eq!(page.text(), "HTTP Error 402: payment required");
    Ok(())
}

#[tokio::test]
async fn test_jpeg_listing_is_sorted_and_filtered() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let store = ScrapeStore::new(dir.path());
    store.prepare().await?;
    for name in ["img2.jpg", "img1.JPEG", "img3.png", ".no_images_found"] {
        tokio::fs::write(store.images_dir().join(name), b"x").await?;
    }

    let listed = store.jpeg_images().await?;

    assert_eq!(
        listed,
        vec![store.images_dir().join("img1.JPEG"), store.images_dir().join("img2.jpg")]
    );
    Ok(())
}
