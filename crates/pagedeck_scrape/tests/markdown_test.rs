//! Tests for markdown cleanup.

use pagedeck_scrape::clean_markdown;

const SAMPLES: &[&str] = &[
    "# Heading\n\nBody with **bold** and *italic* and `code`.",
    "- # nested heading behind a bullet\n- **- bold bullet**",
    "![logo](https://cdn.example.com/logo.png)\n\nVisit [our site](https://example.com) or https://example.com/raw",
    "| a | b |\n|---|---|\n| 1 | 2 |\n\nAfter table",
    "Line one   with\t\tspaces   \n\n\n\n\nLine two",
    "---\n***\n___\nText between rules\n---",
    "__underlined__ snake_case_word and ``double ticks``",
    "   \n\n  ",
    "* star bullet\n+ plus bullet\n  - indented bullet",
];

#[test]
fn test_clean_markdown_is_idempotent() {
    for sample in SAMPLES {
        let once = clean_markdown(sample);
        assert_eq!(clean_markdown(&once), once, "not idempotent for {:?}", sample);
    }
}

#[test]
fn test_links_keep_text_and_images_vanish() {
    let cleaned = clean_markdown(SAMPLES[2]);
    assert_eq!(cleaned, "Visit our site or");
}

#[test]
fn test_emphasis_and_headings_stripped() {
    assert_eq!(
        clean_markdown(SAMPLES[0]),
        "Heading\n\nBody with bold and italic and code."
    );
}

#[test]
fn test_tables_removed() {
    assert_eq!(clean_markdown(SAMPLES[3]), "After table");
}

#[test]
fn test_whitespace_collapsed() {
    assert_eq!(clean_markdown(SAMPLES[4]), "Line one with spaces\n\nLine two");
}

#[test]
fn test_bullets_removed_per_line() {
    assert_eq!(
        clean_markdown(SAMPLES[8]),
        "star bullet\nplus bullet\nindented bullet"
    );
}

#[test]
fn test_blank_input_is_empty() {
    assert_eq!(clean_markdown(SAMPLES[7]), "");
}
