//! Settings layering, secrets lookup and argument parsing.

use clap::Parser;
use pagedeck::{
    ALAI_API_KEY, ALAI_EMAIL, ALAI_PASSWORD, Cli, FIRE_CRAWL_API_KEY, Secrets, Settings,
};
use pagedeck_error::ConfigErrorKind;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn full_env() -> HashMap<String, String> {
    env(&[
        (ALAI_API_KEY, "project-key"),
        (ALAI_EMAIL, "me@example.com"),
        (ALAI_PASSWORD, "hunter2"),
        (FIRE_CRAWL_API_KEY, "fc-key"),
    ])
}

#[test]
fn test_bundled_defaults() -> anyhow::Result<()> {
    let settings = Settings::from_toml("")?;

    assert_eq!(settings.output().scrape_dir(), Path::new("scraped_data"));
    assert_eq!(settings.output().audit_dir(), Path::new("."));
    assert_eq!(
        settings.output().log_file(),
        Path::new("presentation_generator.log")
    );
    assert!(!settings.streaming().accept_invalid_certs());
    assert_eq!(settings.scrape().max_images(), 10);
    assert_eq!(settings.scrape().image_timeout(), Duration::from_secs(10));
    assert_eq!(settings.upload().max_images(), 5);
    assert!(
        settings
            .presentation()
            .instructions()
            .starts_with("Create a professional presentation with exactly 5 slides")
    );
    Ok(())
}

#[test]
fn test_override_keeps_other_defaults() -> anyhow::Result<()> {
    let settings = Settings::from_toml(
        r#"
        [streaming]
        accept_invalid_certs = true

        [upload]
        max_images = 2
        "#,
    )?;

    assert!(settings.streaming().accept_invalid_certs());
    assert_eq!(settings.upload().max_images(), 2);
    assert_eq!(settings.scrape().max_images(), 10);
    Ok(())
}

#[test]
fn test_invalid_override_is_rejected() {
    let err = Settings::from_toml("[scrape]\nmax_images = \"many\"\n").unwrap_err();
    assert!(matches!(err.kind, ConfigErrorKind::InvalidSettings(_)));
}

#[test]
fn test_secrets_from_lookup() -> anyhow::Result<()> {
    let vars = full_env();
    let secrets = Secrets::from_lookup(|name| vars.get(name).cloned())?;

    assert_eq!(secrets.credentials().email, "me@example.com");
    assert_eq!(secrets.firecrawl_key(), "fc-key");
    Ok(())
}

#[test]
fn test_secrets_debug_hides_keys() -> anyhow::Result<()> {
    let vars = full_env();
    let secrets = Secrets::from_lookup(|name| vars.get(name).cloned())?;

    let printed = format!("{:?}", secrets);
    assert!(!printed.contains("fc-key"));
    assert!(!printed.contains("hunter2"));
    Ok(())
}

#[test]
fn test_missing_secret_is_named() {
    let mut vars = full_env();
    vars.remove(ALAI_PASSWORD);

    let err = Secrets::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::MissingEnv(ALAI_PASSWORD.to_string()));
}

#[test]
fn test_blank_secret_counts_as_missing() {
    let mut vars = full_env();
    vars.insert(FIRE_CRAWL_API_KEY.to_string(), "   ".to_string());

    let err = Secrets::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
    assert_eq!(
        err.kind,
        ConfigErrorKind::MissingEnv(FIRE_CRAWL_API_KEY.to_string())
    );
}

#[test]
fn test_cli_parses_url_and_debug() -> anyhow::Result<()> {
    let cli = Cli::try_parse_from(["pagedeck", "https://example.com/post", "--debug"])?;
    assert_eq!(cli.url, "https://example.com/post");
    assert!(cli.debug);

    let quiet = Cli::try_parse_from(["pagedeck", "https://example.com"])?;
    assert!(!quiet.debug);
    Ok(())
}

#[test]
fn test_cli_requires_url() {
    assert!(Cli::try_parse_from(["pagedeck"]).is_err());
}
