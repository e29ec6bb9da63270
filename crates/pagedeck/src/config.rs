//! Settings and credentials.
//!
//! Settings are layered, later sources winning:
//! 1. Bundled defaults (include_str! from pagedeck.toml)
//! 2. ~/.config/pagedeck/pagedeck.toml
//! 3. ./pagedeck.toml
//! 4. `PAGEDECK__SECTION__KEY` environment variables
//!
//! Credentials come only from the environment (a `.env` file is loaded by
//! the binary before anything else).

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use pagedeck_client::Credentials;
use pagedeck_error::{ConfigError, ConfigErrorKind};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

const DEFAULT_CONFIG: &str = include_str!("../pagedeck.toml");

/// Where artifacts are written.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct OutputSettings {
    /// Root for scraped text and images
    scrape_dir: PathBuf,
    /// Directory for audit logs
    audit_dir: PathBuf,
    /// Log file, appended to on every run
    log_file: PathBuf,
}

/// Streaming session options.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct StreamingSettings {
    #[getter(copy)]
    accept_invalid_certs: bool,
}

/// Page acquisition limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct ScrapeSettings {
    #[getter(copy)]
    max_images: usize,
    #[getter(copy)]
    image_timeout_secs: u64,
}

impl ScrapeSettings {
    /// Per-image download timeout.
    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}

/// Upload limits.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct UploadSettings {
    #[getter(copy)]
    max_images: usize,
}

/// Presentation brief.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct PresentationSettings {
    instructions: String,
}

/// All non-secret settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct Settings {
    output: OutputSettings,
    streaming: StreamingSettings,
    scrape: ScrapeSettings,
    upload: UploadSettings,
    presentation: PresentationSettings,
}

impl Settings {
    /// Load from every layer.
    pub fn load() -> Result<Self, ConfigError> {
        debug!("Loading settings: env > ./pagedeck.toml > home > bundled defaults");
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/pagedeck/pagedeck.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("pagedeck").required(false))
            .add_source(
                Environment::with_prefix("PAGEDECK")
                    .separator("__")
                    .try_parsing(true),
            );

        deserialize(builder.build())
    }

    /// Bundled defaults overlaid with `toml`; no files or environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        deserialize(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from_str(toml, FileFormat::Toml))
                .build(),
        )
    }
}

fn deserialize(built: Result<Config, config::ConfigError>) -> Result<Settings, ConfigError> {
    built
        .map_err(|e| {
            ConfigError::new(ConfigErrorKind::InvalidSettings(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            ConfigError::new(ConfigErrorKind::InvalidSettings(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
}

/// Environment variable names for each secret.
pub const ALAI_API_KEY: &str = "ALAI_API_KEY";
/// Account e-mail variable.
pub const ALAI_EMAIL: &str = "ALAI_EMAIL";
/// Account password variable.
pub const ALAI_PASSWORD: &str = "ALAI_PASSWORD";
/// Scraping service key variable.
pub const FIRE_CRAWL_API_KEY: &str = "FIRE_CRAWL_API_KEY";

/// Secrets required for a run.
#[derive(Clone, Getters)]
pub struct Secrets {
    credentials: Credentials,
    firecrawl_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Secrets {
    /// Read every secret from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read every secret through `lookup`; unset or blank values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::new(ConfigErrorKind::MissingEnv(name.to_string())))
        };
        Ok(Self {
            credentials: Credentials {
                api_key: require(ALAI_API_KEY)?,
                email: require(ALAI_EMAIL)?,
                password: require(ALAI_PASSWORD)?,
            },
            firecrawl_key: require(FIRE_CRAWL_API_KEY)?,
        })
    }
}
