//! Configuration loading and validation.
//!
//! Values are layered, later layers winning:
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, picked by extension); either
//!    the path given explicitly, or `config.toml` in the platform config
//!    directory if it exists,
//! 3. environment variables prefixed with `CIVIC_`, nested with `__`
//!    (`CIVIC_SOURCE__TIMEOUT_SECS=10`).

pub mod error;

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

const ENV_PREFIX: &str = "CIVIC_";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub source: SourceConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
}

/// Where the listing page lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    /// Skip TLS certificate validation of the source.
    pub accept_invalid_certs: bool,
}
impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: civic_fetch::DEFAULT_URL.to_string(),
            timeout_secs: civic_fetch::DEFAULT_TIMEOUT.as_secs(),
            user_agent: None,
            accept_invalid_certs: false,
        }
    }
}
impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Minimum age of the held snapshot before a request triggers another
    /// fetch. Zero refetches on every request.
    pub min_refresh_secs: u64,
}
impl CacheConfig {
    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.min_refresh_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

impl Config {
    /// Load configuration from every layer.
    ///
    /// An explicit `path` must exist; the default location is only used if
    /// a file is actually there.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "Loading configuration file");
        }
        Self::from_figment(Self::figment(file.as_deref())?)
    }

    /// Builds the layered [`Figment`] without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase).as_deref() {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR)))
    }

    /// Extracts and validates a configuration.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| exn::Exn::new(ErrorKind::Invalid(e.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.source.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            exn::bail!(ErrorKind::Invalid(format!("source.url must be an http(s) URL, got {url:?}")));
        }
        if self.source.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("source.timeout_secs must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// `config.toml` inside the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "civic").map(|dirs| dirs.config_dir().join(DEFAULT_FILENAME))
    }
}
