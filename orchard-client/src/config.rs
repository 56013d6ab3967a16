//! Client configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then a
//! `.env` file (via `dotenvy`), then the process environment. Durations use
//! humantime syntax (`5s`, `30days`, `1m 30s`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use log::debug;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Local development API
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
/// Renew this long before expiry
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::from_secs(5);
/// 30 days
pub const DEFAULT_REFRESH_COOKIE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Overrides `base_url`
pub const ENV_API_URL: &str = "ORCHARD_API_URL";
/// Overrides `refresh_buffer` (humantime)
pub const ENV_REFRESH_BUFFER: &str = "ORCHARD_REFRESH_BUFFER";
/// Overrides `refresh_cookie_ttl` (humantime)
pub const ENV_REFRESH_COOKIE_TTL: &str = "ORCHARD_REFRESH_COOKIE_TTL";
/// Sets `request_timeout` (humantime)
pub const ENV_REQUEST_TIMEOUT: &str = "ORCHARD_REQUEST_TIMEOUT";
/// Overrides `data_dir`
pub const ENV_DATA_DIR: &str = "ORCHARD_DATA_DIR";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file {path}")]
    ReadFailed {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid TOML for this schema
    #[error("failed to parse config file {path}")]
    ParseFailed {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
    /// The base URL does not parse
    #[error("invalid base URL '{value}'")]
    InvalidBaseUrl {
        /// Offending input
        value: String,
        /// Underlying error
        #[source]
        source: url::ParseError,
    },
    /// The base URL is not http or https
    #[error("unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    /// A duration setting is not humantime syntax
    #[error("invalid duration for {key}: '{value}'")]
    InvalidDuration {
        /// Setting name
        key: &'static str,
        /// Offending input
        value: String,
        /// Underlying error
        #[source]
        source: humantime::DurationError,
    },
    /// No data directory configured and no platform default
    #[error("unable to determine the platform data directory")]
    NoDataDir,
    /// The `.env` file exists but could not be loaded
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

/// On-disk shape of `config.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    refresh_buffer: Option<String>,
    refresh_cookie_ttl: Option<String>,
    request_timeout: Option<String>,
    data_dir: Option<PathBuf>,
}

/// Settings for [`ApiClient`](crate::ApiClient)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Access tokens this close to expiry are renewed before use
    pub refresh_buffer: Duration,
    /// Max-age given to the refresh token cookie on every write
    pub refresh_cookie_ttl: Duration,
    /// `None` means requests wait for the server indefinitely
    pub request_timeout: Option<Duration>,
    /// Where file-backed stores live; platform default when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_buffer: DEFAULT_REFRESH_BUFFER,
            refresh_cookie_ttl: DEFAULT_REFRESH_COOKIE_TTL,
            request_timeout: None,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at `base_url`
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            ..Self::default()
        })
    }

    /// Replace the base URL, keeping every other setting
    pub fn with_base_url(self, base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            ..self
        })
    }

    /// Load configuration from an explicit file (which must exist) or the
    /// platform config directory (used only if present), then `.env`, then the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("[ClientConfig] Loaded env file {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let file_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        let contents = match &file_path {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|source| {
                ConfigError::ReadFailed {
                    path: path.clone(),
                    source,
                }
            })?),
            None => None,
        };

        let config = Self::from_sources(
            file_path.as_deref().zip(contents.as_deref()),
            |key| std::env::var(key).ok(),
        )?;
        debug!("[ClientConfig] Using API base URL {}", config.base_url);
        Ok(config)
    }

    /// Build from an optional `(path, toml)` pair and an environment lookup
    pub fn from_sources(
        file: Option<(&Path, &str)>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let parsed = match file {
            Some((path, contents)) => {
                toml::from_str::<ConfigFile>(contents).map_err(|source| {
                    ConfigError::ParseFailed {
                        path: path.to_path_buf(),
                        source,
                    }
                })?
            }
            None => ConfigFile::default(),
        };

        let mut config = Self::default();

        let base_url = env(ENV_API_URL).or(parsed.base_url);
        if let Some(base_url) = base_url {
            config.base_url = normalize_base_url(&base_url)?;
        }

        if let Some(value) = env(ENV_REFRESH_BUFFER).or(parsed.refresh_buffer) {
            config.refresh_buffer = parse_duration("refresh_buffer", &value)?;
        }
        if let Some(value) = env(ENV_REFRESH_COOKIE_TTL).or(parsed.refresh_cookie_ttl) {
            config.refresh_cookie_ttl = parse_duration("refresh_cookie_ttl", &value)?;
        }
        if let Some(value) = env(ENV_REQUEST_TIMEOUT).or(parsed.request_timeout) {
            config.request_timeout = Some(parse_duration("request_timeout", &value)?);
        }

        config.data_dir = env(ENV_DATA_DIR).map(PathBuf::from).or(parsed.data_dir);

        Ok(config)
    }

    /// Configured data directory, or the platform default
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .ok_or(ConfigError::NoDataDir),
        }
    }

    /// `config.toml` in the platform config directory
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "orchard", "orchard-client")
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_duration(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|source| ConfigError::InvalidDuration {
        key,
        value: value.to_string(),
        source,
    })
}
