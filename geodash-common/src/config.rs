//! Bootstrap configuration
//!
//! Resolution priority (highest first):
//! 1. Command-line arguments (applied by the binary)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults
//!
//! A missing TOML file is not an error: defaults are used and the caller is
//! told through [`ConfigSource`], since loading happens before logging is set
//! up. Upstream credentials are only read from the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the TOML file
pub const CONFIG_PATH_ENV: &str = "GEODASH_CONFIG";
/// Environment variable overriding the geography file path
pub const GEO_FILE_ENV: &str = "GEODASH_GEO_FILE";
pub const FRANCE_TRAVAIL_CLIENT_ID_ENV: &str = "FRANCETRAVAIL_CLIENT_ID";
pub const FRANCE_TRAVAIL_CLIENT_SECRET_ENV: &str = "FRANCETRAVAIL_CLIENT_SECRET";

const DEFAULT_CONFIG_FILE: &str = "geodash.toml";

/// Root of the TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub geography: GeographyConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by the CORS layer
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// `[geography]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeographyConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

impl Default for GeographyConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

/// `[upstream]` section: base URLs and per-call timeouts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_insee_base_url")]
    pub insee_base_url: String,

    #[serde(default = "default_france_travail_base_url")]
    pub france_travail_base_url: String,

    #[serde(default = "default_france_travail_token_url")]
    pub france_travail_token_url: String,

    #[serde(default = "default_onisep_base_url")]
    pub onisep_base_url: String,

    /// Timeout for INSEE and ONISEP calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Timeout for France Travail token and data calls
    #[serde(default = "default_france_travail_timeout_secs")]
    pub france_travail_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            insee_base_url: default_insee_base_url(),
            france_travail_base_url: default_france_travail_base_url(),
            france_travail_token_url: default_france_travail_token_url(),
            onisep_base_url: default_onisep_base_url(),
            timeout_secs: default_timeout_secs(),
            france_travail_timeout_secs: default_france_travail_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn france_travail_timeout(&self) -> Duration {
        Duration::from_secs(self.france_travail_timeout_secs)
    }
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "https://ir2-dashboard-x.onrender.com".to_string(),
        "http://localhost:5500".to_string(),
        "http://127.0.0.1:5500".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("data/EPCI_2025.csv")
}

fn default_insee_base_url() -> String {
    "https://api.insee.fr/melodi/data".to_string()
}

fn default_france_travail_base_url() -> String {
    "https://api.francetravail.io/partenaire/stats-offres-demandes-emploi".to_string()
}

fn default_france_travail_token_url() -> String {
    "https://francetravail.io/connexion/oauth2/access_token".to_string()
}

fn default_onisep_base_url() -> String {
    "https://api.opendata.onisep.fr/api/1.0/dataset".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_france_travail_timeout_secs() -> u64 {
    5
}

/// OAuth2 client credentials for France Travail
#[derive(Clone, PartialEq, Eq)]
pub struct FranceTravailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for FranceTravailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FranceTravailCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl FranceTravailCredentials {
    /// Read credentials from the environment; `None` if either is missing or blank
    pub fn from_env() -> Option<Self> {
        let client_id = non_blank_env(FRANCE_TRAVAIL_CLIENT_ID_ENV)?;
        let client_secret = non_blank_env(FRANCE_TRAVAIL_CLIENT_SECRET_ENV)?;
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

fn non_blank_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Config file path: explicit argument, then `GEODASH_CONFIG`, then `./geodash.toml`
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Some(path) = non_blank_env(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// File absent; built-in defaults in use
    Defaults(PathBuf),
}

/// Load the TOML config, falling back to defaults when the file is absent
///
/// Nothing is logged here; report the returned [`ConfigSource`] once tracing
/// is initialised.
///
/// # Errors
/// Returns `Error::Config` if the file exists but cannot be read or parsed.
pub fn load_toml_config(path: &Path) -> Result<(TomlConfig, ConfigSource)> {
    if !path.exists() {
        return Ok((TomlConfig::default(), ConfigSource::Defaults(path.to_path_buf())));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    Ok((config, ConfigSource::File(path.to_path_buf())))
}

/// Geography file path: explicit argument, then `GEODASH_GEO_FILE`, then TOML
pub fn resolve_geo_file(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Some(path) = non_blank_env(GEO_FILE_ENV) {
        return PathBuf::from(path);
    }
    config.geography.csv_path.clone()
}
