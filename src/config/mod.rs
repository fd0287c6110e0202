use crate::error::Error;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API server address
    #[serde(default = "default_address")]
    pub address: String,
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory with the built dashboard, served under `/`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4750
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Upstream detection backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Origin of the detection backend, without the `/api` suffix
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_ms: u64,
    /// Serve the built-in fixture data instead of calling the backend
    #[serde(default)]
    pub use_mock_data: bool,
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_backend_timeout() -> u64 {
    10000 // 10 seconds
}

/// Live status polling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    /// Interval between status fetches in milliseconds
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    2000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            log_level: default_log_level(),
            static_dir: None,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_ms: default_backend_timeout(),
            use_mock_data: false,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
        }
    }
}

impl Config {
    /// Apply environment overrides from a lookup function.
    ///
    /// Both the plain names and the `NEXT_PUBLIC_` names used by the
    /// dashboard build are honoured; the plain name wins.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| names.iter().find_map(|name| lookup(name));

        if let Some(url) = first(&["BACKEND_URL", "NEXT_PUBLIC_BACKEND_URL"]) {
            self.backend.url = url;
        }
        if let Some(flag) = first(&["USE_MOCK_DATA", "NEXT_PUBLIC_USE_MOCK_DATA"]) {
            self.backend.use_mock_data = flag.eq_ignore_ascii_case("true");
        }
        if let Some(port) = lookup("API_PORT") {
            self.api.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid API_PORT: {}", port)))?;
        }

        Ok(())
    }

    /// Validate cross-field constraints after loading.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.backend.url)
            .map_err(|e| Error::Config(format!("Invalid backend URL '{}': {}", self.backend.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Backend URL must be http or https: {}",
                self.backend.url
            ))
            .into());
        }
        if self.polling.interval_ms == 0 {
            return Err(Error::Config("Polling interval must be positive".to_string()).into());
        }
        Ok(())
    }
}

/// Load configuration from a file or use default
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => {
            let config_str = std::fs::read_to_string(path)
                .context(format!("Failed to read config file: {:?}", path))?;

            let config = if path.extension().map_or(false, |ext| ext == "json") {
                serde_json::from_str(&config_str).context("Failed to parse JSON config")?
            } else if path.extension().map_or(false, |ext| ext == "toml") {
                toml::from_str(&config_str).context("Failed to parse TOML config")?
            } else {
                return Err(anyhow::anyhow!("Unsupported config file format"));
            };

            Ok(config)
        }
        None => Ok(Config::default()),
    }
}
