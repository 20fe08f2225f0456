//! Configuration management

use std::{env, path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    /// Environment files to load before resolving secrets.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    #[serde(default)]
    pub env_files: Vec<String>,
    /// HTTP transport configuration
    pub server: ServerConfig,
    /// Prometheus backend configuration
    pub prometheus: PrometheusConfig,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Prometheus backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    /// Base URL of the Prometheus-compatible API (required)
    pub url: String,
    /// Outbound request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Maximum allowed `query_range` window in days
    pub max_range_days: u32,
    /// Maximum allowed computed sample count for `query_range`
    pub max_samples: u64,
    /// Default `limit` applied when a tool call omits it (0 = disabled)
    pub default_limit: u64,
    /// Bearer token for backend authentication.
    /// Supports a literal value or `env:VAR_NAME` indirection.
    /// Takes precedence over basic credentials.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Username for basic authentication (supports `env:VAR_NAME`)
    #[serde(default)]
    pub username: Option<String>,
    /// Password for basic authentication (supports `env:VAR_NAME`)
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: Duration::from_secs(30),
            max_range_days: 31,
            max_samples: 110_000,
            default_limit: 10,
            bearer_token: None,
            username: None,
            password: None,
        }
    }
}

impl PrometheusConfig {
    /// Resolve the bearer token (expand `env:VAR` indirection)
    #[must_use]
    pub fn resolve_bearer_token(&self) -> Option<String> {
        self.bearer_token.as_deref().map(resolve_secret)
    }

    /// Resolve the basic-auth username (expand `env:VAR` indirection)
    #[must_use]
    pub fn resolve_username(&self) -> Option<String> {
        self.username.as_deref().map(resolve_secret)
    }

    /// Resolve the basic-auth password (expand `env:VAR` indirection)
    #[must_use]
    pub fn resolve_password(&self) -> Option<String> {
        self.password.as_deref().map(resolve_secret)
    }
}

/// Resolve a secret value (expand `env:VAR_NAME`, fall back to the literal)
fn resolve_secret(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix("env:") {
        env::var(var_name).unwrap_or_else(|_| value.to_string())
    } else {
        value.to_string()
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        // Load from file if provided
        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        // Merge environment variables (MCP_PROMETHEUS_ prefix)
        figment = figment.merge(Env::prefixed("MCP_PROMETHEUS_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // Load env files into the process environment so `env:VAR`
        // secret indirection can see them.
        config.load_env_files();

        Ok(config)
    }

    /// Validate the configuration after CLI overrides have been applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the Prometheus base URL is missing or invalid.
    pub fn validate(&self) -> Result<()> {
        if self.prometheus.url.is_empty() {
            return Err(Error::Config(
                "Prometheus base URL must be provided (prometheus.url or PROMETHEUS_BASE_URL)"
                    .to_string(),
            ));
        }
        Url::parse(&self.prometheus.url)
            .map_err(|e| Error::Config(format!("Invalid Prometheus URL: {e}")))?;
        Ok(())
    }

    /// Load environment files into the process environment.
    /// Supports ~ expansion. Files that don't exist are silently skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => {
                        tracing::info!("Loaded env file: {expanded}");
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load env file {expanded}: {e}");
                    }
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }
}
