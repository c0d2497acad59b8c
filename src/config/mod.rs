mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::ProviderRegistry;

pub use loader::{load_config, load_system_prompt};

/// Prefix shared by every environment variable the proxy reads
pub const ENV_PREFIX: &str = "LOCAL_AI_TOOL_PROXY_";

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Per-provider overrides keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub stats: StatsConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Value sent in `Access-Control-Allow-Origin`
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

/// HTTPS certificate and key, both PEM
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TlsConfig {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
            tls: None,
        }
    }
}

impl ServerConfig {
    /// Certificate and key paths, only when both are configured
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        let tls = self.tls.as_ref()?;
        match (tls.cert_path.as_deref(), tls.key_path.as_deref()) {
            (Some(cert), Some(key)) if !cert.is_empty() && !key.is_empty() => Some((cert, key)),
            _ => None,
        }
    }

    /// Returns true if both TLS cert and key are configured
    pub fn is_tls(&self) -> bool {
        self.tls_paths().is_some()
    }

    pub fn scheme(&self) -> &'static str {
        if self.is_tls() {
            "https"
        } else {
            "http"
        }
    }
}

/// Prompt handling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Provider used when a request names none
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// File holding the system prompt sent with every request
    #[serde(default)]
    pub system_prompt_path: Option<PathBuf>,
    /// Per-call agent timeout in seconds, 0 disables
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Upper bound on agents running at once, unbounded when unset
    #[serde(default)]
    pub max_concurrent: Option<usize>,
}

fn default_provider() -> String {
    "claude".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            system_prompt_path: None,
            timeout_seconds: default_timeout(),
            max_concurrent: None,
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// Individual provider overrides
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Executable to run instead of the provider's default binary
    #[serde(default)]
    pub binary: Option<String>,
}

/// Stats logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub format: StatsFormat,
}

fn default_stats_enabled() -> bool {
    true
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: default_stats_enabled(),
            format: StatsFormat::default(),
        }
    }
}

/// Stats output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StatsFormat {
    Pretty,
    Json,
    #[default]
    Compact,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load the given file, or the first default location that exists.
    ///
    /// Without an explicit path and with no file in a default location the
    /// built-in defaults are used, so the proxy can run from environment
    /// variables alone.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                let default_paths = ["config.yaml", "config.yml"];
                for p in default_paths {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                Ok(Self::default())
            }
        }
    }

    /// Apply `LOCAL_AI_TOOL_PROXY_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to read variables. Empty values are
    /// ignored, as are ports outside 1..=65535.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|v| !v.is_empty())
        };

        if let Some(port) = get("PORT") {
            match port.parse::<u16>() {
                Ok(p) if p > 0 => self.server.port = p,
                _ => tracing::warn!(value = %port, "Ignoring invalid port from environment"),
            }
        }
        if let Some(origin) = get("ALLOWED_ORIGIN") {
            self.server.allowed_origin = origin;
        }
        if let Some(provider) = get("PROVIDER") {
            self.generation.default_provider = provider;
        }
        if let Some(path) = get("SYSTEM_PROMPT") {
            self.generation.system_prompt_path = Some(PathBuf::from(path));
        }

        let cert = get("TLS_CERT");
        let key = get("TLS_KEY");
        if cert.is_some() || key.is_some() {
            let tls = self.server.tls.get_or_insert_with(TlsConfig::default);
            if cert.is_some() {
                tls.cert_path = cert;
            }
            if key.is_some() {
                tls.key_path = key;
            }
        }
    }

    /// Check the default provider against the registry and the concurrency
    /// limit against what a semaphore can hold
    pub fn validate(&self, registry: &ProviderRegistry) -> Result<(), ConfigError> {
        if !registry.contains(&self.generation.default_provider) {
            return Err(ConfigError::Validation(format!(
                "Unknown provider: {} (valid options: {})",
                self.generation.default_provider,
                registry.names().join(", ")
            )));
        }
        match self.generation.max_concurrent {
            Some(0) => {
                return Err(ConfigError::Validation(
                    "generation.max_concurrent must be at least 1".to_string(),
                ));
            }
            Some(n) if n > tokio::sync::Semaphore::MAX_PERMITS => {
                return Err(ConfigError::Validation(format!(
                    "generation.max_concurrent must be at most {}",
                    tokio::sync::Semaphore::MAX_PERMITS
                )));
            }
            _ => {}
        }
        Ok(())
    }

    /// Read the configured system prompt file
    pub fn system_prompt(&self) -> Result<String, ConfigError> {
        let path = self.generation.system_prompt_path.as_ref().ok_or_else(|| {
            ConfigError::Validation(format!(
                "A system prompt file is required: set generation.system_prompt_path or {}SYSTEM_PROMPT",
                ENV_PREFIX
            ))
        })?;
        load_system_prompt(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Failed to read system prompt file {path}: {source}")]
    SystemPrompt {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
