use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::app::resolver::normalize_content_type;
use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file '{0}' not found")]
    NotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub draft_store: EndpointConfig,
    pub content_api: ContentApiConfig,
    #[serde(default)]
    pub write: WriteConfig,
    #[serde(default)]
    pub content_types: BTreeMap<String, ContentTypeConfig>,
    /// Keyed by the endpoint of the validator/mapper being checked.
    #[serde(default)]
    pub health_checks: BTreeMap<String, HealthCheckConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub app_system_code: String,
    pub app_name: String,
    pub description: String,
    pub request_timeout_ms: u64,
    pub metrics_addr: Option<SocketAddr>,
    pub log_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            app_system_code: "draft-content-api".to_string(),
            app_name: "draft-content-api".to_string(),
            description: "Serves draft content, falling back to published content".to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            metrics_addr: None,
            log_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentApiConfig {
    pub endpoint: String,
    #[serde(default)]
    pub x_policies: Vec<String>,
}

/// Where unknown content types are rejected on write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentTypePolicy {
    /// The write route only accepts content types with a configured backend.
    #[default]
    AllowListed,
    /// Any content type is stored; the resolver reports unknown ones on read.
    Resolver,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    pub allowed_origin_ids: Vec<String>,
    pub content_type_policy: ContentTypePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// `POST /validate`
    Validator,
    /// `POST /map?mode=suggest`
    Mapper,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentTypeConfig {
    pub kind: BackendKind,
    pub endpoint: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthCheckConfig {
    pub id: String,
    pub name: String,
    pub business_impact: String,
    pub panic_guide: String,
    pub severity: u8,
    /// `{endpoint}` is replaced with the checked endpoint.
    pub technical_summary: String,
    pub checker_name: String,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.draft_store.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("draft_store.endpoint is empty".to_string()));
        }
        if self.content_api.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("content_api.endpoint is empty".to_string()));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("server.request_timeout_ms must be positive".to_string()));
        }
        for (content_type, backend) in &self.content_types {
            if normalize_content_type(content_type).is_empty() {
                return Err(ConfigError::Invalid(format!("empty content type key '{content_type}'")));
            }
            if backend.endpoint.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("content type '{content_type}' has no endpoint")));
            }
        }
        Ok(())
    }
}
