use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Client-side settings persisted between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_config(&self) -> ConfigResult<ClientConfig>;
    async fn save_config(&self, config: &ClientConfig) -> ConfigResult<()>;
}
