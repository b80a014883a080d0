use reqwest::Url;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::ports::{ConfigError, ConfigResult};

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const PORT_VAR: &str = "PORT";
pub const DEFAULT_PORT: u16 = 3000;

const FUNCTION_PATH: &str = "/functions/v1/todos";

/// Everything the proxy needs to reach the upstream store, checked once at startup.
#[derive(Clone)]
pub struct ProxyConfig {
    pub supabase_url: Url,
    pub api_key: String,
    pub bind: IpAddr,
    pub port: u16,
}

impl ProxyConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };

        let raw_url = non_empty(SUPABASE_URL_VAR)?;
        let supabase_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidValue {
            name: SUPABASE_URL_VAR,
            reason: e.to_string(),
        })?;
        if !matches!(supabase_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: SUPABASE_URL_VAR,
                reason: format!("unsupported scheme '{}'", supabase_url.scheme()),
            });
        }

        let api_key = non_empty(SUPABASE_KEY_VAR)?;

        let port = match lookup(PORT_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: PORT_VAR,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            supabase_url,
            api_key,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_bind(mut self, bind: IpAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Endpoint of the Edge Function that owns the list.
    pub fn function_url(&self) -> String {
        format!(
            "{}{}",
            self.supabase_url.as_str().trim_end_matches('/'),
            FUNCTION_PATH
        )
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("supabase_url", &self.supabase_url.as_str())
            .field("api_key", &"<redacted>")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .finish()
    }
}
