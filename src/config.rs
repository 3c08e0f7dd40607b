use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ArtyError, Result};

pub const DEFAULT_PORT: u16 = 9002;
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_POLLINATIONS_URL: &str = "https://image.pollinations.ai";
pub const DEFAULT_HISTORY_FILE: &str = "arty-ai-history.json";
pub const DEFAULT_REHOST_DIR: &str = "media";

#[derive(Debug, Clone)]
pub struct PollinationsConfig {
    pub base_url: String,
    /// Draw a random seed for requests that did not pin one.
    pub cache_bust: bool,
}

/// Where a generated image URL points once generation finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Hand back the upstream URL as-is.
    PassThrough,
    /// Fetch the upstream bytes and store them, returning our own URL.
    Rehost,
}

impl FromStr for DeliveryPolicy {
    type Err = ArtyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass-through" | "passthrough" => Ok(DeliveryPolicy::PassThrough),
            "rehost" => Ok(DeliveryPolicy::Rehost),
            other => Err(ArtyError::Config(format!("Unknown delivery policy: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RehostConfig {
    pub dir: PathBuf,
    pub public_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    Memory,
    File,
    Upstash,
}

impl FromStr for HistoryBackend {
    type Err = ArtyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(HistoryBackend::Memory),
            "file" => Ok(HistoryBackend::File),
            "upstash" => Ok(HistoryBackend::Upstash),
            other => Err(ArtyError::Config(format!("Unknown history backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstashConfig {
    pub url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub pollinations: PollinationsConfig,
    pub delivery: DeliveryPolicy,
    pub rehost: RehostConfig,
    pub history_backend: HistoryBackend,
    pub history_file: PathBuf,
    pub upstash: Option<UpstashConfig>,
}

impl Default for PollinationsConfig {
    fn default() -> Self {
        PollinationsConfig {
            base_url: DEFAULT_POLLINATIONS_URL.to_string(),
            cache_bust: true,
        }
    }
}

impl PollinationsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("POLLINATIONS_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_POLLINATIONS_URL.to_string());
        let cache_bust = env::var("CACHE_BUST").ok().map_or(true, |val| val != "false");

        PollinationsConfig {
            base_url,
            cache_bust,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_bust(mut self, enabled: bool) -> Self {
        self.cache_bust = enabled;
        self
    }
}

impl Default for RehostConfig {
    fn default() -> Self {
        RehostConfig {
            dir: PathBuf::from(DEFAULT_REHOST_DIR),
            public_base_url: None,
        }
    }
}

impl RehostConfig {
    pub fn from_env() -> Self {
        let dir = env::var("REHOST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_REHOST_DIR));
        let public_base_url = env::var("PUBLIC_BASE_URL").ok();

        RehostConfig {
            dir,
            public_base_url,
        }
    }
}

impl UpstashConfig {
    pub fn new() -> Self {
        UpstashConfig {
            url: None,
            token: None,
        }
    }

    pub fn with_credentials(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self.token = Some(token.into());
        self
    }

    pub fn from_env() -> Self {
        let url = env::var("UPSTASH_URL").ok();
        let token = env::var("UPSTASH_TOKEN").ok();

        UpstashConfig { url, token }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            host: None,
            pollinations: PollinationsConfig::default(),
            delivery: DeliveryPolicy::PassThrough,
            rehost: RehostConfig::default(),
            history_backend: HistoryBackend::File,
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            upstash: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let host = env::var("HOST").ok();
        let delivery = match env::var("DELIVERY") {
            Ok(val) => val.parse()?,
            Err(_) => DeliveryPolicy::PassThrough,
        };
        let history_backend = match env::var("HISTORY_BACKEND") {
            Ok(val) => val.parse()?,
            Err(_) => HistoryBackend::File,
        };
        let history_file = env::var("HISTORY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_HISTORY_FILE));
        let upstash = if history_backend == HistoryBackend::Upstash {
            Some(UpstashConfig::from_env())
        } else {
            None
        };

        Ok(Config {
            port,
            host,
            pollinations: PollinationsConfig::from_env(),
            delivery,
            rehost: RehostConfig::from_env(),
            history_backend,
            history_file,
            upstash,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_pollinations(mut self, config: PollinationsConfig) -> Self {
        self.pollinations = config;
        self
    }

    pub fn with_rehost(mut self, config: RehostConfig) -> Self {
        self.rehost = config;
        self.delivery = DeliveryPolicy::Rehost;
        self
    }

    pub fn with_memory_history(mut self) -> Self {
        self.history_backend = HistoryBackend::Memory;
        self
    }

    pub fn with_history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.history_file = path.into();
        self.history_backend = HistoryBackend::File;
        self
    }

    pub fn with_upstash(mut self, config: UpstashConfig) -> Self {
        self.upstash = Some(config);
        self.history_backend = HistoryBackend::Upstash;
        self
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Base URL that rehosted media is served from.
    pub fn public_base_url(&self) -> String {
        self.rehost
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }
}
