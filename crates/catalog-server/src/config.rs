use catalog_db_postgres::PostgresConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::cache::EntryOptions;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Shared cache tier
    #[serde(default)]
    pub redis: RedisConfig,
    /// Entry expirations for both tiers
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }

        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.postgres.url.is_empty() {
            return Err("storage.backend = \"postgres\" requires storage.postgres.url".into());
        }

        if self.redis.enabled && self.redis.url.is_empty() {
            return Err("redis.enabled=true requires redis.url".into());
        }
        if self.redis.pool_size == 0 {
            return Err("redis.pool_size must be > 0".into());
        }

        self.cache.validate()
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub postgres: PostgresConfig,
}

/// Redis configuration for the shared tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Without Redis the shared tier is kept in process memory.
    /// Default: false
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,

    /// Prefix added to every key stored in Redis, e.g. "CacheDemo_".
    #[serde(default)]
    pub instance_name: String,
}

fn default_redis_enabled() -> bool {
    false
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
            instance_name: String::new(),
        }
    }
}

/// Expirations, in seconds, for single-item and collection entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_product_absolute_secs")]
    pub product_absolute_secs: u64,
    #[serde(default = "default_product_sliding_secs")]
    pub product_sliding_secs: u64,
    #[serde(default = "default_collection_absolute_secs")]
    pub collection_absolute_secs: u64,
    #[serde(default = "default_collection_sliding_secs")]
    pub collection_sliding_secs: u64,
}

fn default_product_absolute_secs() -> u64 {
    300
}
fn default_product_sliding_secs() -> u64 {
    120
}
fn default_collection_absolute_secs() -> u64 {
    600
}
fn default_collection_sliding_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            product_absolute_secs: default_product_absolute_secs(),
            product_sliding_secs: default_product_sliding_secs(),
            collection_absolute_secs: default_collection_absolute_secs(),
            collection_sliding_secs: default_collection_sliding_secs(),
        }
    }
}

impl CacheConfig {
    /// Options for `product-{id}` entries in the local tier.
    pub fn product_entry(&self) -> EntryOptions {
        EntryOptions::new(
            Duration::from_secs(self.product_absolute_secs),
            Duration::from_secs(self.product_sliding_secs),
        )
    }

    /// Options for the `all-products` entry in the shared tier.
    pub fn collection_entry(&self) -> EntryOptions {
        EntryOptions::new(
            Duration::from_secs(self.collection_absolute_secs),
            Duration::from_secs(self.collection_sliding_secs),
        )
    }

    fn validate(&self) -> Result<(), String> {
        let pairs = [
            ("product", self.product_absolute_secs, self.product_sliding_secs),
            (
                "collection",
                self.collection_absolute_secs,
                self.collection_sliding_secs,
            ),
        ];
        for (name, absolute, sliding) in pairs {
            if absolute == 0 || sliding == 0 {
                return Err(format!("cache.{name} expirations must be > 0"));
            }
            if sliding > absolute {
                return Err(format!(
                    "cache.{name}_sliding_secs must be <= cache.{name}_absolute_secs"
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "catalog.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        } else if path.is_some() {
            return Err(format!("config file not found: {}", pathbuf.display()));
        }
        // Environment variable overrides, e.g., CATALOG__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("CATALOG")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
