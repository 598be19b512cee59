use crate::types::RequestKind;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("listener port cannot be 0")]
    InvalidPort,

    #[error("upstream api key cannot be empty")]
    EmptyApiKey,

    #[error("database url cannot be empty")]
    EmptyDatabaseUrl,

    #[error("redis url cannot be empty")]
    EmptyRedisUrl,

    #[error("champion data dir cannot be empty")]
    EmptyChampionDataDir,
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 8300,
        }
    }
}

/// Upstream game-data provider configuration
#[derive(Clone, Debug, Deserialize)]
pub struct UpstreamConfig {
    /// API key attached to every upstream request
    pub api_key: String,
    /// Overrides the per-region platform host. Used by deployments that go
    /// through a mirror, and by tests.
    pub base_url: Option<Url>,
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,
}

/// Durable store (accounts + match cache) configuration
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Delay between connection attempts while the store is unreachable at
    /// startup.
    #[serde(default = "default_connect_backoff_secs")]
    pub connect_backoff_secs: u64,
}

/// Volatile cache (redis) configuration
#[derive(Clone, Debug, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    /// Delay between reconnection attempts once the connection is lost.
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,
}

/// Per-kind expiry for volatile cache entries, in seconds
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CacheTtls {
    #[serde(default = "default_ttl_secs")]
    pub summoner_secs: u64,
    #[serde(default = "default_ttl_secs")]
    pub leagues_secs: u64,
    #[serde(default = "default_ttl_secs")]
    pub matchlist_secs: u64,
}

impl CacheTtls {
    /// TTL for a volatile cache kind. Match detail lives in the durable
    /// cache and never expires, so it has no entry here.
    pub fn for_kind(&self, kind: RequestKind) -> u64 {
        match kind {
            RequestKind::Summoner => self.summoner_secs,
            RequestKind::Leagues => self.leagues_secs,
            RequestKind::Matchlist => self.matchlist_secs,
            RequestKind::Match => 0,
        }
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        CacheTtls {
            summoner_secs: default_ttl_secs(),
            leagues_secs: default_ttl_secs(),
            matchlist_secs: default_ttl_secs(),
        }
    }
}

/// Precomputed champion dataset configuration
#[derive(Clone, Debug, Deserialize)]
pub struct ChampionDataConfig {
    /// Directory holding the per-tier dataset files written by the
    /// aggregation job.
    pub dir: PathBuf,
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

/// Gateway configuration
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub listener: Listener,
    pub upstream: UpstreamConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache_ttl: CacheTtls,
    pub champion_data: ChampionDataConfig,
    /// How long in-flight requests may drain after a shutdown signal.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.listener.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.upstream.api_key.is_empty() {
            return Err(ValidationError::EmptyApiKey);
        }
        if self.database.url.is_empty() {
            return Err(ValidationError::EmptyDatabaseUrl);
        }
        if self.redis.url.is_empty() {
            return Err(ValidationError::EmptyRedisUrl);
        }
        if self.champion_data.dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyChampionDataDir);
        }
        Ok(())
    }
}

fn default_upstream_timeout_secs() -> u64 {
    10
}

fn default_max_connections() -> u32 {
    16
}

fn default_connect_backoff_secs() -> u64 {
    10
}

fn default_reconnect_secs() -> u64 {
    10
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_refresh_secs() -> u64 {
    900
}

fn default_shutdown_grace_secs() -> u64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp_file(s: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
        write!(tmp, "{}", s).expect("write yaml");

        tmp
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
listener:
    host: 0.0.0.0
    port: 8300
upstream:
    api_key: RGAPI-test
database:
    url: postgres://lolq@localhost/lolq
redis:
    url: redis://localhost:6379
champion_data:
    dir: /var/lib/lolq/championdata
"#;
        let tmp = write_tmp_file(yaml);
        let config = Config::from_file(tmp.path()).expect("load config");

        assert_eq!(config.listener.port, 8300);
        assert_eq!(config.upstream.api_key, "RGAPI-test");
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.redis.reconnect_secs, 10);
        assert_eq!(config.cache_ttl.summoner_secs, 600);
        assert_eq!(config.champion_data.refresh_secs, 900);
        assert_eq!(config.shutdown_grace_secs, 3);
    }

    #[test]
    fn ttl_lookup_per_kind() {
        let ttls = CacheTtls {
            summoner_secs: 1,
            leagues_secs: 2,
            matchlist_secs: 3,
        };
        assert_eq!(ttls.for_kind(RequestKind::Summoner), 1);
        assert_eq!(ttls.for_kind(RequestKind::Leagues), 2);
        assert_eq!(ttls.for_kind(RequestKind::Matchlist), 3);
    }

    #[test]
    fn validation_errors() {
        let yaml = r#"
listener:
    host: 0.0.0.0
    port: 0
upstream:
    api_key: RGAPI-test
database:
    url: postgres://lolq@localhost/lolq
redis:
    url: redis://localhost:6379
champion_data:
    dir: /var/lib/lolq/championdata
"#;
        let tmp = write_tmp_file(yaml);
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::Invalid(ValidationError::InvalidPort))
        ));

        let yaml = r#"
upstream:
    api_key: ""
database:
    url: postgres://lolq@localhost/lolq
redis:
    url: redis://localhost:6379
champion_data:
    dir: /var/lib/lolq/championdata
"#;
        let tmp = write_tmp_file(yaml);
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::Invalid(ValidationError::EmptyApiKey))
        ));
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let tmp = write_tmp_file("listener: {host: 0.0.0.0, port: 8300}\n");
        assert!(matches!(
            Config::from_file(tmp.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
