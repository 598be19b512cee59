use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Errors that can abort gateway startup or background work. Per-request
/// failures never surface here; they are answered on the wire and the
/// process keeps running.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("upstream client error: {0}")]
    UpstreamClient(#[from] reqwest::Error),

    #[error("champion dataset error: {0}")]
    Dataset(#[from] crate::champion_data::DatasetError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
