//! Token-gated caching gateway in front of a rate-limited game-data API.
//!
//! Requests are admitted by an access token backed by the account store,
//! answered from a volatile redis cache or the durable match cache where
//! possible, and otherwise proxied upstream, minified and re-cached.

pub mod access_gate;
pub mod api;
pub mod champion_data;
pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod minify;
pub mod persistent_cache;
pub mod state;
pub mod types;
pub mod upstream;
pub mod volatile_cache;

use crate::access_gate::PgAccessGate;
use crate::champion_data::ChampionDataStore;
use crate::config::{Config, DatabaseConfig};
use crate::errors::{GatewayError, Result};
use crate::persistent_cache::PgMatchCache;
use crate::state::AppState;
use crate::upstream::RiotClient;
use crate::volatile_cache::RedisCache;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{error, info, warn};

/// Connects to the durable store, retrying until it is reachable. The
/// gateway must not accept requests before the account store is up.
async fn connect_database(config: &DatabaseConfig) -> PgPool {
    let backoff = Duration::from_secs(config.connect_backoff_secs);
    loop {
        match PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
        {
            Ok(pool) => return pool,
            Err(err) => {
                error!("database connection failed, retrying: {err}");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Runs the gateway until `shutdown` resolves, then drains in-flight
/// requests bounded by the configured grace period.
pub async fn run(config: Config, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
    let pool = connect_database(&config.database).await;
    info!("connected to the account store");

    let volatile = RedisCache::new(
        &config.redis.url,
        Duration::from_secs(config.redis.reconnect_secs),
    )?;
    volatile.spawn_reconnect_worker();

    let champions = ChampionDataStore::new(config.champion_data.dir.clone());
    // Serving without datasets would answer every champion-data request
    // with a failure code; refuse to start instead.
    champions.reload()?;
    champions.spawn_refresh_task(Duration::from_secs(config.champion_data.refresh_secs));

    let upstream = RiotClient::new(
        config.upstream.api_key.clone(),
        config.upstream.base_url.clone(),
        Duration::from_secs(config.upstream.timeout_secs),
    )?;

    let state = AppState {
        gate: Arc::new(PgAccessGate::new(pool.clone())),
        volatile: Arc::new(volatile),
        matches: Arc::new(PgMatchCache::new(pool)),
        upstream: Arc::new(upstream),
        champions,
        ttl: config.cache_ttl,
    };

    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    let draining = Arc::new(Notify::new());
    let drain_started = Arc::clone(&draining);
    let serve = axum::serve(listener, api::router(state)).with_graceful_shutdown(async move {
        shutdown.await;
        info!("shutdown signal received, draining requests");
        drain_started.notify_one();
    });

    let grace = Duration::from_secs(config.shutdown_grace_secs);
    let serve = std::future::IntoFuture::into_future(serve);
    tokio::select! {
        result = serve => result.map_err(GatewayError::Io)?,
        _ = async {
            draining.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!("drain period of {}s elapsed, exiting", grace.as_secs());
        }
    }
    Ok(())
}

/// Applies the schema migrations and exits. Run by operators, not at
/// gateway startup.
pub async fn migrate(config: &DatabaseConfig) -> Result<()> {
    let pool = PgPoolOptions::new().max_connections(1).connect(&config.url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("migrations applied");
    Ok(())
}
