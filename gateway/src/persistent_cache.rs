use crate::types::Region;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, warn};

/// Durable cache for finished match detail. Matches never change once
/// played, so entries have no expiry.
#[async_trait]
pub trait MatchCache: Send + Sync {
    async fn get(&self, region: Region, game_id: i64) -> Option<serde_json::Value>;

    /// Fire and forget; the response is already being written when this
    /// runs.
    fn put(&self, region: Region, game_id: i64, value: serde_json::Value);
}

pub struct PgMatchCache {
    pool: PgPool,
}

impl PgMatchCache {
    pub fn new(pool: PgPool) -> Self {
        PgMatchCache { pool }
    }
}

#[async_trait]
impl MatchCache for PgMatchCache {
    async fn get(&self, region: Region, game_id: i64) -> Option<serde_json::Value> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT json_data FROM lolq_match_cache WHERE region = $1 AND game_id = $2",
        )
        .bind(region.id() as i16)
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(value) => value,
            Err(err) => {
                // A store error downgrades to a miss; upstream still has
                // the match.
                error!("match cache lookup failed for {region}/{game_id}: {err}");
                None
            }
        }
    }

    fn put(&self, region: Region, game_id: i64, value: serde_json::Value) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            let result = sqlx::query(
                "INSERT INTO lolq_match_cache (region, game_id, json_data) \
                 VALUES ($1, $2, $3) ON CONFLICT (region, game_id) DO NOTHING",
            )
            .bind(region.id() as i16)
            .bind(game_id)
            .bind(value)
            .execute(&pool)
            .await;
            if let Err(err) = result {
                warn!("match cache insert failed for {region}/{game_id}: {err}");
            }
        });
    }
}
