use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, warn};

/// Outcome of a token lookup against the account store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authorization {
    /// Token matched an account in good standing.
    Allowed(i64),
    /// No account carries this token.
    Denied,
    /// The account exists but is banned.
    Banned,
    /// The store could not be reached; callers fail closed.
    StoreUnavailable,
}

/// Per-account usage counters kept in the account row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UsageCounter {
    UpstreamFetches,
    PersistentCacheHits,
    VolatileCacheHits,
}

impl UsageCounter {
    fn column(self) -> &'static str {
        match self {
            UsageCounter::UpstreamFetches => "riot_api_requests",
            UsageCounter::PersistentCacheHits => "db_cache_hits",
            UsageCounter::VolatileCacheHits => "mem_cache_hits",
        }
    }
}

/// Token-based admission control backed by the account store.
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// Resolves a bare token (prefix already stripped) to an account.
    async fn authorize(&self, token: &str) -> Authorization;

    /// Bumps a usage counter for the account. Fire and forget; accounting
    /// must never delay the response.
    fn count(&self, account_id: i64, counter: UsageCounter);
}

pub struct PgAccessGate {
    pool: PgPool,
}

impl PgAccessGate {
    pub fn new(pool: PgPool) -> Self {
        PgAccessGate { pool }
    }
}

#[async_trait]
impl AccessGate for PgAccessGate {
    async fn authorize(&self, token: &str) -> Authorization {
        let row = sqlx::query_as::<_, (i64, bool)>(
            "SELECT id, banned FROM lolq_accounts WHERE access_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(Some((_, true))) => Authorization::Banned,
            Ok(Some((id, false))) => Authorization::Allowed(id),
            Ok(None) => Authorization::Denied,
            Err(err) => {
                error!("account store lookup failed: {err}");
                Authorization::StoreUnavailable
            }
        }
    }

    fn count(&self, account_id: i64, counter: UsageCounter) {
        let pool = self.pool.clone();
        // Column names come from a fixed enum, never from the request.
        let query = format!(
            "UPDATE lolq_accounts SET {col} = {col} + 1 WHERE id = $1",
            col = counter.column()
        );
        tokio::spawn(async move {
            if let Err(err) = sqlx::query(&query).bind(account_id).execute(&pool).await {
                warn!("usage counter update failed for account {account_id}: {err}");
            }
        });
    }
}
