use crate::counter;
use crate::metrics_defs::{VOLATILE_CACHE_HIT, VOLATILE_CACHE_MISS};
use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Short-lived read-through cache for the expiring lookup kinds.
///
/// The cache is best effort: a miss or an unreachable backend degrades to
/// an upstream fetch, never to an error.
#[async_trait]
pub trait VolatileCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores an already-serialized document under the key for `ttl_secs`.
    async fn put(&self, key: &str, value: &str, ttl_secs: u64);
}

/// Redis-backed cache over a single multiplexed connection.
///
/// While the connection is down all lookups miss and all writes are
/// dropped, and a background worker keeps retrying the connection on a
/// fixed backoff. Request handling never waits on redis recovery.
#[derive(Clone)]
pub struct RedisCache {
    inner: Arc<Inner>,
}

struct Inner {
    client: redis::Client,
    // Handles are cloned out before any await; the lock is never held
    // across one.
    conn: Mutex<Option<MultiplexedConnection>>,
    enabled: AtomicBool,
    reconnect: Notify,
    backoff: Duration,
}

impl RedisCache {
    pub fn new(url: &str, backoff: Duration) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        Ok(RedisCache {
            inner: Arc::new(Inner {
                client,
                conn: Mutex::new(None),
                enabled: AtomicBool::new(false),
                reconnect: Notify::new(),
                backoff,
            }),
        })
    }

    /// Spawns the reconnect loop. Runs for the life of the process; it
    /// establishes the initial connection as well.
    pub fn spawn_reconnect_worker(&self) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                if inner.enabled.load(Ordering::Relaxed) {
                    inner.reconnect.notified().await;
                    continue;
                }
                match inner.client.get_multiplexed_async_connection().await {
                    Ok(conn) => {
                        *inner.conn.lock() = Some(conn);
                        inner.enabled.store(true, Ordering::Relaxed);
                        info!("volatile cache connected");
                    }
                    Err(err) => {
                        warn!("volatile cache connection failed, retrying: {err}");
                        tokio::time::sleep(inner.backoff).await;
                    }
                }
            }
        });
    }

    fn disable(&self, err: &redis::RedisError) {
        // Only the first failure logs and wakes the worker; later ones on
        // in-flight handles are the same outage.
        if self.inner.enabled.swap(false, Ordering::Relaxed) {
            warn!("volatile cache connection lost: {err}");
            *self.inner.conn.lock() = None;
            self.inner.reconnect.notify_one();
        }
    }
}

#[async_trait]
impl VolatileCache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        if !self.inner.enabled.load(Ordering::Relaxed) {
            counter!(VOLATILE_CACHE_MISS).increment(1);
            return None;
        }
        let mut conn = self.inner.conn.lock().clone()?;
        match redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await
        {
            Ok(Some(value)) => {
                counter!(VOLATILE_CACHE_HIT).increment(1);
                Some(value)
            }
            Ok(None) => {
                counter!(VOLATILE_CACHE_MISS).increment(1);
                None
            }
            Err(err) => {
                self.disable(&err);
                counter!(VOLATILE_CACHE_MISS).increment(1);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: &str, ttl_secs: u64) {
        if !self.inner.enabled.load(Ordering::Relaxed) {
            return;
        }
        let Some(mut conn) = self.inner.conn.lock().clone() else {
            return;
        };
        let result = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<()>(&mut conn)
            .await;
        if let Err(err) = result {
            self.disable(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnected_cache_misses_and_drops_writes() {
        // No reconnect worker is spawned, so the cache stays disabled.
        let cache =
            RedisCache::new("redis://127.0.0.1:1/", Duration::from_secs(1)).expect("client");

        cache.put("1-8-someone", "{}", 600).await;
        assert_eq!(cache.get("1-8-someone").await, None);
    }
}
