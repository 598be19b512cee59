use crate::access_gate::AccessGate;
use crate::champion_data::ChampionDataStore;
use crate::config::CacheTtls;
use crate::persistent_cache::MatchCache;
use crate::upstream::UpstreamClient;
use crate::volatile_cache::VolatileCache;
use std::sync::Arc;

/// Shared handles the request handlers operate on.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<dyn AccessGate>,
    pub volatile: Arc<dyn VolatileCache>,
    pub matches: Arc<dyn MatchCache>,
    pub upstream: Arc<dyn UpstreamClient>,
    pub champions: ChampionDataStore,
    pub ttl: CacheTtls,
}
