use crate::counter;
use crate::metrics_defs::{DATASET_RELOAD_FAILED, DATASET_RELOAD_OK};
use crate::types::Tier;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// A dataset must cover the full roster; a short champion list means the
/// aggregation job wrote a truncated file.
pub const MIN_CHAMPIONS: usize = 100;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("could not read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("dataset for {tier} has only {count} champions")]
    TooFewChampions { tier: Tier, count: usize },
}

/// In-memory snapshot of the four per-tier champion datasets.
///
/// Clients receive the dataset files verbatim, so they are held as raw
/// JSON values. The snapshot is replaced wholesale: either all four tiers
/// load and validate, or the previous snapshot stays in place.
#[derive(Clone)]
pub struct ChampionDataStore {
    inner: Arc<Inner>,
}

struct Inner {
    dir: PathBuf,
    slots: RwLock<Option<[Arc<serde_json::Value>; 4]>>,
}

impl ChampionDataStore {
    pub fn new(dir: PathBuf) -> Self {
        ChampionDataStore {
            inner: Arc::new(Inner {
                dir,
                slots: RwLock::new(None),
            }),
        }
    }

    /// Reads and validates all four tier files, then swaps the snapshot.
    pub fn reload(&self) -> Result<(), DatasetError> {
        let dir = &self.inner.dir;
        let slots = [
            Arc::new(load_dataset(dir, Tier::Bronze)?),
            Arc::new(load_dataset(dir, Tier::Silver)?),
            Arc::new(load_dataset(dir, Tier::Gold)?),
            Arc::new(load_dataset(dir, Tier::PlatinumPlus)?),
        ];
        *self.inner.slots.write() = Some(slots);
        Ok(())
    }

    pub fn get(&self, tier: Tier) -> Option<Arc<serde_json::Value>> {
        self.inner
            .slots
            .read()
            .as_ref()
            .map(|slots| Arc::clone(&slots[tier.index()]))
    }

    /// Spawns the periodic refresh task. A failed refresh keeps serving
    /// the current snapshot.
    pub fn spawn_refresh_task(&self, interval: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let reloader = store.clone();
                let result = tokio::task::spawn_blocking(move || reloader.reload()).await;
                match result {
                    Ok(Ok(())) => {
                        info!("champion datasets refreshed");
                        counter!(DATASET_RELOAD_OK).increment(1);
                    }
                    Ok(Err(err)) => {
                        warn!("champion dataset refresh failed, retaining previous snapshot: {err}");
                        counter!(DATASET_RELOAD_FAILED).increment(1);
                    }
                    Err(err) => {
                        warn!("champion dataset refresh task failed: {err}");
                        counter!(DATASET_RELOAD_FAILED).increment(1);
                    }
                }
            }
        });
    }
}

fn load_dataset(dir: &Path, tier: Tier) -> Result<serde_json::Value, DatasetError> {
    let path = dir.join(format!("championGG_dataset_{}.json", tier));
    let raw = fs::read(&path).map_err(|source| DatasetError::Read {
        path: path.clone(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|source| DatasetError::Parse { path, source })?;
    let count = value
        .get("champions")
        .and_then(|c| c.as_array())
        .map(|c| c.len())
        .unwrap_or(0);
    if count <= MIN_CHAMPIONS {
        return Err(DatasetError::TooFewChampions { tier, count });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn dataset_json(elo: &str, champion_count: usize) -> serde_json::Value {
        let champions: Vec<serde_json::Value> = (0..champion_count)
            .map(|i| json!({"id": i, "name": format!("Champ{i}"), "key": format!("champ{i}")}))
            .collect();
        json!({
            "patch": "7.16",
            "lastUpdate": 1502668800,
            "riotVersion": "7.16.1",
            "elo": elo,
            "champions": champions,
        })
    }

    fn write_datasets(dir: &Path, champion_count: usize) {
        for tier in Tier::ALL {
            let path = dir.join(format!("championGG_dataset_{}.json", tier));
            let data = dataset_json(tier.as_str(), champion_count);
            fs::write(path, serde_json::to_vec(&data).expect("serialize")).expect("write dataset");
        }
    }

    #[test]
    fn reload_loads_all_four_tiers() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_datasets(dir.path(), 130);

        let store = ChampionDataStore::new(dir.path().to_path_buf());
        store.reload().expect("reload");

        for tier in Tier::ALL {
            let data = store.get(tier).expect("dataset present");
            assert_eq!(data["elo"], tier.as_str());
        }
    }

    #[test]
    fn store_is_empty_before_first_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ChampionDataStore::new(dir.path().to_path_buf());
        assert!(store.get(Tier::Gold).is_none());
    }

    #[test]
    fn short_roster_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Exactly 100 champions is still too few.
        write_datasets(dir.path(), 100);

        let store = ChampionDataStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.reload(),
            Err(DatasetError::TooFewChampions { count: 100, .. })
        ));
    }

    #[test]
    fn failed_reload_keeps_the_previous_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_datasets(dir.path(), 130);

        let store = ChampionDataStore::new(dir.path().to_path_buf());
        store.reload().expect("initial reload");

        // Corrupt one file; the whole refresh must be discarded.
        let gold = dir.path().join("championGG_dataset_GOLD.json");
        fs::write(&gold, b"not json").expect("corrupt file");
        assert!(matches!(
            store.reload(),
            Err(DatasetError::Parse { .. })
        ));

        for tier in Tier::ALL {
            let data = store.get(tier).expect("previous snapshot intact");
            assert_eq!(data["champions"].as_array().map(|c| c.len()), Some(130));
        }
    }

    #[test]
    fn missing_file_fails_the_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_datasets(dir.path(), 130);
        fs::remove_file(dir.path().join("championGG_dataset_SILVER.json")).expect("remove");

        let store = ChampionDataStore::new(dir.path().to_path_buf());
        assert!(matches!(store.reload(), Err(DatasetError::Read { .. })));
        assert!(store.get(Tier::Bronze).is_none());
    }
}
