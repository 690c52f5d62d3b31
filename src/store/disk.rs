use crate::core::storage::ProfileStore;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PROFILE_PARTITION: &str = "profiles";

/// Profiles persisted in a fjall keyspace, one partition for all keys.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        let partition = keyspace
            .open_partition(PROFILE_PARTITION, PartitionCreateOptions::default())
            .context("Failed to open profiles partition")?;
        debug!(path = %path.display(), "Opened disk store");

        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl ProfileStore for DiskStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let Some(value) = self
            .partition
            .get(key.as_bytes())
            .with_context(|| format!("Failed to read key: {key}"))?
        else {
            debug!(key, "Disk store MISS");
            return Ok(None);
        };

        debug!(key, "Disk store HIT");
        let text = String::from_utf8(value.to_vec())
            .with_context(|| format!("Stored value for {key} is not valid UTF-8"))?;
        Ok(Some(text))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.partition
            .insert(key.as_bytes(), value.as_bytes())
            .with_context(|| format!("Failed to write key: {key}"))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")?;
        debug!(key, "Disk store PUT");
        Ok(())
    }
}
