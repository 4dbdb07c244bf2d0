// A named cache tier backed by one directory of snapshot files

use crate::error::Result;
use crate::store::models::{RequestIdentity, ResponseSnapshot};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// One named tier of the cache store.
///
/// Each entry lives in its own file named by the request identity key, so
/// concurrent puts for different requests never touch the same file. The
/// in-memory index only mirrors which keys exist.
pub struct Tier {
    name: String,
    dir: PathBuf,
    index: RwLock<HashSet<String>>,
}

impl Tier {
    /// Open the tier under `root`, creating its directory if needed and
    /// loading the keys of any entries already on disk.
    pub(crate) async fn open(root: &Path, name: &str) -> Result<Self> {
        let dir = root.join(name);
        fs::create_dir_all(&dir).await?;

        let mut index = HashSet::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(file_name) = entry.file_name().to_str() {
                if let Some(key) = file_name.strip_suffix(".json") {
                    index.insert(key.to_string());
                }
            }
        }

        debug!("Opened tier {} with {} entries", name, index.len());

        Ok(Self {
            name: name.to_string(),
            dir,
            index: RwLock::new(index),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn entry_count(&self) -> usize {
        self.index.read().await.len()
    }

    /// Store a snapshot under the request identity, replacing any
    /// existing entry. Each write goes to its own temp file and is
    /// renamed into place, so concurrent puts for the same key never
    /// interleave and a concurrent match never reads a half-written
    /// entry.
    pub async fn put(&self, identity: &RequestIdentity, snapshot: &ResponseSnapshot) -> Result<()> {
        let key = identity.key();
        let path = self.entry_path(&key);
        let tmp = tempfile::NamedTempFile::new_in(&self.dir)?.into_temp_path();

        let bytes = serde_json::to_vec(snapshot)?;
        fs::write(&tmp, &bytes).await?;
        tmp.persist(&path).map_err(|e| e.error)?;

        self.index.write().await.insert(key);
        debug!("Stored {} {} in tier {}", identity.method, identity.url, self.name);
        Ok(())
    }

    /// Look up a stored snapshot by request identity. An entry that no
    /// longer deserializes is dropped and reported as a miss, so the
    /// next fetch replaces it.
    pub async fn match_entry(&self, identity: &RequestIdentity) -> Result<Option<ResponseSnapshot>> {
        let key = identity.key();
        if !self.index.read().await.contains(&key) {
            return Ok(None);
        }

        match fs::read(self.entry_path(&key)).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(snapshot) => Ok(Some(snapshot)),
                Err(e) => {
                    warn!("Dropping corrupt entry {} in tier {}: {}", key, self.name, e);
                    self.index.write().await.remove(&key);
                    let _ = fs::remove_file(self.entry_path(&key)).await;
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an entry. Returns whether one existed.
    pub async fn delete(&self, identity: &RequestIdentity) -> Result<bool> {
        let key = identity.key();
        if !self.index.write().await.remove(&key) {
            return Ok(false);
        }

        match fs::remove_file(self.entry_path(&key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}
