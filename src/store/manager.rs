// Cache store manager - owns the root directory and the tier lifecycle

use crate::error::Result;
use crate::store::tier::Tier;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Filesystem-backed store of named cache tiers.
///
/// One directory per tier under the root. Tier names carry the cache
/// version, so nothing in here interprets them; lifecycle decisions
/// (which tiers are current, which are stale) belong to the caller.
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Open the store at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!("Opened cache store at {}", root.display());
        Ok(Self { root })
    }

    /// Open (or create) a tier by name.
    pub async fn open_tier(&self, name: &str) -> Result<Tier> {
        Tier::open(&self.root, name).await
    }

    /// Whether a tier directory exists.
    pub async fn tier_exists(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }

    /// Names of every tier currently on disk.
    pub async fn tier_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a tier and all of its entries. Returns whether it existed.
    pub async fn delete_tier(&self, name: &str) -> Result<bool> {
        match fs::remove_dir_all(self.root.join(name)).await {
            Ok(()) => {
                debug!("Deleted tier {}", name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
