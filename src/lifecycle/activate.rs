// Activate: reclaim stale tiers and claim the current version

use crate::config::CacheConfig;
use crate::error::Result;
use crate::metrics;
use crate::store::CacheStore;
use tracing::info;

/// Delete every tier whose name is not the current static or dynamic
/// tier. Idempotent: a store already holding only the current tiers is
/// left untouched. Returns the number of tiers removed.
pub async fn reclaim(store: &CacheStore, config: &CacheConfig) -> Result<usize> {
    let keep = [config.static_tier(), config.dynamic_tier()];

    let mut removed = 0;
    for name in store.tier_names().await? {
        if !keep.contains(&name) {
            info!("Reclaiming stale tier {}", name);
            if store.delete_tier(&name).await? {
                removed += 1;
            }
        }
    }

    info!(
        "Activated: {} now serving, {} stale tier(s) reclaimed",
        config.gateway_version(),
        removed
    );
    metrics::record_lifecycle("activate", "success");
    Ok(removed)
}
