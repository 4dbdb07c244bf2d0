// Install: populate the static tier from the manifest

use crate::config::CacheConfig;
use crate::error::{GatewayError, Result};
use crate::metrics;
use crate::store::{CacheStore, RequestIdentity, ResponseSnapshot, Tier};
use crate::upstream::UpstreamClient;
use crate::utils::retry::{self, AttemptError};
use futures::future::try_join_all;
use tracing::{error, info};

/// Populate the static tier with every manifest entry.
///
/// All-or-nothing: every entry is fetched before anything is written, and
/// a write failure removes the whole tier. A tier that exists after this
/// returns `Ok` holds the complete manifest.
///
/// Transient upstream statuses are retried per entry; a final failure on
/// any entry fails the install.
pub async fn populate(
    store: &CacheStore,
    upstream: &UpstreamClient,
    config: &CacheConfig,
) -> Result<Tier> {
    let tier_name = config.static_tier();
    info!(
        "Installing: populating {} with {} manifest entries",
        tier_name,
        config.static_manifest.len()
    );

    let fetches = config.static_manifest.iter().map(|path| {
        let identity = RequestIdentity::get(upstream.url_for(path));
        async move {
            let snapshot = fetch_manifest_entry(upstream, &identity).await.map_err(|e| {
                GatewayError::Install(format!("manifest entry {}: {}", path, e))
            })?;
            Ok::<_, GatewayError>((identity, snapshot))
        }
    });

    let entries = try_join_all(fetches).await.map_err(|e| {
        error!("Install failed: {}", e);
        metrics::record_lifecycle("install", "failure");
        e
    })?;

    let tier = store.open_tier(&tier_name).await?;
    for (identity, snapshot) in &entries {
        if let Err(e) = tier.put(identity, snapshot).await {
            // A partial tier must not survive a failed install
            let _ = store.delete_tier(&tier_name).await;
            metrics::record_lifecycle("install", "failure");
            return Err(GatewayError::Install(format!(
                "storing {} failed: {}",
                identity.url, e
            )));
        }
    }

    info!(
        "Installed: {} entries cached in {}",
        entries.len(),
        tier_name
    );
    metrics::record_lifecycle("install", "success");
    metrics::update_tier_entries("static", tier.entry_count().await);
    Ok(tier)
}

/// Fetch one manifest entry, retrying transient statuses. Anything but a
/// final 200 is an error.
async fn fetch_manifest_entry(
    upstream: &UpstreamClient,
    identity: &RequestIdentity,
) -> std::result::Result<ResponseSnapshot, AttemptError> {
    retry::with_retry("Populate", upstream.max_attempts(), || {
        let upstream = upstream;
        let identity = identity;
        async move {
            let fetched = upstream
                .fetch(identity)
                .await
                .map_err(|e| AttemptError::transport(e.to_string()))?;

            if fetched.status != 200 {
                let retry_after = fetched
                    .headers
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
                    .and_then(|(_, value)| retry::parse_retry_after(value));
                return Err(AttemptError::status(
                    fetched.status,
                    "unexpected status",
                    retry_after,
                ));
            }

            Ok(ResponseSnapshot::new(
                fetched.status,
                fetched.headers,
                fetched.body.to_vec(),
            ))
        }
    })
    .await
}
