// Periodic content sync

use crate::config::SyncConfig;
use crate::error::{GatewayError, Result};
use crate::upstream::UpstreamClient;
use tracing::info;

/// Fetch the origin updates feed and log the result. No further
/// processing is done with the body.
pub async fn sync_content(upstream: &UpstreamClient, config: &SyncConfig) -> Result<()> {
    let (status, body) = upstream.get_text(&config.updates_endpoint).await?;

    if status == 200 {
        info!("Content synced: {} bytes from {}", body.len(), config.updates_endpoint);
        Ok(())
    } else {
        Err(GatewayError::Upstream(format!(
            "content sync failed: HTTP {}",
            status
        )))
    }
}
