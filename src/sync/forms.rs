// Deferred contact-form replay

use crate::config::SyncConfig;
use crate::error::{GatewayError, Result};
use crate::store::{RequestIdentity, Tier};
use crate::upstream::UpstreamClient;
use tracing::{debug, info};

/// Replay a persisted form submission against the origin contact API.
///
/// The submission lives in the dynamic tier under the fixed form-data
/// key; it is deleted only after the origin accepts the POST, so a
/// failed replay is retried on the next sync trigger. Returns whether
/// a submission was replayed.
pub async fn sync_contact_form(
    dynamic_tier: &Tier,
    upstream: &UpstreamClient,
    config: &SyncConfig,
) -> Result<bool> {
    let identity = RequestIdentity::get(upstream.url_for(&config.form_data_path));

    let Some(snapshot) = dynamic_tier.match_entry(&identity).await? else {
        debug!("No stored form submission to sync");
        return Ok(false);
    };

    let payload: serde_json::Value = serde_json::from_slice(&snapshot.body)?;
    let status = upstream.post_json(&config.contact_endpoint, &payload).await?;

    if (200..300).contains(&status) {
        dynamic_tier.delete(&identity).await?;
        info!("Contact form synced successfully");
        Ok(true)
    } else {
        Err(GatewayError::Upstream(format!(
            "contact sync rejected: HTTP {}",
            status
        )))
    }
}
