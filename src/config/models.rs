//! Configuration data structures for the cachefront gateway.
//!
//! This module defines the schema for the application settings, including
//! server parameters, the upstream origin, cache tier versioning and the
//! static manifest populated at install time.

use serde::{Deserialize, Serialize};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, workers).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream origin settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Cache tier and manifest settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Background sync endpoints.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Push notification payload defaults.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads for the Axum server.
    /// Default: Number of logical CPU cores.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Settings for the origin the gateway fronts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the static site origin, scheme and authority only.
    /// Default: `http://127.0.0.1:8000`
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Request timeout in seconds.
    /// Default: `30`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum attempts per manifest entry during install.
    /// Default: `3`
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Settings for the two-tier cache store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Version string embedded in every tier name. Bumping it orphans the
    /// old tiers, which are removed at activation.
    /// Default: `1.0.0`
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory holding the tier directories.
    /// Default: `~/.cachefront/store`
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Ordered list of paths populated into the static tier at install time.
    #[serde(default = "default_static_manifest")]
    pub static_manifest: Vec<String>,

    /// URL or path prefixes cached on demand into the dynamic tier.
    #[serde(default = "default_dynamic_prefixes")]
    pub dynamic_prefixes: Vec<String>,

    /// Path of the offline fallback page, served when a navigation
    /// request fails with no connectivity. Must be in the manifest.
    /// Default: `/offline.html`
    #[serde(default = "default_offline_path")]
    pub offline_path: String,
}

impl CacheConfig {
    /// Name of the current static tier.
    pub fn static_tier(&self) -> String {
        format!("static-v{}", self.version)
    }

    /// Name of the current dynamic tier.
    pub fn dynamic_tier(&self) -> String {
        format!("dynamic-v{}", self.version)
    }

    /// Version string reported over the message channel.
    pub fn gateway_version(&self) -> String {
        format!("portfolio-v{}", self.version)
    }
}

/// Endpoints used by the background sync paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed key under which a deferred form submission is persisted.
    /// Default: `/form-data`
    #[serde(default = "default_form_data_path")]
    pub form_data_path: String,

    /// Origin endpoint that receives the replayed form submission.
    /// Default: `/api/contact`
    #[serde(default = "default_contact_endpoint")]
    pub contact_endpoint: String,

    /// Origin endpoint polled by the periodic content sync.
    /// Default: `/api/updates`
    #[serde(default = "default_updates_endpoint")]
    pub updates_endpoint: String,
}

/// Defaults for the push notification payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Notification title.
    #[serde(default = "default_notify_title")]
    pub title: String,

    /// Body text used when the push message carries no payload.
    #[serde(default = "default_notify_body")]
    pub default_body: String,

    /// Icon path.
    /// Default: `/images/icon-192x192.png`
    #[serde(default = "default_notify_icon")]
    pub icon: String,

    /// Badge path, also used as the action icon.
    /// Default: `/images/icon-72x72.png`
    #[serde(default = "default_notify_badge")]
    pub badge: String,

    /// URL opened when the notification is clicked.
    /// Default: `/`
    #[serde(default = "default_notify_target")]
    pub target_url: String,

    /// Title of the `open` action.
    #[serde(default = "default_open_title")]
    pub open_title: String,

    /// Title of the `close` action.
    #[serde(default = "default_close_title")]
    pub close_title: String,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_seconds: default_timeout(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            store_dir: default_store_dir(),
            static_manifest: default_static_manifest(),
            dynamic_prefixes: default_dynamic_prefixes(),
            offline_path: default_offline_path(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            form_data_path: default_form_data_path(),
            contact_endpoint: default_contact_endpoint(),
            updates_endpoint: default_updates_endpoint(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            title: default_notify_title(),
            default_body: default_notify_body(),
            icon: default_notify_icon(),
            badge: default_notify_badge(),
            target_url: default_notify_target(),
            open_title: default_open_title(),
            close_title: default_close_title(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_origin() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_store_dir() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".cachefront")
        .join("store")
        .to_string_lossy()
        .to_string()
}

fn default_static_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/style_enhanced.min.css",
        "/main_enhanced.min.js",
        "/manifest.json",
        "/images/optimized/profile.webp",
        "/images/optimized/f2.webp",
        "/images/optimized/j3.webp",
        "/images/optimized/lastproject8.webp",
        "/images/optimized/lastproject9.webp",
        "/offline.html",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_dynamic_prefixes() -> Vec<String> {
    [
        "/images/",
        "/fonts/",
        "https://fonts.googleapis.com/",
        "https://fonts.gstatic.com/",
        "https://cdnjs.cloudflare.com/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_offline_path() -> String {
    "/offline.html".to_string()
}

fn default_form_data_path() -> String {
    "/form-data".to_string()
}

fn default_contact_endpoint() -> String {
    "/api/contact".to_string()
}

fn default_updates_endpoint() -> String {
    "/api/updates".to_string()
}

fn default_notify_title() -> String {
    "موقع فراس محمد".to_string()
}

fn default_notify_body() -> String {
    "رسالة جديدة من موقع فراس محمد".to_string()
}

fn default_notify_icon() -> String {
    "/images/icon-192x192.png".to_string()
}

fn default_notify_badge() -> String {
    "/images/icon-72x72.png".to_string()
}

fn default_notify_target() -> String {
    "/".to_string()
}

fn default_open_title() -> String {
    "فتح الموقع".to_string()
}

fn default_close_title() -> String {
    "إغلاق".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_names_share_one_version() {
        let config = CacheConfig::default();
        assert_eq!(config.static_tier(), "static-v1.0.0");
        assert_eq!(config.dynamic_tier(), "dynamic-v1.0.0");
        assert_eq!(config.gateway_version(), "portfolio-v1.0.0");

        let bumped = CacheConfig {
            version: "2.1.0".to_string(),
            ..CacheConfig::default()
        };
        assert_eq!(bumped.static_tier(), "static-v2.1.0");
        assert_eq!(bumped.dynamic_tier(), "dynamic-v2.1.0");
    }

    #[test]
    fn test_manifest_includes_offline_page() {
        let config = CacheConfig::default();
        assert!(config.static_manifest.contains(&config.offline_path));
        assert_eq!(config.static_manifest.first().map(String::as_str), Some("/"));
    }
}
