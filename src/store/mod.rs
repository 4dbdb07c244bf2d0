// Persistent cache store: named tiers of response snapshots

pub mod manager;
pub mod models;
pub mod tier;

pub use manager::CacheStore;
pub use models::{RequestIdentity, ResponseSnapshot};
pub use tier::Tier;
