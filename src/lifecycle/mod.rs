//! Cache tier lifecycle: install-time population and activation-time
//! reclamation of stale tiers.

pub mod activate;
pub mod install;

pub use activate::reclaim;
pub use install::populate;
