// cachefront - Two-tier offline caching gateway for a single static site origin

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod metrics;
pub mod notify;
pub mod server;
pub mod store;
pub mod sync;
pub mod upstream;
pub mod utils;
