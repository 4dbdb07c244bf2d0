// cachefront - Two-tier offline caching gateway for a single static site origin

use anyhow::Result;
use cachefront::cli::Args;
use cachefront::config::AppConfig;
use cachefront::gateway::CacheGateway;
use cachefront::lifecycle;
use cachefront::metrics;
use cachefront::server::{create_router, AppState};
use cachefront::store::CacheStore;
use cachefront::upstream::UpstreamClient;
use cachefront::utils::logging;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load(args.config.as_deref())?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting cachefront v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Gateway version {}, fronting {}",
        config.cache.gateway_version(),
        config.upstream.origin
    );

    // Phase 3: Open the cache store and upstream client
    let store = Arc::new(CacheStore::open(config.cache.store_dir.clone()).await?);
    let upstream = Arc::new(UpstreamClient::new(&config.upstream)?);

    // Phase 4: Install - populate the static tier from the manifest.
    // A population failure is fatal; this version never activates.
    let static_tier = if args.skip_install {
        info!("Skipping install, reusing tier {}", config.cache.static_tier());
        Arc::new(store.open_tier(&config.cache.static_tier()).await?)
    } else {
        Arc::new(lifecycle::populate(&store, &upstream, &config.cache).await?)
    };
    let dynamic_tier = Arc::new(store.open_tier(&config.cache.dynamic_tier()).await?);

    // Phase 5: Activate - reclaim tiers left behind by older versions
    lifecycle::reclaim(&store, &config.cache).await?;
    metrics::update_tier_entries("static", static_tier.entry_count().await);
    metrics::update_tier_entries("dynamic", dynamic_tier.entry_count().await);

    // Phase 6: Build and start the HTTP server
    let gateway = Arc::new(CacheGateway::new(
        Arc::clone(&static_tier),
        Arc::clone(&dynamic_tier),
        Arc::clone(&upstream),
        config.cache.clone(),
    ));
    let state = AppState {
        config: config.clone(),
        gateway,
        store,
        static_tier,
        dynamic_tier,
        upstream,
    };
    let app = create_router(state)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 7: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
