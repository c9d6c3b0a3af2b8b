//! catcache - disk-backed JPEG cache server
//!
//! Serves `<cache>/<key>.jpg` on `GET /<key>`, stores request bodies on
//! `PUT`, removes entries on `DELETE`, and backfills misses from the origin.

use catcache::{
    start_server, CatCacheError, Cli, Config, ImageCache, OriginFetcher, Result, ServerState,
    SharedState,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("catcache=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let config = match Config::from_cli(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let cache = ImageCache::new(config.cache_dir.clone());
    info!("Cache dir: {:?}", cache.dir());

    let origin = match &config.origin {
        Some(origin) => {
            info!("Origin: {} (timeout {:?})", origin.base_url, origin.timeout);
            let fetcher = OriginFetcher::new(&origin.base_url, origin.timeout)
                .map_err(|e| CatCacheError::Config(format!("Origin client error: {}", e)))?;
            Some(fetcher)
        }
        None => {
            info!("Origin fallback disabled");
            None
        }
    };

    let state: SharedState = Arc::new(ServerState::new(cache, origin));

    start_server(state, &config.host, config.port).await?;

    Ok(())
}
