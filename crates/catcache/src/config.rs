//! Command-line configuration
//!
//! Arguments are parsed with clap and validated once into an immutable
//! [`Config`] before any listener is bound.

use crate::error::{CatCacheError, Result};
use crate::origin::OriginFetcher;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Disk-backed JPEG cache server with http.cat fallback
#[derive(Parser, Debug)]
#[command(name = "catcache")]
#[command(version)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long)]
    pub port: u16,

    /// Existing directory holding cached images
    #[arg(short, long = "cache", value_name = "PATH")]
    pub cache: PathBuf,

    /// Base URL of the image service used on cache misses
    #[arg(long, env = "ORIGIN_URL", default_value = OriginFetcher::DEFAULT_BASE_URL)]
    pub origin: String,

    /// Timeout for origin requests, in seconds
    #[arg(long, env = "ORIGIN_TIMEOUT_SECS", default_value_t = 30)]
    pub origin_timeout: u64,

    /// Serve cache misses as 404 without contacting the origin
    #[arg(long)]
    pub no_origin: bool,
}

/// Origin fallback settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Validated server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cache_dir: PathBuf,
    /// `None` disables the origin fallback
    pub origin: Option<OriginConfig>,
}

impl Config {
    /// Build a configuration from parsed arguments, checking that the cache
    /// directory exists.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        if !cli.cache.is_dir() {
            return Err(CatCacheError::Config(format!(
                "Cache directory does not exist: {}",
                cli.cache.display()
            )));
        }

        let origin = if cli.no_origin {
            None
        } else {
            Some(OriginConfig {
                base_url: cli.origin,
                timeout: Duration::from_secs(cli.origin_timeout),
            })
        };

        Ok(Self {
            host: cli.host,
            port: cli.port,
            cache_dir: cli.cache,
            origin,
        })
    }
}
