//! Cat image cache
//!
//! An HTTP front for a flat directory of `<key>.jpg` files. Misses can be
//! backfilled from a remote image service (http.cat by default).

pub mod cache;
pub mod config;
pub mod error;
pub mod origin;
pub mod server;

pub use cache::ImageCache;
pub use config::{Cli, Config, OriginConfig};
pub use error::{AppError, CacheError, CatCacheError, OriginError, Result};
pub use origin::OriginFetcher;
pub use server::{create_router, start_server, ServerState, SharedState};
