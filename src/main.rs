#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::ShortUrls;
use crate::cache::MappingCache;
use crate::config::Config;
use crate::generator::RandomGenerator;
use crate::service::UrlService;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;

mod api;
mod cache;
mod config;
mod generator;
mod graceful_shutdown;
mod mappings;
mod root;
mod service;
mod storage;
mod sweeper;
#[cfg(test)]
mod tests;
mod utils;

const DEFAULT_RUST_LOG: &str = "shortly=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    let shutdown = CancellationToken::new();

    let app = setup_app(&config, shutdown.clone()).await?;

    let listener = TcpListener::bind(config.address).await?;
    tracing::info!("Listening on {}", config.address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler(shutdown))
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// The expiry sweeper is started as well and runs until `shutdown` is cancelled
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Invalid code length
/// - Database connection or migrations
pub async fn setup_app(config: &Config, shutdown: CancellationToken) -> Result<Router> {
    let generator = RandomGenerator::new(config.code_length)?;

    let app = match &config.storage {
        storage::Config::Memory => {
            tracing::warn!("`DATABASE_URL` is not set, mappings are kept in memory only");

            start(Memory::new(), generator, config, shutdown)
        }
        storage::Config::Postgres(database_url) => {
            let storage = Postgres::new(database_url).await?;

            start(storage, generator, config, shutdown)
        }
    };

    Ok(app)
}

/// Build the service on top of the storage, start the sweeper and create the router
fn start<S: Storage>(
    storage: S,
    generator: RandomGenerator,
    config: &Config,
    shutdown: CancellationToken,
) -> Router {
    let cache = MappingCache::new(config.cache_capacity, config.cache_ttl);
    let service = UrlService::new(storage, generator, cache);

    sweeper::spawn(service.clone(), config.sweep_interval, shutdown);

    create_router(service, ShortUrls::new(&config.base_url))
}

/// Create the router for Shortly
///
/// Everything is served from the root and again below `/api`
fn create_router<S: Storage>(service: UrlService<S>, short_urls: ShortUrls) -> Router {
    Router::new()
        .merge(api::router::<S>())
        .nest("/api", api::router::<S>())
        .fallback(root::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(service))
        .layer(Extension(short_urls))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}
