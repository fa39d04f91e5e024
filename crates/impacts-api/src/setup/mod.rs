//! Application setup and initialization
//!
//! Startup is split so tests can build the same state and router on the
//! in-memory backend without touching the network.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use impacts_core::{Config, StorageBackend};
use impacts_db::Repositories;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(
        environment = config.environment(),
        storage_backend = %config.storage_backend(),
        "Configuration loaded and validated successfully"
    );

    let (repos, pool) = match config.storage_backend() {
        StorageBackend::Postgres => {
            let pool = database::setup_database(&config).await?;
            (Repositories::postgres(pool.clone()), Some(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            (Repositories::in_memory(), None)
        }
    };

    let state = services::initialize_services(&config, repos, pool);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
