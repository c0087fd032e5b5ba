mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod seed;
mod services;
mod store;

use anyhow::{Context, Result};
use std::sync::Arc;

use store::{MasterStore, MemoryMasterStore, PgMasterStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = config::Settings::from_env()?;

    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting realty admin backend"
    );

    let store: Arc<dyn MasterStore> = match settings.database_url.as_deref() {
        Some(url) => {
            let pool = db::create_pool(url, settings.database_max_connections).await?;
            Arc::new(PgMasterStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set - using in-memory store, data will not persist");
            Arc::new(MemoryMasterStore::new())
        }
    };

    let state = app::AppState::new(settings.clone(), store);

    if settings.seed_master_data {
        seed::seed_master_data(&state.masters)
            .await
            .context("Failed to seed master data")?;
    }

    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(&settings.server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.server_addr))?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
