pub mod amenities;
pub mod cities;
pub mod health;
pub mod locations;
pub mod master_data;
pub mod me;
pub mod property_types;
pub mod rooms;
pub mod washrooms;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Protected routes
        .route("/me", get(me::get_me))
        .merge(amenities::router())
        .merge(property_types::router())
        .merge(washrooms::router())
        .merge(rooms::router())
        .merge(cities::router())
        .merge(locations::router())
}
