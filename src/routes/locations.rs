use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use super::master_data;
use crate::api::{DataResponse, Paginated};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::locations::LocationFilter;
use crate::domain::{MasterQuery, MasterRecord};
use crate::error::{ApiError, ApiResult};
use crate::services::locations::LocationStatistics;
use crate::services::LocationService;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/locations",
            get(list_locations).post(master_data::create_record::<LocationService>),
        )
        .route("/locations/statistics", get(location_statistics))
        .route("/locations/popular", get(popular_locations))
        .route("/locations/city/:city_id", get(locations_by_city))
        .merge(master_data::record_routes::<LocationService>("/locations"))
}

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(query), _): WithRejection<Query<MasterQuery>, ApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<LocationFilter>, ApiError>,
) -> ApiResult<Paginated<MasterRecord>> {
    Ok(state.masters.locations.find_all(&query, &filter).await?)
}

pub async fn location_statistics(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<LocationStatistics>> {
    Ok(DataResponse::new(state.masters.locations.statistics().await?))
}

pub async fn popular_locations(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(state.masters.locations.popular().await?))
}

/// Active locations of one city; 404 when the city does not exist
pub async fn locations_by_city(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(city_id): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.locations.by_city(&city_id).await?,
    ))
}
