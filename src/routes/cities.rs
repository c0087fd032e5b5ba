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
use crate::domain::cities::CityFilter;
use crate::domain::{MasterQuery, MasterRecord};
use crate::error::{ApiError, ApiResult};
use crate::services::cities::CityStatistics;
use crate::services::CityService;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/cities",
            get(list_cities).post(master_data::create_record::<CityService>),
        )
        .route("/cities/statistics", get(city_statistics))
        .route("/cities/popular", get(popular_cities))
        .route("/cities/state/:state", get(cities_by_state))
        .merge(master_data::record_routes::<CityService>("/cities"))
}

pub async fn list_cities(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(query), _): WithRejection<Query<MasterQuery>, ApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<CityFilter>, ApiError>,
) -> ApiResult<Paginated<MasterRecord>> {
    Ok(state.masters.cities.find_all(&query, &filter).await?)
}

pub async fn city_statistics(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<CityStatistics>> {
    Ok(DataResponse::new(state.masters.cities.statistics().await?))
}

pub async fn popular_cities(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(state.masters.cities.popular().await?))
}

pub async fn cities_by_state(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(region): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.cities.by_state(&region).await?,
    ))
}
