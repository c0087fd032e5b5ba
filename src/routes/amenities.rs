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
use crate::domain::amenities::{AmenityFilter, AvailabilityFlag};
use crate::domain::{MasterQuery, MasterRecord};
use crate::error::{ApiError, ApiResult};
use crate::services::accessors::parse_enum;
use crate::services::amenities::AmenityStatistics;
use crate::services::AmenityService;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/amenities",
            get(list_amenities).post(master_data::create_record::<AmenityService>),
        )
        .route("/amenities/statistics", get(amenity_statistics))
        .route("/amenities/popular", get(popular_amenities))
        .route("/amenities/category/:category", get(amenities_by_category))
        .route("/amenities/tag/:tag", get(amenities_by_tag))
        .route("/amenities/availability/:flag", get(amenities_by_availability))
        .merge(master_data::record_routes::<AmenityService>("/amenities"))
}

/// List amenities with shared and amenity-specific filters
pub async fn list_amenities(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(query), _): WithRejection<Query<MasterQuery>, ApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<AmenityFilter>, ApiError>,
) -> ApiResult<Paginated<MasterRecord>> {
    Ok(state.masters.amenities.find_all(&query, &filter).await?)
}

pub async fn amenity_statistics(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<AmenityStatistics>> {
    Ok(DataResponse::new(state.masters.amenities.statistics().await?))
}

pub async fn popular_amenities(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(state.masters.amenities.popular().await?))
}

pub async fn amenities_by_category(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(category): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.amenities.by_category(&category).await?,
    ))
}

pub async fn amenities_by_tag(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(tag): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(state.masters.amenities.by_tag(&tag).await?))
}

pub async fn amenities_by_availability(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(flag): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    let flag: AvailabilityFlag = parse_enum(&flag, "availability flag")?;
    Ok(DataResponse::new(
        state.masters.amenities.by_availability(flag).await?,
    ))
}
