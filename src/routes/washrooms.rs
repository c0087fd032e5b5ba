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
use crate::domain::washrooms::WashroomFilter;
use crate::domain::{MasterQuery, MasterRecord, RangeQuery};
use crate::error::{ApiError, ApiResult};
use crate::services::washrooms::WashroomStatistics;
use crate::services::WashroomService;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/washrooms",
            get(list_washrooms).post(master_data::create_record::<WashroomService>),
        )
        .route("/washrooms/statistics", get(washroom_statistics))
        .route("/washrooms/range", get(washrooms_in_range))
        .route("/washrooms/type/:washroom_type", get(washrooms_by_type))
        .merge(master_data::record_routes::<WashroomService>("/washrooms"))
}

pub async fn list_washrooms(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(query), _): WithRejection<Query<MasterQuery>, ApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<WashroomFilter>, ApiError>,
    WithRejection(Query(bounds), _): WithRejection<Query<RangeQuery>, ApiError>,
) -> ApiResult<Paginated<MasterRecord>> {
    Ok(state
        .masters
        .washrooms
        .find_all(&query, &filter, &bounds)
        .await?)
}

pub async fn washroom_statistics(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<WashroomStatistics>> {
    Ok(DataResponse::new(state.masters.washrooms.statistics().await?))
}

pub async fn washrooms_in_range(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(bounds), _): WithRejection<Query<RangeQuery>, ApiError>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.washrooms.in_range(&bounds).await?,
    ))
}

pub async fn washrooms_by_type(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(washroom_type): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.washrooms.by_type(&washroom_type).await?,
    ))
}
