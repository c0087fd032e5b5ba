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
use crate::domain::property_types::PropertyTypeFilter;
use crate::domain::{MasterQuery, MasterRecord};
use crate::error::{ApiError, ApiResult};
use crate::services::property_types::PropertyTypeStatistics;
use crate::services::PropertyTypeService;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/property-types",
            get(list_property_types).post(master_data::create_record::<PropertyTypeService>),
        )
        .route("/property-types/statistics", get(property_type_statistics))
        .route("/property-types/popular", get(popular_property_types))
        .route("/property-types/residential", get(residential_property_types))
        .route("/property-types/commercial", get(commercial_property_types))
        .route(
            "/property-types/category/:category",
            get(property_types_by_category),
        )
        .route("/property-types/tag/:tag", get(property_types_by_tag))
        .merge(master_data::record_routes::<PropertyTypeService>(
            "/property-types",
        ))
}

pub async fn list_property_types(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(query), _): WithRejection<Query<MasterQuery>, ApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<PropertyTypeFilter>, ApiError>,
) -> ApiResult<Paginated<MasterRecord>> {
    Ok(state.masters.property_types.find_all(&query, &filter).await?)
}

pub async fn property_type_statistics(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<PropertyTypeStatistics>> {
    Ok(DataResponse::new(
        state.masters.property_types.statistics().await?,
    ))
}

pub async fn popular_property_types(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(state.masters.property_types.popular().await?))
}

pub async fn residential_property_types(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.property_types.residential().await?,
    ))
}

pub async fn commercial_property_types(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.property_types.commercial().await?,
    ))
}

pub async fn property_types_by_category(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(category): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.property_types.by_category(&category).await?,
    ))
}

pub async fn property_types_by_tag(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(tag): Path<String>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    Ok(DataResponse::new(
        state.masters.property_types.by_tag(&tag).await?,
    ))
}
