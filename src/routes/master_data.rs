//! CRUD handlers shared by every master-data kind
//!
//! Mounted once per kind with the kind's service as the type parameter, e.g.
//! `get(master_data::get_record::<AmenityService>)`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

use crate::api::{Created, DataResponse};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::{CreateMasterRequest, MasterRecord, UpdateMasterRequest};
use crate::error::{ApiError, ApiResult};
use crate::services::MasterKind;

/// `/{base}/options` and `/{base}/:id` for one kind
pub fn record_routes<K: MasterKind>(base: &str) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/options", base), get(list_options::<K>))
        .route(
            &format!("{}/:id", base),
            get(get_record::<K>)
                .patch(update_record::<K>)
                .delete(delete_record::<K>),
        )
}

pub async fn create_record<K: MasterKind>(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    WithRejection(Json(input), _): WithRejection<Json<CreateMasterRequest>, ApiError>,
) -> ApiResult<Created<DataResponse<MasterRecord>>> {
    let record = K::from_registry(&state.masters)
        .engine()
        .create(input, auth.actor())
        .await?;
    Ok(Created(DataResponse::new(record)))
}

pub async fn get_record<K: MasterKind>(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<DataResponse<MasterRecord>> {
    let record = K::from_registry(&state.masters)
        .engine()
        .find_by_id(&id)
        .await?;
    Ok(DataResponse::new(record))
}

pub async fn update_record<K: MasterKind>(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<String>,
    WithRejection(Json(changes), _): WithRejection<Json<UpdateMasterRequest>, ApiError>,
) -> ApiResult<DataResponse<MasterRecord>> {
    let record = K::from_registry(&state.masters)
        .engine()
        .update(&id, changes, auth.actor())
        .await?;
    Ok(DataResponse::new(record))
}

/// Hard delete; responds with the removed record
pub async fn delete_record<K: MasterKind>(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> ApiResult<DataResponse<MasterRecord>> {
    let record = K::from_registry(&state.masters)
        .engine()
        .remove(&id)
        .await?;
    tracing::info!(id = %record.id, actor = %auth.user_id, "Master record removed over HTTP");
    Ok(DataResponse::new(record))
}

/// Active records for selection dropdowns
pub async fn list_options<K: MasterKind>(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<Vec<MasterRecord>>> {
    let records = K::from_registry(&state.masters)
        .engine()
        .list_active()
        .await?;
    Ok(DataResponse::new(records))
}
