//! Bedroom and bathroom routes
//!
//! Both kinds share one set of handlers, picked by the service type.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use std::ops::Deref;
use std::sync::Arc;

use super::master_data;
use crate::api::{DataResponse, Paginated};
use crate::app::AppState;
use crate::auth::RequireAuth;
use crate::domain::rooms::RoomFilter;
use crate::domain::{MasterQuery, MasterRecord, RangeQuery};
use crate::error::{ApiError, ApiResult};
use crate::services::rooms::RoomStatistics;
use crate::services::{BathroomService, BedroomService, MasterKind, RoomCountService};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(room_routes::<BedroomService>("/bedrooms"))
        .merge(room_routes::<BathroomService>("/bathrooms"))
}

fn room_routes<K>(base: &str) -> Router<Arc<AppState>>
where
    K: MasterKind + Deref<Target = RoomCountService>,
{
    Router::new()
        .route(
            base,
            get(list_rooms::<K>).post(master_data::create_record::<K>),
        )
        .route(&format!("{}/statistics", base), get(room_statistics::<K>))
        .route(&format!("{}/range", base), get(rooms_in_range::<K>))
        .merge(master_data::record_routes::<K>(base))
}

pub async fn list_rooms<K>(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(query), _): WithRejection<Query<MasterQuery>, ApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<RoomFilter>, ApiError>,
    WithRejection(Query(bounds), _): WithRejection<Query<RangeQuery>, ApiError>,
) -> ApiResult<Paginated<MasterRecord>>
where
    K: MasterKind + Deref<Target = RoomCountService>,
{
    Ok(K::from_registry(&state.masters)
        .find_all(&query, &filter, &bounds)
        .await?)
}

pub async fn room_statistics<K>(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
) -> ApiResult<DataResponse<RoomStatistics>>
where
    K: MasterKind + Deref<Target = RoomCountService>,
{
    Ok(DataResponse::new(
        K::from_registry(&state.masters).statistics().await?,
    ))
}

pub async fn rooms_in_range<K>(
    State(state): State<Arc<AppState>>,
    _auth: RequireAuth,
    WithRejection(Query(bounds), _): WithRejection<Query<RangeQuery>, ApiError>,
) -> ApiResult<DataResponse<Vec<MasterRecord>>>
where
    K: MasterKind + Deref<Target = RoomCountService>,
{
    Ok(DataResponse::new(
        K::from_registry(&state.masters).in_range(&bounds).await?,
    ))
}
