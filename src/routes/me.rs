use axum::Json;
use serde::Serialize;

use crate::auth::RequireAuth;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub issuer: Option<String>,
    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

/// Get current authenticated user info
pub async fn get_me(auth: RequireAuth) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: auth.user_id.clone(),
        email: auth.email.clone(),
        role: auth.role.clone(),
        issuer: auth.issuer.clone(),
        expires_at: auth.claims().exp,
    })
}
