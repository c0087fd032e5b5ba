use serde::{Deserialize, Serialize};

/// JWT claims accepted by the admin API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject; recorded as the actor on writes
    pub sub: String,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp) - optional
    #[serde(default)]
    pub iat: Option<i64>,

    /// Not before (Unix timestamp) - optional
    #[serde(default)]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    /// User email - optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// User role - optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
