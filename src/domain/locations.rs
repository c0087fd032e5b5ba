//! Location payload and filters
//!
//! Locations are the only kind with a parent: every location sits under a city.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Location attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct LocationAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Six-digit postal code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilter {
    /// Scope to locations under this city
    #[serde(default)]
    pub city_id: Option<Uuid>,
    #[serde(default)]
    pub pincode: Option<String>,
}
