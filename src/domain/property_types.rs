//! Property type payload and filters

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCategory {
    #[default]
    Residential,
    Commercial,
    Industrial,
    Agricultural,
    MixedUse,
}

/// Property type attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyTypeAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub category: PropertyCategory,
    /// 0-100
    pub popularity_score: u32,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeFilter {
    /// Comma-separated categories
    #[serde(default)]
    pub category: Option<String>,
    /// Comma-separated tags, any of which may match
    #[serde(default)]
    pub tags: Option<String>,
}
