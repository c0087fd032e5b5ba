//! Washroom payload and filters

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WashroomType {
    #[default]
    Attached,
    Common,
    Shared,
    Powder,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WashroomSpecifications {
    pub has_shower: bool,
    pub has_bathtub: bool,
    pub has_geyser: bool,
    pub western_toilet: bool,
}

/// Washroom attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct WashroomAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Number of washrooms this option stands for
    pub value: u32,
    pub washroom_type: WashroomType,
    pub specifications: WashroomSpecifications,
}

impl Default for WashroomAttributes {
    fn default() -> Self {
        Self {
            description: None,
            code: None,
            value: 1,
            washroom_type: WashroomType::default(),
            specifications: WashroomSpecifications::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WashroomFilter {
    /// Comma-separated washroom types
    #[serde(default)]
    pub washroom_type: Option<String>,
}
