//! Bedroom and bathroom count options

use serde::{Deserialize, Serialize};

/// Smallest and largest room count an option may carry
pub const MIN_ROOM_COUNT: u32 = 1;
pub const MAX_ROOM_COUNT: u32 = 20;

/// Bedroom attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BedroomAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub value: u32,
    /// Display unit, e.g. `BHK` or `RK`
    pub unit: String,
}

impl Default for BedroomAttributes {
    fn default() -> Self {
        Self {
            description: None,
            code: None,
            value: 1,
            unit: "BHK".to_string(),
        }
    }
}

/// Bathroom attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BathroomAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub value: u32,
}

impl Default for BathroomAttributes {
    fn default() -> Self {
        Self {
            description: None,
            code: None,
            value: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoomFilter {
    /// Bedroom unit (`BHK`, `RK`); ignored for bathrooms
    #[serde(default)]
    pub unit: Option<String>,
}
