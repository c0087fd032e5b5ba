//! Amenity payload and filters

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmenityCategory {
    #[default]
    Basic,
    Recreational,
    Security,
    Convenience,
    Wellness,
    Sports,
    Green,
}

/// How much buyers care about an amenity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    #[default]
    Medium,
    High,
    Essential,
}

/// Which listing segments an amenity applies to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Availability {
    pub residential: bool,
    pub commercial: bool,
    pub luxury: bool,
    pub basic: bool,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            residential: true,
            commercial: false,
            luxury: false,
            basic: true,
        }
    }
}

/// Segment flag under `availability`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityFlag {
    Residential,
    Commercial,
    Luxury,
    Basic,
}

impl AvailabilityFlag {
    pub const ALL: [AvailabilityFlag; 4] = [
        AvailabilityFlag::Residential,
        AvailabilityFlag::Commercial,
        AvailabilityFlag::Luxury,
        AvailabilityFlag::Basic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Luxury => "luxury",
            Self::Basic => "basic",
        }
    }

    /// Attribute path of the flag
    pub fn path(&self) -> &'static str {
        match self {
            Self::Residential => "availability.residential",
            Self::Commercial => "availability.commercial",
            Self::Luxury => "availability.luxury",
            Self::Basic => "availability.basic",
        }
    }
}

/// Amenity attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AmenityAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub category: AmenityCategory,
    pub importance: Importance,
    /// 0-100
    pub popularity_score: u32,
    pub tags: Vec<String>,
    pub availability: Availability,
}

/// Amenity-specific list filters
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AmenityFilter {
    /// Comma-separated categories
    #[serde(default)]
    pub category: Option<String>,
    /// Comma-separated importance levels
    #[serde(default)]
    pub importance: Option<String>,
    /// Comma-separated tags, any of which may match
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub residential: Option<bool>,
    #[serde(default)]
    pub commercial: Option<bool>,
    #[serde(default)]
    pub luxury: Option<bool>,
    #[serde(default)]
    pub basic: Option<bool>,
    #[serde(default)]
    pub min_popularity: Option<u32>,
}

impl AmenityFilter {
    /// Requested availability flags
    pub fn flags(&self) -> Vec<(AvailabilityFlag, bool)> {
        [
            (AvailabilityFlag::Residential, self.residential),
            (AvailabilityFlag::Commercial, self.commercial),
            (AvailabilityFlag::Luxury, self.luxury),
            (AvailabilityFlag::Basic, self.basic),
        ]
        .into_iter()
        .filter_map(|(flag, value)| value.map(|v| (flag, v)))
        .collect()
    }
}
