//! Master data record and request DTOs
//!
//! One record shape is shared by every master-data kind. Kind-specific fields
//! live in `attributes` and are validated by the owning kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length of a normalized name
pub const MAX_NAME_LEN: usize = 100;

/// Which master-data kind a record belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum MasterType {
    Amenity,
    PropertyType,
    Washroom,
    City,
    Location,
    Bedroom,
    Bathroom,
}

impl MasterType {
    pub const ALL: [MasterType; 7] = [
        MasterType::Amenity,
        MasterType::PropertyType,
        MasterType::Washroom,
        MasterType::City,
        MasterType::Location,
        MasterType::Bedroom,
        MasterType::Bathroom,
    ];

    /// Stored tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amenity => "amenity",
            Self::PropertyType => "property-type",
            Self::Washroom => "washroom",
            Self::City => "city",
            Self::Location => "location",
            Self::Bedroom => "bedroom",
            Self::Bathroom => "bathroom",
        }
    }

    /// Human label used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Amenity => "Amenity",
            Self::PropertyType => "Property type",
            Self::Washroom => "Washroom",
            Self::City => "City",
            Self::Location => "Location",
            Self::Bedroom => "Bedroom",
            Self::Bathroom => "Bathroom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for MasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record lifecycle status. Archived is the soft-deleted state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MasterStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl MasterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Master data entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MasterRecord {
    pub id: Uuid,
    pub master_type: MasterType,
    pub name: String,
    pub status: MasterStatus,
    pub sort_order: i32,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_popular: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub attributes: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MasterRecord {
    /// Key the per-type uniqueness constraint is enforced on
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    /// Look up a dotted path (`availability.residential`) inside the attributes
    pub fn attribute(&self, path: &str) -> Option<&serde_json::Value> {
        path.split('.')
            .try_fold(&self.attributes, |value, segment| value.get(segment))
    }
}

/// Request DTO for creating a master record
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateMasterRequest {
    pub name: String,
    /// Ignored: the engine always stamps its own type
    #[serde(default)]
    pub master_type: Option<String>,
    #[serde(default)]
    pub status: Option<MasterStatus>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub is_popular: Option<bool>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Request DTO for a partial update. `parentId: null` clears the parent.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMasterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<MasterStatus>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub is_popular: Option<Option<bool>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Distinguishes an explicit `null` from an absent field
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Trim, collapse inner whitespace and title-case a name
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive uniqueness key for a name
pub fn name_key(name: &str) -> String {
    normalize_name(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_trims_and_title_cases() {
        assert_eq!(normalize_name("  swimming   POOL "), "Swimming Pool");
        assert_eq!(normalize_name("pool"), "Pool");
        assert_eq!(normalize_name("Pool "), "Pool");
        assert_eq!(normalize_name("24x7 security"), "24x7 Security");
        assert_eq!(normalize_name("   "), "");
    }

    #[test]
    fn name_key_ignores_case_and_spacing() {
        assert_eq!(name_key("pool"), name_key(" POOL "));
        assert_ne!(name_key("pool"), name_key("pools"));
    }

    #[test]
    fn master_type_round_trips_through_tag() {
        for t in MasterType::ALL {
            assert_eq!(MasterType::parse(t.as_str()), Some(t));
        }
        assert_eq!(
            serde_json::to_value(MasterType::PropertyType).unwrap(),
            serde_json::json!("property-type")
        );
    }

    #[test]
    fn update_request_distinguishes_null_parent() {
        let cleared: UpdateMasterRequest =
            serde_json::from_value(serde_json::json!({ "parentId": null })).unwrap();
        assert_eq!(cleared.parent_id, Some(None));

        let absent: UpdateMasterRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(absent.parent_id, None);
    }

    #[test]
    fn attribute_walks_dotted_paths() {
        let now = Utc::now();
        let record = MasterRecord {
            id: Uuid::new_v4(),
            master_type: MasterType::Amenity,
            name: "Gym".to_string(),
            status: MasterStatus::Active,
            sort_order: 0,
            is_default: false,
            is_popular: None,
            parent_id: None,
            attributes: serde_json::json!({ "availability": { "luxury": true } }),
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            record.attribute("availability.luxury"),
            Some(&serde_json::json!(true))
        );
        assert_eq!(record.attribute("availability.basic"), None);
        assert_eq!(record.attribute("missing"), None);
    }
}
