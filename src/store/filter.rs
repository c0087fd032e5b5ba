//! Storage-level query criteria
//!
//! Backends translate these into their own query language. The memory store
//! evaluates them directly through [`RecordFilter::matches`] and [`compare`].

use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::domain::master::{MasterRecord, MasterStatus, MasterType};

/// Condition on a dotted attribute path
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeCondition {
    /// Attribute equals the given JSON value
    Equals { path: &'static str, value: Value },
    /// Attribute equals any of the given strings
    OneOf {
        path: &'static str,
        values: Vec<String>,
    },
    /// Attribute is an array containing at least one of the given strings
    ContainsAny {
        path: &'static str,
        values: Vec<String>,
    },
    /// Attribute is a number within the inclusive bounds
    Range {
        path: &'static str,
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl AttributeCondition {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Equals { path, .. }
            | Self::OneOf { path, .. }
            | Self::ContainsAny { path, .. }
            | Self::Range { path, .. } => path,
        }
    }

    fn matches(&self, record: &MasterRecord) -> bool {
        let value = record.attribute(self.path());
        match self {
            Self::Equals { value: expected, .. } => value == Some(expected),
            Self::OneOf { values, .. } => value
                .and_then(Value::as_str)
                .map(|s| values.iter().any(|v| v == s))
                .unwrap_or(false),
            Self::ContainsAny { values, .. } => value
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .any(|item| values.iter().any(|v| v == item))
                })
                .unwrap_or(false),
            Self::Range { min, max, .. } => match value.and_then(Value::as_f64) {
                Some(n) => min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m),
                None => false,
            },
        }
    }
}

/// Case-insensitive substring search over the name and attribute paths
#[derive(Debug, Clone, PartialEq)]
pub struct SearchClause {
    pub text: String,
    pub fields: Vec<&'static str>,
}

impl SearchClause {
    fn matches(&self, record: &MasterRecord) -> bool {
        let needle = self.text.to_lowercase();
        if record.name.to_lowercase().contains(&needle) {
            return true;
        }
        self.fields.iter().any(|path| match record.attribute(path) {
            Some(Value::String(s)) => s.to_lowercase().contains(&needle),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|s| s.to_lowercase().contains(&needle)),
            _ => false,
        })
    }
}

/// Full filter over one master type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
    pub master_type: MasterType,
    /// Empty means every status
    pub statuses: Vec<MasterStatus>,
    pub is_default: Option<bool>,
    pub is_popular: Option<bool>,
    pub parent_id: Option<Uuid>,
    pub search: Option<SearchClause>,
    pub conditions: Vec<AttributeCondition>,
}

impl RecordFilter {
    /// Every record of the type, whatever its status
    pub fn all(master_type: MasterType) -> Self {
        Self {
            master_type,
            statuses: Vec::new(),
            is_default: None,
            is_popular: None,
            parent_id: None,
            search: None,
            conditions: Vec::new(),
        }
    }

    /// Default listing scope: archived records hidden
    pub fn visible(master_type: MasterType) -> Self {
        Self::all(master_type).with_statuses(vec![MasterStatus::Active, MasterStatus::Inactive])
    }

    pub fn with_statuses(mut self, statuses: Vec<MasterStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn with_condition(mut self, condition: AttributeCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn matches(&self, record: &MasterRecord) -> bool {
        record.master_type == self.master_type
            && (self.statuses.is_empty() || self.statuses.contains(&record.status))
            && self.is_default.map_or(true, |d| record.is_default == d)
            && self
                .is_popular
                .map_or(true, |p| record.is_popular.unwrap_or(false) == p)
            && self.parent_id.map_or(true, |p| record.parent_id == Some(p))
            && self.search.as_ref().map_or(true, |s| s.matches(record))
            && self.conditions.iter().all(|c| c.matches(record))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    SortOrder,
    Status,
    CreatedAt,
    UpdatedAt,
    /// Dotted attribute path
    Attribute(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Offset/limit window for paginated reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// Dimension a statistics breakdown is grouped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Attribute(&'static str),
    Parent,
}

/// One bucket of a group-by count
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

/// Order two records by the sort keys, falling back to name then id
pub fn compare(a: &MasterRecord, b: &MasterRecord, sort: &[SortKey]) -> Ordering {
    sort.iter()
        .map(|key| {
            let ord = match key.field {
                SortField::Name => a.name.cmp(&b.name),
                SortField::SortOrder => a.sort_order.cmp(&b.sort_order),
                SortField::Status => a.status.as_str().cmp(b.status.as_str()),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Attribute(path) => compare_values(a.attribute(path), b.attribute(path)),
            };
            match key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Missing values sort first, numbers numerically, everything else as text
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => value_text(a).cmp(&value_text(b)),
        },
    }
}

/// Bucket label for a grouped attribute value
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record(name: &str, attributes: Value) -> MasterRecord {
        let now = Utc::now();
        MasterRecord {
            id: Uuid::new_v4(),
            master_type: MasterType::Amenity,
            name: name.to_string(),
            status: MasterStatus::Active,
            sort_order: 0,
            is_default: false,
            is_popular: None,
            parent_id: None,
            attributes,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn visible_scope_hides_archived() {
        let mut r = record("Gym", json!({}));
        let filter = RecordFilter::visible(MasterType::Amenity);
        assert!(filter.matches(&r));

        r.status = MasterStatus::Archived;
        assert!(!filter.matches(&r));
        assert!(RecordFilter::all(MasterType::Amenity).matches(&r));
    }

    #[test]
    fn filter_rejects_other_types() {
        let r = record("Gym", json!({}));
        assert!(!RecordFilter::all(MasterType::City).matches(&r));
    }

    #[test]
    fn conditions_match_nested_attributes() {
        let r = record(
            "Club House",
            json!({
                "category": "recreational",
                "tags": ["family", "indoor"],
                "popularityScore": 70,
                "availability": { "luxury": true }
            }),
        );

        let ok = RecordFilter::all(MasterType::Amenity)
            .with_condition(AttributeCondition::OneOf {
                path: "category",
                values: vec!["basic".into(), "recreational".into()],
            })
            .with_condition(AttributeCondition::ContainsAny {
                path: "tags",
                values: vec!["indoor".into()],
            })
            .with_condition(AttributeCondition::Range {
                path: "popularityScore",
                min: Some(50.0),
                max: None,
            })
            .with_condition(AttributeCondition::Equals {
                path: "availability.luxury",
                value: json!(true),
            });
        assert!(ok.matches(&r));

        let too_high = RecordFilter::all(MasterType::Amenity).with_condition(
            AttributeCondition::Range {
                path: "popularityScore",
                min: Some(80.0),
                max: Some(100.0),
            },
        );
        assert!(!too_high.matches(&r));
    }

    #[test]
    fn search_covers_name_and_listed_fields() {
        let r = record("Gym", json!({ "description": "Fully EQUIPPED", "tags": ["fitness"] }));
        let search = |text: &str, fields: Vec<&'static str>| RecordFilter {
            search: Some(SearchClause {
                text: text.to_string(),
                fields,
            }),
            ..RecordFilter::all(MasterType::Amenity)
        };

        assert!(search("gy", vec![]).matches(&r));
        assert!(search("equipped", vec!["description"]).matches(&r));
        assert!(search("fit", vec!["tags"]).matches(&r));
        assert!(!search("equipped", vec![]).matches(&r));
    }

    #[test]
    fn compare_uses_keys_then_name() {
        let mut a = record("Beta", json!({ "popularityScore": 10 }));
        let mut b = record("Alpha", json!({ "popularityScore": 90 }));
        a.sort_order = 1;
        b.sort_order = 1;

        let by_score = [SortKey::desc(SortField::Attribute("popularityScore"))];
        assert_eq!(compare(&b, &a, &by_score), Ordering::Less);

        let by_order = [SortKey::asc(SortField::SortOrder)];
        assert_eq!(compare(&b, &a, &by_order), Ordering::Less);
    }
}
