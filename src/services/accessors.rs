//! Helpers shared by the per-kind accessors

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::master_data::{MasterDataError, MasterResult};
use crate::domain::query::{split_list, RangeQuery};
use crate::store::{AttributeCondition, SortDirection, SortField, SortKey};

/// Popularity score first, then the shared display order
pub const POPULAR_SORT: [SortKey; 2] = [
    SortKey {
        field: SortField::Attribute("popularityScore"),
        direction: SortDirection::Desc,
    },
    SortKey {
        field: SortField::SortOrder,
        direction: SortDirection::Asc,
    },
];

/// Display order used by accessor lists
pub const DISPLAY_SORT: [SortKey; 1] = [SortKey {
    field: SortField::SortOrder,
    direction: SortDirection::Asc,
}];

/// Numeric `value` ascending, then display order
pub const VALUE_SORT: [SortKey; 2] = [
    SortKey {
        field: SortField::Attribute("value"),
        direction: SortDirection::Asc,
    },
    SortKey {
        field: SortField::SortOrder,
        direction: SortDirection::Asc,
    },
];

/// Parse one snake_case enum value, accepting `-` for `_` and any case
pub fn parse_enum<T: DeserializeOwned>(raw: &str, field: &str) -> MasterResult<T> {
    let canonical = canonical_enum(raw);
    serde_json::from_value(Value::String(canonical))
        .map_err(|_| MasterDataError::BadRequest(format!("Invalid {} '{}'", field, raw.trim())))
}

/// Validate a comma list of enum values, returning their stored spellings
pub fn enum_list<T: DeserializeOwned>(raw: Option<&str>, field: &str) -> MasterResult<Vec<String>> {
    raw.map(split_list)
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            parse_enum::<T>(&item, field)?;
            Ok(canonical_enum(&item))
        })
        .collect()
}

fn canonical_enum(raw: &str) -> String {
    raw.trim().to_lowercase().replace('-', "_")
}

/// `OneOf` condition, or nothing when the list is empty
pub fn one_of(path: &'static str, values: Vec<String>) -> Option<AttributeCondition> {
    (!values.is_empty()).then_some(AttributeCondition::OneOf { path, values })
}

/// `ContainsAny` over a comma list of tags
pub fn any_tag(path: &'static str, raw: Option<&str>) -> Option<AttributeCondition> {
    let values = raw.map(split_list).unwrap_or_default();
    (!values.is_empty()).then_some(AttributeCondition::ContainsAny { path, values })
}

pub fn flag(path: &'static str, value: bool) -> AttributeCondition {
    AttributeCondition::Equals {
        path,
        value: json!(value),
    }
}

/// Validated numeric range condition
pub fn range(path: &'static str, bounds: &RangeQuery) -> MasterResult<Option<AttributeCondition>> {
    bounds.validate().map_err(MasterDataError::BadRequest)?;
    Ok((!bounds.is_empty()).then_some(AttributeCondition::Range {
        path,
        min: bounds.min_value,
        max: bounds.max_value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amenities::AmenityCategory;
    use crate::domain::property_types::PropertyCategory;

    #[test]
    fn parse_enum_is_lenient_about_case_and_dashes() {
        assert_eq!(
            parse_enum::<PropertyCategory>("Mixed-Use", "category").unwrap(),
            PropertyCategory::MixedUse
        );
        assert!(parse_enum::<AmenityCategory>("spa", "category").is_err());
    }

    #[test]
    fn enum_list_returns_stored_spellings() {
        let values = enum_list::<AmenityCategory>(Some("Sports, WELLNESS"), "category").unwrap();
        assert_eq!(values, ["sports", "wellness"]);
        assert!(enum_list::<AmenityCategory>(Some("sports,spa"), "category").is_err());
        assert!(enum_list::<AmenityCategory>(None, "category").unwrap().is_empty());
    }

    #[test]
    fn range_validates_bounds() {
        let inverted = RangeQuery {
            min_value: Some(3.0),
            max_value: Some(1.0),
        };
        assert!(range("value", &inverted).is_err());
        assert_eq!(range("value", &RangeQuery::default()).unwrap(), None);
    }
}
