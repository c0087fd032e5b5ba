//! List criteria shared by every master-data kind

use serde::Deserialize;
use uuid::Uuid;

use super::master::MasterStatus;
use crate::api::PaginationParams;

/// Query params accepted by every master-data list endpoint
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MasterQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
    /// Single status or comma-separated list (`active,archived`)
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub is_popular: Option<bool>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    #[serde(default)]
    pub sort_order: Option<String>,
}

impl MasterQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }

    /// Requested statuses; `None` means the default (non-archived) scope
    pub fn statuses(&self) -> Result<Option<Vec<MasterStatus>>, String> {
        let Some(raw) = self.status.as_deref() else {
            return Ok(None);
        };
        let statuses = split_list(raw)
            .iter()
            .map(|s| MasterStatus::parse(s).ok_or_else(|| format!("Invalid status '{}'", s)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(if statuses.is_empty() {
            None
        } else {
            Some(statuses)
        })
    }

    /// Whether the requested order is descending
    pub fn descending(&self) -> Result<bool, String> {
        match self.sort_order.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("asc") => Ok(false),
            Some("desc") => Ok(true),
            Some(other) => Err(format!("Invalid sortOrder '{}', expected asc or desc", other)),
        }
    }

    /// Trimmed search text, if any
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Inclusive numeric bounds (`minValue`, `maxValue`)
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
}

impl RangeQuery {
    pub fn is_empty(&self) -> bool {
        self.min_value.is_none() && self.max_value.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        match (self.min_value, self.max_value) {
            (Some(min), Some(max)) if min > max => Err(format!(
                "minValue ({}) must not be greater than maxValue ({})",
                min, max
            )),
            _ => Ok(()),
        }
    }
}

/// Split a comma-separated query value into trimmed, lower-cased items
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_comma_lists() {
        let q = MasterQuery {
            status: Some("Active, archived".into()),
            ..Default::default()
        };
        assert_eq!(
            q.statuses().unwrap(),
            Some(vec![MasterStatus::Active, MasterStatus::Archived])
        );

        let bad = MasterQuery {
            status: Some("deleted".into()),
            ..Default::default()
        };
        assert!(bad.statuses().is_err());

        assert_eq!(MasterQuery::default().statuses().unwrap(), None);
    }

    #[test]
    fn descending_accepts_only_asc_or_desc() {
        let q = |s: &str| MasterQuery {
            sort_order: Some(s.into()),
            ..Default::default()
        };
        assert!(!MasterQuery::default().descending().unwrap());
        assert!(q("DESC").descending().unwrap());
        assert!(q("sideways").descending().is_err());
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let range = RangeQuery {
            min_value: Some(4.0),
            max_value: Some(2.0),
        };
        assert!(range.validate().is_err());
        assert!(RangeQuery::default().validate().is_ok());
        assert!(RangeQuery::default().is_empty());
    }

    #[test]
    fn blank_search_is_ignored() {
        let q = MasterQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(q.search_text(), None);
    }
}
