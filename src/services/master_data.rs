//! Generic master data engine
//!
//! One engine type serves every master-data kind. What differs per kind is
//! described by a [`KindSpec`] capability record (searchable paths, sortable
//! fields, parent rule, attribute normalizer) and an injected [`UsageCheck`].

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::api::Paginated;
use crate::domain::master::{
    name_key, normalize_name, CreateMasterRequest, MasterRecord, MasterStatus, MasterType,
    UpdateMasterRequest, MAX_NAME_LEN,
};
use crate::domain::query::MasterQuery;
use crate::store::{
    AttributeCondition, GroupCount, GroupKey, MasterStore, RecordFilter, SearchClause, SortField,
    SortKey, StoreError, Window,
};

/// Failure kinds surfaced to callers of the engine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MasterDataError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

pub type MasterResult<T> = Result<T, MasterDataError>;

/// Validates a kind's attribute payload and returns its normalized form
pub type AttributeNormalizer = fn(Value) -> Result<Value, String>;

/// Which kind of record may be a parent, and whether one is mandatory
#[derive(Debug, Clone, Copy)]
pub struct ParentRule {
    pub master_type: MasterType,
    pub required: bool,
}

/// Capability record describing one master-data kind
#[derive(Debug)]
pub struct KindSpec {
    pub master_type: MasterType,
    /// Attribute paths matched by free-text search, in addition to the name
    pub searchable: &'static [&'static str],
    /// Kind-specific `sortBy` values, on top of [`BASE_SORT_FIELDS`]
    pub sortable: &'static [(&'static str, SortField)],
    pub parent: Option<ParentRule>,
    pub normalize: AttributeNormalizer,
}

/// `sortBy` values every kind accepts
pub const BASE_SORT_FIELDS: &[(&str, SortField)] = &[
    ("name", SortField::Name),
    ("sortOrder", SortField::SortOrder),
    ("status", SortField::Status),
    ("createdAt", SortField::CreatedAt),
    ("updatedAt", SortField::UpdatedAt),
];

/// Hook consulted before a record is deleted
#[async_trait]
pub trait UsageCheck: Send + Sync {
    /// A reason when the record is still in use elsewhere, `None` when it may go
    async fn blocking_usage(&self, record: &MasterRecord) -> anyhow::Result<Option<String>>;
}

/// Usage check that never blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUsageCheck;

#[async_trait]
impl UsageCheck for NoUsageCheck {
    async fn blocking_usage(&self, _record: &MasterRecord) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

/// Counts shared by every kind's statistics
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MasterStatistics {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub archived: u64,
    pub defaults: u64,
    pub popular: u64,
}

#[derive(Clone)]
pub struct MasterDataEngine {
    store: Arc<dyn MasterStore>,
    spec: &'static KindSpec,
    usage_check: Arc<dyn UsageCheck>,
}

impl MasterDataEngine {
    pub fn new(store: Arc<dyn MasterStore>, spec: &'static KindSpec) -> Self {
        Self {
            store,
            spec,
            usage_check: Arc::new(NoUsageCheck),
        }
    }

    pub fn set_usage_check(&mut self, check: Arc<dyn UsageCheck>) {
        self.usage_check = check;
    }

    pub fn master_type(&self) -> MasterType {
        self.spec.master_type
    }

    #[instrument(skip(self, input), fields(master_type = %self.spec.master_type))]
    pub async fn create(
        &self,
        input: CreateMasterRequest,
        actor: Option<&str>,
    ) -> MasterResult<MasterRecord> {
        if let Some(requested) = input.master_type.as_deref() {
            if requested != self.spec.master_type.as_str() {
                tracing::debug!(requested, "Ignoring masterType supplied by caller");
            }
        }

        let name = validate_name(&input.name)?;
        let sort_order = validate_sort_order(input.sort_order.unwrap_or(0))?;
        let attributes = self.normalize_attributes(input.attributes.unwrap_or_else(empty_object))?;
        let parent_id = self.validate_parent(input.parent_id, None).await?;

        // Fast path for a friendly message; the store's unique constraint is authoritative
        self.ensure_name_free(&name, None).await?;

        let now = Utc::now();
        let record = MasterRecord {
            id: Uuid::new_v4(),
            master_type: self.spec.master_type,
            name,
            status: input.status.unwrap_or_default(),
            sort_order,
            is_default: input.is_default.unwrap_or(false),
            is_popular: input.is_popular,
            parent_id,
            attributes,
            created_by: actor.map(str::to_string),
            updated_by: actor.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        self.store
            .insert(&record)
            .await
            .map_err(|e| self.translate(e))?;

        tracing::info!(id = %record.id, name = %record.name, "Created master record");
        Ok(record)
    }

    /// Paginated listing with the shared filters plus kind conditions
    #[instrument(skip(self, query, conditions), fields(master_type = %self.spec.master_type))]
    pub async fn find_all(
        &self,
        query: &MasterQuery,
        conditions: Vec<AttributeCondition>,
    ) -> MasterResult<Paginated<MasterRecord>> {
        let params = query.pagination();
        params.validate().map_err(MasterDataError::BadRequest)?;

        let statuses = query.statuses().map_err(MasterDataError::BadRequest)?;
        let sort = self.resolve_sort(query)?;

        let mut filter = match statuses {
            Some(statuses) => RecordFilter::all(self.spec.master_type).with_statuses(statuses),
            None => RecordFilter::visible(self.spec.master_type),
        };
        filter.is_default = query.is_default;
        filter.is_popular = query.is_popular;
        filter.parent_id = query.parent_id;
        filter.search = query.search_text().map(|text| SearchClause {
            text: text.to_string(),
            fields: self.spec.searchable.to_vec(),
        });
        filter.conditions = conditions;

        let total = self
            .store
            .count(&filter)
            .await
            .map_err(|e| self.translate(e))?;
        let window = Window {
            offset: params.offset(),
            limit: u64::from(params.limit()),
        };
        let records = self
            .store
            .find(&filter, &sort, Some(window))
            .await
            .map_err(|e| self.translate(e))?;

        Ok(Paginated::new(records, &params, total))
    }

    /// Look up a record by its raw id; malformed ids are reported as missing
    pub async fn find_by_id(&self, id: &str) -> MasterResult<MasterRecord> {
        let not_found = || {
            MasterDataError::NotFound(format!(
                "{} with id '{}' not found",
                self.spec.master_type.label(),
                id
            ))
        };

        let uuid = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;
        self.store
            .get(uuid)
            .await
            .map_err(|e| self.translate(e))?
            .filter(|r| r.master_type == self.spec.master_type)
            .ok_or_else(not_found)
    }

    #[instrument(skip(self, changes), fields(master_type = %self.spec.master_type))]
    pub async fn update(
        &self,
        id: &str,
        changes: UpdateMasterRequest,
        actor: Option<&str>,
    ) -> MasterResult<MasterRecord> {
        let existing = self.find_by_id(id).await?;
        let mut record = existing.clone();

        if let Some(raw) = changes.name.as_deref() {
            let name = validate_name(raw)?;
            if name_key(&name) != existing.name_key() {
                self.ensure_name_free(&name, Some(existing.id)).await?;
            }
            record.name = name;
        }
        if let Some(status) = changes.status {
            record.status = status;
        }
        if let Some(sort_order) = changes.sort_order {
            record.sort_order = validate_sort_order(sort_order)?;
        }
        if let Some(is_default) = changes.is_default {
            record.is_default = is_default;
        }
        if let Some(is_popular) = changes.is_popular {
            record.is_popular = is_popular;
        }
        if let Some(parent_id) = changes.parent_id {
            record.parent_id = parent_id;
        }
        record.parent_id = self
            .validate_parent(record.parent_id, Some(existing.id))
            .await?;

        let merged = match changes.attributes {
            Some(patch) => merge_json(existing.attributes.clone(), patch),
            None => existing.attributes.clone(),
        };
        record.attributes = self.normalize_attributes(merged)?;

        record.updated_by = actor.map(str::to_string).or(existing.updated_by.clone());
        record.updated_at = Utc::now().max(existing.updated_at);

        self.store
            .replace(&record)
            .await
            .map_err(|e| self.translate(e))?;

        tracing::info!(id = %record.id, name = %record.name, "Updated master record");
        Ok(record)
    }

    /// Hard delete after the child and usage checks pass
    #[instrument(skip(self), fields(master_type = %self.spec.master_type))]
    pub async fn remove(&self, id: &str) -> MasterResult<MasterRecord> {
        let record = self.find_by_id(id).await?;
        let label = self.spec.master_type.label();

        let children = self
            .store
            .count_children(record.id)
            .await
            .map_err(|e| self.translate(e))?;
        if children > 0 {
            return Err(MasterDataError::BadRequest(format!(
                "Cannot delete {} '{}': {} dependent record(s) reference it",
                label, record.name, children
            )));
        }

        let usage = self.usage_check.blocking_usage(&record).await.map_err(|e| {
            tracing::error!(error = ?e, id = %record.id, "Usage check failed");
            MasterDataError::BadRequest(format!(
                "Could not verify whether {} '{}' is in use",
                label, record.name
            ))
        })?;
        if let Some(reason) = usage {
            return Err(MasterDataError::BadRequest(format!(
                "Cannot delete {} '{}': {}",
                label, record.name, reason
            )));
        }

        self.store
            .delete(record.id)
            .await
            .map_err(|e| self.translate(e))?;

        tracing::info!(id = %record.id, name = %record.name, "Deleted master record");
        Ok(record)
    }

    pub async fn statistics(&self) -> MasterResult<MasterStatistics> {
        let master_type = self.spec.master_type;
        let all = RecordFilter::all(master_type);
        let with_status = |status| RecordFilter::all(master_type).with_statuses(vec![status]);
        let defaults = RecordFilter {
            is_default: Some(true),
            ..RecordFilter::visible(master_type)
        };
        let popular = RecordFilter {
            is_popular: Some(true),
            ..RecordFilter::visible(master_type)
        };

        Ok(MasterStatistics {
            total: self.count(&all).await?,
            active: self.count(&with_status(MasterStatus::Active)).await?,
            inactive: self.count(&with_status(MasterStatus::Inactive)).await?,
            archived: self.count(&with_status(MasterStatus::Archived)).await?,
            defaults: self.count(&defaults).await?,
            popular: self.count(&popular).await?,
        })
    }

    /// Group-by breakdown over non-archived records
    pub async fn breakdown(&self, key: GroupKey) -> MasterResult<Vec<GroupCount>> {
        self.store
            .group_count(&RecordFilter::visible(self.spec.master_type), key)
            .await
            .map_err(|e| self.translate(e))
    }

    /// Count of non-archived records matching one condition
    pub async fn count_where(&self, condition: AttributeCondition) -> MasterResult<u64> {
        self.count(&RecordFilter::visible(self.spec.master_type).with_condition(condition))
            .await
    }

    /// Every active record, ordered for selection lists
    pub async fn list_active(&self) -> MasterResult<Vec<MasterRecord>> {
        self.list_where(Vec::new(), &[SortKey::asc(SortField::SortOrder)])
            .await
    }

    /// Unpaginated active records matching the conditions
    pub async fn list_where(
        &self,
        conditions: Vec<AttributeCondition>,
        sort: &[SortKey],
    ) -> MasterResult<Vec<MasterRecord>> {
        let mut filter = self.active_filter();
        filter.conditions = conditions;
        self.find_filtered(&filter, sort).await
    }

    /// Active records of this kind; the scope every accessor starts from
    pub fn active_filter(&self) -> RecordFilter {
        RecordFilter::all(self.spec.master_type).with_statuses(vec![MasterStatus::Active])
    }

    /// Unpaginated read with a caller-built filter
    pub async fn find_filtered(
        &self,
        filter: &RecordFilter,
        sort: &[SortKey],
    ) -> MasterResult<Vec<MasterRecord>> {
        self.store
            .find(filter, sort, None)
            .await
            .map_err(|e| self.translate(e))
    }

    async fn count(&self, filter: &RecordFilter) -> MasterResult<u64> {
        self.store
            .count(filter)
            .await
            .map_err(|e| self.translate(e))
    }

    fn resolve_sort(&self, query: &MasterQuery) -> MasterResult<Vec<SortKey>> {
        let descending = query.descending().map_err(MasterDataError::BadRequest)?;
        let field = match query.sort_by.as_deref().map(str::trim) {
            None | Some("") => SortField::SortOrder,
            Some(name) => BASE_SORT_FIELDS
                .iter()
                .chain(self.spec.sortable.iter())
                .find(|(allowed, _)| *allowed == name)
                .map(|(_, field)| *field)
                .ok_or_else(|| {
                    MasterDataError::BadRequest(format!("Cannot sort by '{}'", name))
                })?,
        };

        let primary = if descending {
            SortKey::desc(field)
        } else {
            SortKey::asc(field)
        };
        let mut sort = vec![primary];
        if field != SortField::SortOrder {
            sort.push(SortKey::asc(SortField::SortOrder));
        }
        Ok(sort)
    }

    async fn ensure_name_free(&self, name: &str, owner: Option<Uuid>) -> MasterResult<()> {
        let existing = self
            .store
            .find_by_name(self.spec.master_type, &name_key(name))
            .await
            .map_err(|e| self.translate(e))?;

        match existing {
            Some(other) if Some(other.id) != owner => Err(MasterDataError::Conflict(format!(
                "{} '{}' already exists",
                self.spec.master_type.label(),
                other.name
            ))),
            _ => Ok(()),
        }
    }

    async fn validate_parent(
        &self,
        parent_id: Option<Uuid>,
        self_id: Option<Uuid>,
    ) -> MasterResult<Option<Uuid>> {
        let label = self.spec.master_type.label();
        let (rule, parent_id) = match (self.spec.parent, parent_id) {
            (None, None) => return Ok(None),
            (None, Some(_)) => {
                return Err(MasterDataError::BadRequest(format!(
                    "{} records do not take a parent",
                    label
                )))
            }
            (Some(rule), None) if rule.required => {
                return Err(MasterDataError::BadRequest(format!(
                    "parentId ({}) is required for {}",
                    rule.master_type, label
                )))
            }
            (Some(_), None) => return Ok(None),
            (Some(rule), Some(parent_id)) => (rule, parent_id),
        };

        if Some(parent_id) == self_id {
            return Err(MasterDataError::BadRequest(format!(
                "{} cannot be its own parent",
                label
            )));
        }

        let parent = self
            .store
            .get(parent_id)
            .await
            .map_err(|e| self.translate(e))?;
        match parent {
            Some(p) if p.master_type == rule.master_type => Ok(Some(parent_id)),
            _ => Err(MasterDataError::BadRequest(format!(
                "Parent {} '{}' not found",
                rule.master_type, parent_id
            ))),
        }
    }

    fn normalize_attributes(&self, attributes: Value) -> MasterResult<Value> {
        (self.spec.normalize)(attributes).map_err(|e| {
            MasterDataError::BadRequest(format!(
                "Invalid {} attributes: {}",
                self.spec.master_type, e
            ))
        })
    }

    fn translate(&self, err: StoreError) -> MasterDataError {
        let label = self.spec.master_type.label();
        match err {
            StoreError::Duplicate { name, .. } => {
                MasterDataError::Conflict(format!("{} '{}' already exists", label, name))
            }
            StoreError::Referenced(id) => MasterDataError::BadRequest(format!(
                "Cannot delete {} '{}': other records reference it",
                label, id
            )),
            StoreError::NotFound(id) => {
                MasterDataError::NotFound(format!("{} with id '{}' not found", label, id))
            }
            StoreError::MissingParent(id) => {
                MasterDataError::BadRequest(format!("Parent record '{}' not found", id))
            }
            StoreError::Backend(e) => {
                tracing::error!(error = ?e, master_type = %self.spec.master_type, "Master data storage failure");
                MasterDataError::BadRequest(format!("Failed to process {} request", label))
            }
        }
    }
}

fn validate_name(raw: &str) -> MasterResult<String> {
    let name = normalize_name(raw);
    if name.is_empty() {
        return Err(MasterDataError::BadRequest("name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(MasterDataError::BadRequest(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

fn validate_sort_order(sort_order: i32) -> MasterResult<i32> {
    if sort_order < 0 {
        return Err(MasterDataError::BadRequest(
            "sortOrder must not be negative".to_string(),
        ));
    }
    Ok(sort_order)
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Deep-merge `patch` into `base`; objects merge key by key, anything else replaces
pub fn merge_json(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base), Value::Object(patch)) => {
            for (key, value) in patch {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

/// Deserialize attributes into a typed payload, validate it and serialize it back
pub fn normalize_with<T, F>(attributes: Value, validate: F) -> Result<Value, String>
where
    T: serde::de::DeserializeOwned + Serialize,
    F: FnOnce(&mut T) -> Result<(), String>,
{
    if !attributes.is_object() {
        return Err("attributes must be an object".to_string());
    }
    let mut typed: T = serde_json::from_value(attributes).map_err(|e| e.to_string())?;
    validate(&mut typed)?;
    serde_json::to_value(typed).map_err(|e| e.to_string())
}

/// Trim optional text, dropping it when blank
pub fn clean_text(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
}

/// Lower-case, trim and de-duplicate tags, keeping first-seen order
pub fn clean_tags(tags: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    *tags = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect();
}
