//! PostgreSQL master store
//!
//! Records live in one `master_records` table with the kind payload in a
//! JSONB `attributes` column. `UNIQUE (master_type, name_key)` and the
//! self-referencing `parent_id` foreign key (`ON DELETE RESTRICT`) carry the
//! uniqueness and child invariants.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::filter::{
    AttributeCondition, GroupCount, GroupKey, RecordFilter, SortDirection, SortField, SortKey,
    Window,
};
use super::{MasterStore, StoreError, StoreResult};
use crate::domain::master::{MasterRecord, MasterStatus, MasterType};

const SELECT_COLUMNS: &str = r#"
    SELECT id, master_type, name, status, sort_order, is_default, is_popular,
           parent_id, attributes, created_by, updated_by, created_at, updated_at
    FROM master_records
"#;

/// Database row for a master record
#[derive(Debug, sqlx::FromRow)]
struct MasterRow {
    id: Uuid,
    master_type: String,
    name: String,
    status: String,
    sort_order: i32,
    is_default: bool,
    is_popular: Option<bool>,
    parent_id: Option<Uuid>,
    attributes: serde_json::Value,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MasterRow> for MasterRecord {
    type Error = StoreError;

    fn try_from(row: MasterRow) -> Result<Self, Self::Error> {
        let master_type = MasterType::parse(&row.master_type)
            .ok_or_else(|| anyhow!("unknown master_type '{}' on {}", row.master_type, row.id))?;
        let status = MasterStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("unknown status '{}' on {}", row.status, row.id))?;

        Ok(Self {
            id: row.id,
            master_type,
            name: row.name,
            status,
            sort_order: row.sort_order,
            is_default: row.is_default,
            is_popular: row.is_popular,
            parent_id: row.parent_id,
            attributes: row.attributes,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Master store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgMasterStore {
    pool: PgPool,
}

impl PgMasterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Split a dotted attribute path into a Postgres text[] path
fn json_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Strings match directly; arrays match when any string element does
fn push_search_field(qb: &mut QueryBuilder<'_, Postgres>, field: &str, pattern: &str) {
    let path = json_path(field);
    qb.push(" OR CASE jsonb_typeof(attributes #> ")
        .push_bind(path.clone())
        .push(") WHEN 'string' THEN attributes #>> ")
        .push_bind(path.clone())
        .push(" ILIKE ")
        .push_bind(pattern.to_string())
        .push(" WHEN 'array' THEN EXISTS (SELECT 1 FROM jsonb_array_elements(attributes #> ")
        .push_bind(path)
        .push(") AS item WHERE jsonb_typeof(item) = 'string' AND item #>> '{}' ILIKE ")
        .push_bind(pattern.to_string())
        .push(") ELSE FALSE END");
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RecordFilter) {
    qb.push(" WHERE master_type = ")
        .push_bind(filter.master_type.as_str().to_string());

    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        qb.push(" AND status = ANY(").push_bind(statuses).push(")");
    }
    if let Some(is_default) = filter.is_default {
        qb.push(" AND is_default = ").push_bind(is_default);
    }
    if let Some(is_popular) = filter.is_popular {
        qb.push(" AND COALESCE(is_popular, FALSE) = ")
            .push_bind(is_popular);
    }
    if let Some(parent_id) = filter.parent_id {
        qb.push(" AND parent_id = ").push_bind(parent_id);
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(&search.text);
        qb.push(" AND (name ILIKE ").push_bind(pattern.clone());
        for field in &search.fields {
            push_search_field(qb, field, &pattern);
        }
        qb.push(")");
    }

    for condition in &filter.conditions {
        let path = json_path(condition.path());
        match condition {
            AttributeCondition::Equals { value, .. } => {
                qb.push(" AND attributes #> ")
                    .push_bind(path)
                    .push(" = ")
                    .push_bind(value.clone());
            }
            AttributeCondition::OneOf { values, .. } => {
                qb.push(" AND attributes #>> ")
                    .push_bind(path)
                    .push(" = ANY(")
                    .push_bind(values.clone())
                    .push(")");
            }
            AttributeCondition::ContainsAny { values, .. } => {
                qb.push(" AND jsonb_exists_any(attributes #> ")
                    .push_bind(path)
                    .push(", ")
                    .push_bind(values.clone())
                    .push(")");
            }
            AttributeCondition::Range { min, max, .. } => {
                if let Some(min) = min {
                    push_numeric(qb, path.clone());
                    qb.push(" >= ").push_bind(*min);
                }
                if let Some(max) = max {
                    push_numeric(qb, path.clone());
                    qb.push(" <= ").push_bind(*max);
                }
            }
        }
    }
}

/// Numeric view of an attribute; NULL when the value is not a JSON number
fn push_numeric(qb: &mut QueryBuilder<'_, Postgres>, path: Vec<String>) {
    qb.push(" AND (CASE WHEN jsonb_typeof(attributes #> ")
        .push_bind(path.clone())
        .push(") = 'number' THEN (attributes #>> ")
        .push_bind(path)
        .push(")::float8 END)");
}

fn push_sort(qb: &mut QueryBuilder<'_, Postgres>, sort: &[SortKey]) {
    qb.push(" ORDER BY ");
    for key in sort {
        match key.field {
            SortField::Name => qb.push("name"),
            SortField::SortOrder => qb.push("sort_order"),
            SortField::Status => qb.push("status"),
            SortField::CreatedAt => qb.push("created_at"),
            SortField::UpdatedAt => qb.push("updated_at"),
            SortField::Attribute(path) => qb.push("attributes #> ").push_bind(json_path(path)),
        };
        match key.direction {
            SortDirection::Asc => qb.push(" ASC NULLS FIRST, "),
            SortDirection::Desc => qb.push(" DESC NULLS LAST, "),
        };
    }
    qb.push("name ASC, id ASC");
}

fn backend(err: sqlx::Error, what: &'static str) -> StoreError {
    StoreError::Backend(anyhow::Error::from(err).context(what))
}

fn is_violation(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(code),
        _ => false,
    }
}

fn write_error(err: sqlx::Error, record: &MasterRecord, what: &'static str) -> StoreError {
    match record.parent_id {
        _ if is_violation(&err, UNIQUE_VIOLATION) => StoreError::Duplicate {
            master_type: record.master_type,
            name: record.name.clone(),
        },
        Some(parent) if is_violation(&err, FOREIGN_KEY_VIOLATION) => {
            StoreError::MissingParent(parent)
        }
        _ => backend(err, what),
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[async_trait]
impl MasterStore for PgMasterStore {
    async fn insert(&self, record: &MasterRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO master_records (
                id, master_type, name, name_key, status, sort_order, is_default,
                is_popular, parent_id, attributes, created_by, updated_by,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(record.id)
        .bind(record.master_type.as_str())
        .bind(&record.name)
        .bind(record.name_key())
        .bind(record.status.as_str())
        .bind(record.sort_order)
        .bind(record.is_default)
        .bind(record.is_popular)
        .bind(record.parent_id)
        .bind(&record.attributes)
        .bind(&record.created_by)
        .bind(&record.updated_by)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, record, "Failed to insert master record"))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<MasterRecord>> {
        let row = sqlx::query_as::<_, MasterRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(e, "Failed to load master record"))?;

        row.map(MasterRecord::try_from).transpose()
    }

    async fn find_by_name(
        &self,
        master_type: MasterType,
        name_key: &str,
    ) -> StoreResult<Option<MasterRecord>> {
        let row = sqlx::query_as::<_, MasterRow>(&format!(
            "{} WHERE master_type = $1 AND name_key = $2",
            SELECT_COLUMNS
        ))
        .bind(master_type.as_str())
        .bind(name_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend(e, "Failed to look up master record by name"))?;

        row.map(MasterRecord::try_from).transpose()
    }

    async fn replace(&self, record: &MasterRecord) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE master_records
            SET name = $2, name_key = $3, status = $4, sort_order = $5,
                is_default = $6, is_popular = $7, parent_id = $8, attributes = $9,
                updated_by = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(record.name_key())
        .bind(record.status.as_str())
        .bind(record.sort_order)
        .bind(record.is_default)
        .bind(record.is_popular)
        .bind(record.parent_id)
        .bind(&record.attributes)
        .bind(&record.updated_by)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, record, "Failed to update master record"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(record.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM master_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_violation(&e, FOREIGN_KEY_VIOLATION) {
                    StoreError::Referenced(id)
                } else {
                    backend(e, "Failed to delete master record")
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn find(
        &self,
        filter: &RecordFilter,
        sort: &[SortKey],
        window: Option<Window>,
    ) -> StoreResult<Vec<MasterRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        push_filter(&mut qb, filter);
        push_sort(&mut qb, sort);
        if let Some(window) = window {
            qb.push(" LIMIT ")
                .push_bind(window.limit as i64)
                .push(" OFFSET ")
                .push_bind(window.offset as i64);
        }

        let rows = qb
            .build_query_as::<MasterRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend(e, "Failed to query master records"))?;

        rows.into_iter().map(MasterRecord::try_from).collect()
    }

    async fn count(&self, filter: &RecordFilter) -> StoreResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM master_records");
        push_filter(&mut qb, filter);

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| backend(e, "Failed to count master records"))?;
        Ok(total as u64)
    }

    async fn count_children(&self, parent_id: Uuid) -> StoreResult<u64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM master_records WHERE parent_id = $1")
                .bind(parent_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| backend(e, "Failed to count child records"))?;
        Ok(total as u64)
    }

    async fn group_count(
        &self,
        filter: &RecordFilter,
        key: GroupKey,
    ) -> StoreResult<Vec<GroupCount>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        match key {
            GroupKey::Attribute(path) => {
                qb.push("attributes #>> ").push_bind(json_path(path));
            }
            GroupKey::Parent => {
                qb.push("parent_id::text");
            }
        }
        qb.push(" AS key, COUNT(*) AS count FROM master_records");
        push_filter(&mut qb, filter);
        match key {
            GroupKey::Attribute(path) => {
                qb.push(" AND attributes #>> ")
                    .push_bind(json_path(path))
                    .push(" IS NOT NULL");
            }
            GroupKey::Parent => {
                qb.push(" AND parent_id IS NOT NULL");
            }
        }
        qb.push(" GROUP BY 1 ORDER BY count DESC, key ASC");

        let rows: Vec<(String, i64)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend(e, "Failed to aggregate master records"))?;

        Ok(rows
            .into_iter()
            .map(|(key, count)| GroupCount {
                key,
                count: count as u64,
            })
            .collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
