//! Persistence for master data
//!
//! The engine talks to storage only through [`MasterStore`], so the in-memory
//! backend used for development and tests and the PostgreSQL backend are
//! interchangeable.

pub mod filter;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::master::{MasterRecord, MasterType};

pub use filter::{
    AttributeCondition, GroupCount, GroupKey, RecordFilter, SearchClause, SortDirection,
    SortField, SortKey, Window,
};
pub use memory::MemoryMasterStore;
pub use postgres::PgMasterStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The `(master_type, name)` unique constraint rejected the write
    #[error("duplicate name '{name}' for {master_type}")]
    Duplicate {
        master_type: MasterType,
        name: String,
    },

    /// Another record still points at this one through `parent_id`
    #[error("record {0} is referenced by other records")]
    Referenced(Uuid),

    #[error("record {0} not found")]
    NotFound(Uuid),

    /// The record names a parent that does not exist
    #[error("parent record {0} not found")]
    MissingParent(Uuid),

    #[error("storage backend error")]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document-store operations the master data engine depends on
#[async_trait]
pub trait MasterStore: Send + Sync {
    /// Insert a new record, enforcing per-type name uniqueness
    async fn insert(&self, record: &MasterRecord) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<MasterRecord>>;

    async fn find_by_name(
        &self,
        master_type: MasterType,
        name_key: &str,
    ) -> StoreResult<Option<MasterRecord>>;

    /// Overwrite an existing record, enforcing name uniqueness
    async fn replace(&self, record: &MasterRecord) -> StoreResult<()>;

    /// Hard delete. Fails with `Referenced` while children exist.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    async fn find(
        &self,
        filter: &RecordFilter,
        sort: &[SortKey],
        window: Option<Window>,
    ) -> StoreResult<Vec<MasterRecord>>;

    async fn count(&self, filter: &RecordFilter) -> StoreResult<u64>;

    async fn count_children(&self, parent_id: Uuid) -> StoreResult<u64>;

    /// Group matching records on a key and count each bucket, largest first
    async fn group_count(&self, filter: &RecordFilter, key: GroupKey)
        -> StoreResult<Vec<GroupCount>>;

    async fn health_check(&self) -> StoreResult<()>;
}
