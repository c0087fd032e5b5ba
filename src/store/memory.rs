//! In-process master store
//!
//! Used when no `DATABASE_URL` is configured and by the test suite. The name
//! and parent indexes are maintained under the same write lock as the records,
//! so uniqueness, parent existence and the child check hold under concurrent
//! requests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use super::filter::{compare, value_text, GroupCount, GroupKey, RecordFilter, SortKey, Window};
use super::{MasterStore, StoreError, StoreResult};
use crate::domain::master::{MasterRecord, MasterType};

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, MasterRecord>,
    names: HashMap<(MasterType, String), Uuid>,
    children: HashMap<Uuid, HashSet<Uuid>>,
}

impl Inner {
    fn claim_name(&self, record: &MasterRecord) -> StoreResult<(MasterType, String)> {
        let key = (record.master_type, record.name_key());
        match self.names.get(&key) {
            Some(owner) if *owner != record.id => Err(StoreError::Duplicate {
                master_type: record.master_type,
                name: record.name.clone(),
            }),
            _ => Ok(key),
        }
    }

    fn ensure_parent(&self, record: &MasterRecord) -> StoreResult<()> {
        match record.parent_id {
            Some(parent) if !self.records.contains_key(&parent) => {
                Err(StoreError::MissingParent(parent))
            }
            _ => Ok(()),
        }
    }

    fn link_parent(&mut self, record: &MasterRecord) {
        if let Some(parent) = record.parent_id {
            self.children.entry(parent).or_default().insert(record.id);
        }
    }

    fn unlink_parent(&mut self, record: &MasterRecord) {
        if let Some(parent) = record.parent_id {
            if let Some(set) = self.children.get_mut(&parent) {
                set.remove(&record.id);
                if set.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
    }
}

/// Master store backed by hash maps behind a `parking_lot::RwLock`
#[derive(Default)]
pub struct MemoryMasterStore {
    inner: RwLock<Inner>,
}

impl MemoryMasterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MasterStore for MemoryMasterStore {
    async fn insert(&self, record: &MasterRecord) -> StoreResult<()> {
        let mut inner = self.inner.write();
        inner.ensure_parent(record)?;
        let key = inner.claim_name(record)?;
        inner.names.insert(key, record.id);
        inner.link_parent(record);
        inner.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<MasterRecord>> {
        Ok(self.inner.read().records.get(&id).cloned())
    }

    async fn find_by_name(
        &self,
        master_type: MasterType,
        name_key: &str,
    ) -> StoreResult<Option<MasterRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .names
            .get(&(master_type, name_key.to_string()))
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn replace(&self, record: &MasterRecord) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let previous = inner
            .records
            .get(&record.id)
            .cloned()
            .ok_or(StoreError::NotFound(record.id))?;
        inner.ensure_parent(record)?;
        let key = inner.claim_name(record)?;

        inner.names.remove(&(previous.master_type, previous.name_key()));
        inner.names.insert(key, record.id);
        inner.unlink_parent(&previous);
        inner.link_parent(record);
        inner.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write();
        if inner.children.get(&id).is_some_and(|set| !set.is_empty()) {
            return Err(StoreError::Referenced(id));
        }
        let record = inner.records.remove(&id).ok_or(StoreError::NotFound(id))?;
        inner.names.remove(&(record.master_type, record.name_key()));
        inner.unlink_parent(&record);
        Ok(())
    }

    async fn find(
        &self,
        filter: &RecordFilter,
        sort: &[SortKey],
        window: Option<Window>,
    ) -> StoreResult<Vec<MasterRecord>> {
        let inner = self.inner.read();
        let mut matched: Vec<&MasterRecord> = inner
            .records
            .values()
            .filter(|r| filter.matches(r))
            .collect();
        matched.sort_by(|a, b| compare(a, b, sort));

        let iter = matched.into_iter().cloned();
        Ok(match window {
            Some(w) => iter
                .skip(w.offset as usize)
                .take(w.limit as usize)
                .collect(),
            None => iter.collect(),
        })
    }

    async fn count(&self, filter: &RecordFilter) -> StoreResult<u64> {
        let inner = self.inner.read();
        Ok(inner.records.values().filter(|r| filter.matches(r)).count() as u64)
    }

    async fn count_children(&self, parent_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .inner
            .read()
            .children
            .get(&parent_id)
            .map_or(0, |set| set.len() as u64))
    }

    async fn group_count(
        &self,
        filter: &RecordFilter,
        key: GroupKey,
    ) -> StoreResult<Vec<GroupCount>> {
        let inner = self.inner.read();
        let mut buckets: BTreeMap<String, u64> = BTreeMap::new();

        for record in inner.records.values().filter(|r| filter.matches(r)) {
            let bucket = match key {
                GroupKey::Attribute(path) => record
                    .attribute(path)
                    .filter(|v| !v.is_null())
                    .map(value_text),
                GroupKey::Parent => record.parent_id.map(|p| p.to_string()),
            };
            if let Some(bucket) = bucket {
                *buckets.entry(bucket).or_default() += 1;
            }
        }

        let mut groups: Vec<GroupCount> = buckets
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect();
        groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        Ok(groups)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
