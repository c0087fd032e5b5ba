//! Bedroom and bathroom count accessors
//!
//! Both kinds are numeric options that differ only in their payload, so they
//! share [`RoomCountService`] and are told apart by their [`KindSpec`].

use serde::Serialize;
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::accessors::{range, VALUE_SORT};
use super::master_data::{
    clean_text, normalize_with, KindSpec, MasterDataEngine, MasterResult, MasterStatistics,
};
use crate::api::Paginated;
use crate::domain::master::{MasterRecord, MasterType};
use crate::domain::query::{MasterQuery, RangeQuery};
use crate::domain::rooms::{
    BathroomAttributes, BedroomAttributes, RoomFilter, MAX_ROOM_COUNT, MIN_ROOM_COUNT,
};
use crate::store::{AttributeCondition, GroupCount, GroupKey, MasterStore, SortField};

pub static BEDROOM_SPEC: KindSpec = KindSpec {
    master_type: MasterType::Bedroom,
    searchable: &["description", "code", "unit"],
    sortable: &[("value", SortField::Attribute("value"))],
    parent: None,
    normalize: normalize_bedroom,
};

pub static BATHROOM_SPEC: KindSpec = KindSpec {
    master_type: MasterType::Bathroom,
    searchable: &["description", "code"],
    sortable: &[("value", SortField::Attribute("value"))],
    parent: None,
    normalize: normalize_bathroom,
};

fn check_count(value: u32) -> Result<(), String> {
    if (MIN_ROOM_COUNT..=MAX_ROOM_COUNT).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "value must be between {} and {}",
            MIN_ROOM_COUNT, MAX_ROOM_COUNT
        ))
    }
}

fn normalize_bedroom(attributes: Value) -> Result<Value, String> {
    normalize_with::<BedroomAttributes, _>(attributes, |a| {
        clean_text(&mut a.description);
        clean_text(&mut a.code);
        a.unit = a.unit.trim().to_uppercase();
        if a.unit.is_empty() {
            return Err("unit must not be empty".to_string());
        }
        check_count(a.value)
    })
}

fn normalize_bathroom(attributes: Value) -> Result<Value, String> {
    normalize_with::<BathroomAttributes, _>(attributes, |a| {
        clean_text(&mut a.description);
        clean_text(&mut a.code);
        check_count(a.value)
    })
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatistics {
    #[serde(flatten)]
    pub base: MasterStatistics,
    pub by_value: Vec<GroupCount>,
}

#[derive(Clone)]
pub struct RoomCountService {
    engine: MasterDataEngine,
}

impl RoomCountService {
    fn new(store: Arc<dyn MasterStore>, spec: &'static KindSpec) -> Self {
        Self {
            engine: MasterDataEngine::new(store, spec),
        }
    }

    pub fn engine(&self) -> &MasterDataEngine {
        &self.engine
    }

    pub(super) fn engine_mut(&mut self) -> &mut MasterDataEngine {
        &mut self.engine
    }

    pub async fn find_all(
        &self,
        query: &MasterQuery,
        filter: &RoomFilter,
        bounds: &RangeQuery,
    ) -> MasterResult<Paginated<MasterRecord>> {
        let mut conditions: Vec<AttributeCondition> = range("value", bounds)?.into_iter().collect();

        let unit = filter
            .unit
            .as_deref()
            .map(|u| u.trim().to_uppercase())
            .filter(|u| !u.is_empty());
        if let (MasterType::Bedroom, Some(unit)) = (self.engine.master_type(), unit) {
            conditions.push(AttributeCondition::OneOf {
                path: "unit",
                values: vec![unit],
            });
        }

        self.engine.find_all(query, conditions).await
    }

    /// Active options whose count falls within the bounds, smallest first
    pub async fn in_range(&self, bounds: &RangeQuery) -> MasterResult<Vec<MasterRecord>> {
        let conditions = range("value", bounds)?.into_iter().collect();
        self.engine.list_where(conditions, &VALUE_SORT).await
    }

    pub async fn statistics(&self) -> MasterResult<RoomStatistics> {
        Ok(RoomStatistics {
            base: self.engine.statistics().await?,
            by_value: self.engine.breakdown(GroupKey::Attribute("value")).await?,
        })
    }
}

#[derive(Clone)]
pub struct BedroomService(RoomCountService);

impl BedroomService {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self(RoomCountService::new(store, &BEDROOM_SPEC))
    }
}

impl Deref for BedroomService {
    type Target = RoomCountService;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for BedroomService {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[derive(Clone)]
pub struct BathroomService(RoomCountService);

impl BathroomService {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self(RoomCountService::new(store, &BATHROOM_SPEC))
    }
}

impl Deref for BathroomService {
    type Target = RoomCountService;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for BathroomService {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::master::CreateMasterRequest;
    use crate::store::MemoryMasterStore;
    use serde_json::json;

    async fn add(engine: &MasterDataEngine, name: &str, attributes: Value) -> MasterRecord {
        let input = CreateMasterRequest {
            name: name.to_string(),
            attributes: Some(attributes),
            ..Default::default()
        };
        engine.create(input, None).await.unwrap()
    }

    #[tokio::test]
    async fn bedroom_unit_is_upper_cased_and_filterable() {
        let store: Arc<dyn MasterStore> = Arc::new(MemoryMasterStore::new());
        let bedrooms = BedroomService::new(store);
        let studio = add(bedrooms.engine(), "1 rk", json!({ "value": 1, "unit": " rk " })).await;
        add(bedrooms.engine(), "1 bhk", json!({ "value": 1 })).await;
        add(bedrooms.engine(), "2 bhk", json!({ "value": 2 })).await;

        assert_eq!(studio.name, "1 Rk");
        assert_eq!(studio.attributes["unit"], "RK");

        let filter = RoomFilter {
            unit: Some("bhk".into()),
        };
        let page = bedrooms
            .find_all(&MasterQuery::default(), &filter, &RangeQuery::default())
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
    }

    #[tokio::test]
    async fn bedrooms_and_bathrooms_share_a_store_but_not_names() {
        let store: Arc<dyn MasterStore> = Arc::new(MemoryMasterStore::new());
        let bedrooms = BedroomService::new(store.clone());
        let bathrooms = BathroomService::new(store);

        add(bedrooms.engine(), "Two", json!({ "value": 2 })).await;
        add(bathrooms.engine(), "Two", json!({ "value": 2 })).await;

        assert_eq!(bedrooms.statistics().await.unwrap().base.total, 1);
        assert_eq!(bathrooms.statistics().await.unwrap().base.total, 1);
    }

    #[tokio::test]
    async fn in_range_and_value_histogram() {
        let store: Arc<dyn MasterStore> = Arc::new(MemoryMasterStore::new());
        let bathrooms = BathroomService::new(store);
        for (name, value) in [("Four", 4), ("One", 1), ("Three", 3), ("Two", 2)] {
            add(bathrooms.engine(), name, json!({ "value": value })).await;
        }

        let bounds = RangeQuery {
            min_value: Some(2.0),
            max_value: Some(3.0),
        };
        let names: Vec<_> = bathrooms
            .in_range(&bounds)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Two", "Three"]);

        let stats = bathrooms.statistics().await.unwrap();
        assert_eq!(stats.by_value.len(), 4);
        assert!(stats.by_value.iter().all(|g| g.count == 1));
    }

    #[tokio::test]
    async fn out_of_range_counts_are_rejected() {
        let bathrooms = BathroomService::new(Arc::new(MemoryMasterStore::new()));
        let input = CreateMasterRequest {
            name: "Lots".into(),
            attributes: Some(json!({ "value": 50 })),
            ..Default::default()
        };
        assert!(bathrooms.engine().create(input, None).await.is_err());
    }
}
