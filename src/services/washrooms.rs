//! Washroom accessors

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::accessors::{enum_list, one_of, parse_enum, range, DISPLAY_SORT, VALUE_SORT};
use super::master_data::{
    clean_text, normalize_with, KindSpec, MasterDataEngine, MasterResult, MasterStatistics,
};
use crate::api::Paginated;
use crate::domain::master::{MasterRecord, MasterType};
use crate::domain::query::{MasterQuery, RangeQuery};
use crate::domain::rooms::{MAX_ROOM_COUNT, MIN_ROOM_COUNT};
use crate::domain::washrooms::{WashroomAttributes, WashroomFilter, WashroomType};
use crate::store::{AttributeCondition, GroupCount, GroupKey, MasterStore, SortField};

pub static WASHROOM_SPEC: KindSpec = KindSpec {
    master_type: MasterType::Washroom,
    searchable: &["description", "code"],
    sortable: &[
        ("value", SortField::Attribute("value")),
        ("washroomType", SortField::Attribute("washroomType")),
    ],
    parent: None,
    normalize: normalize_washroom,
};

fn normalize_washroom(attributes: Value) -> Result<Value, String> {
    normalize_with::<WashroomAttributes, _>(attributes, |a| {
        clean_text(&mut a.description);
        clean_text(&mut a.code);
        a.code = a.code.take().map(|c| c.to_uppercase());
        if !(MIN_ROOM_COUNT..=MAX_ROOM_COUNT).contains(&a.value) {
            return Err(format!(
                "value must be between {} and {}",
                MIN_ROOM_COUNT, MAX_ROOM_COUNT
            ));
        }
        Ok(())
    })
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WashroomStatistics {
    #[serde(flatten)]
    pub base: MasterStatistics,
    pub by_type: Vec<GroupCount>,
}

#[derive(Clone)]
pub struct WashroomService {
    engine: MasterDataEngine,
}

impl WashroomService {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self {
            engine: MasterDataEngine::new(store, &WASHROOM_SPEC),
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
        filter: &WashroomFilter,
        bounds: &RangeQuery,
    ) -> MasterResult<Paginated<MasterRecord>> {
        let conditions = [
            one_of(
                "washroomType",
                enum_list::<WashroomType>(filter.washroom_type.as_deref(), "washroomType")?,
            ),
            range("value", bounds)?,
        ]
        .into_iter()
        .flatten()
        .collect();

        self.engine.find_all(query, conditions).await
    }

    pub async fn by_type(&self, washroom_type: &str) -> MasterResult<Vec<MasterRecord>> {
        let washroom_type: WashroomType = parse_enum(washroom_type, "washroomType")?;
        let condition = AttributeCondition::Equals {
            path: "washroomType",
            value: serde_json::json!(washroom_type),
        };
        self.engine.list_where(vec![condition], &DISPLAY_SORT).await
    }

    /// Active options whose count falls within the bounds, smallest first
    pub async fn in_range(&self, bounds: &RangeQuery) -> MasterResult<Vec<MasterRecord>> {
        let conditions = range("value", bounds)?.into_iter().collect();
        self.engine.list_where(conditions, &VALUE_SORT).await
    }

    pub async fn statistics(&self) -> MasterResult<WashroomStatistics> {
        Ok(WashroomStatistics {
            base: self.engine.statistics().await?,
            by_type: self
                .engine
                .breakdown(GroupKey::Attribute("washroomType"))
                .await?,
        })
    }
}
