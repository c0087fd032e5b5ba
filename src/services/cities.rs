//! City accessors

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::accessors::DISPLAY_SORT;
use super::master_data::{
    clean_text, normalize_with, KindSpec, MasterDataEngine, MasterResult, MasterStatistics,
};
use crate::api::Paginated;
use crate::domain::cities::{CityAttributes, CityFilter};
use crate::domain::master::{normalize_name, MasterRecord, MasterType};
use crate::domain::query::MasterQuery;
use crate::store::{AttributeCondition, GroupCount, GroupKey, MasterStore, RecordFilter, SortField};

pub static CITY_SPEC: KindSpec = KindSpec {
    master_type: MasterType::City,
    searchable: &["description", "code", "state"],
    sortable: &[
        ("state", SortField::Attribute("state")),
        ("country", SortField::Attribute("country")),
    ],
    parent: None,
    normalize: normalize_city,
};

fn normalize_city(attributes: Value) -> Result<Value, String> {
    normalize_with::<CityAttributes, _>(attributes, |a| {
        clean_text(&mut a.description);
        clean_text(&mut a.code);
        a.code = a.code.take().map(|c| c.to_uppercase());
        a.state = normalize_name(&a.state);
        if a.state.is_empty() {
            return Err("state is required".to_string());
        }
        a.country = normalize_name(&a.country);
        if a.country.is_empty() {
            a.country = CityAttributes::default().country;
        }
        Ok(())
    })
}

/// Exact match on a title-cased attribute, or nothing for a blank value
fn named(path: &'static str, raw: Option<&str>) -> Option<AttributeCondition> {
    let value = normalize_name(raw?);
    (!value.is_empty()).then(|| AttributeCondition::Equals {
        path,
        value: json!(value),
    })
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CityStatistics {
    #[serde(flatten)]
    pub base: MasterStatistics,
    pub by_state: Vec<GroupCount>,
}

#[derive(Clone)]
pub struct CityService {
    engine: MasterDataEngine,
}

impl CityService {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self {
            engine: MasterDataEngine::new(store, &CITY_SPEC),
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
        filter: &CityFilter,
    ) -> MasterResult<Paginated<MasterRecord>> {
        let conditions = [
            named("state", filter.state.as_deref()),
            named("country", filter.country.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();

        self.engine.find_all(query, conditions).await
    }

    pub async fn popular(&self) -> MasterResult<Vec<MasterRecord>> {
        let filter = RecordFilter {
            is_popular: Some(true),
            ..self.engine.active_filter()
        };
        self.engine.find_filtered(&filter, &DISPLAY_SORT).await
    }

    pub async fn by_state(&self, state: &str) -> MasterResult<Vec<MasterRecord>> {
        let conditions = named("state", Some(state)).into_iter().collect();
        self.engine.list_where(conditions, &DISPLAY_SORT).await
    }

    pub async fn statistics(&self) -> MasterResult<CityStatistics> {
        Ok(CityStatistics {
            base: self.engine.statistics().await?,
            by_state: self.engine.breakdown(GroupKey::Attribute("state")).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::master::{CreateMasterRequest, MasterStatus, UpdateMasterRequest};
    use crate::services::master_data::MasterDataError;
    use crate::store::MemoryMasterStore;

    async fn add(s: &CityService, name: &str, state: &str, popular: bool) -> MasterRecord {
        let input = CreateMasterRequest {
            name: name.to_string(),
            is_popular: Some(popular),
            attributes: Some(json!({ "state": state })),
            ..Default::default()
        };
        s.engine().create(input, None).await.unwrap()
    }

    #[tokio::test]
    async fn state_is_required_and_title_cased() {
        let s = CityService::new(Arc::new(MemoryMasterStore::new()));
        let missing = CreateMasterRequest {
            name: "Pune".into(),
            ..Default::default()
        };
        assert!(matches!(
            s.engine().create(missing, None).await,
            Err(MasterDataError::BadRequest(_))
        ));

        let pune = add(&s, "pune", "  maharashtra ", false).await;
        assert_eq!(pune.attributes["state"], "Maharashtra");
        assert_eq!(pune.attributes["country"], "India");
    }

    #[tokio::test]
    async fn by_state_ignores_case_and_inactive_records() {
        let s = CityService::new(Arc::new(MemoryMasterStore::new()));
        add(&s, "Pune", "Maharashtra", true).await;
        let nagpur = add(&s, "Nagpur", "Maharashtra", false).await;
        add(&s, "Bengaluru", "Karnataka", true).await;

        let change = UpdateMasterRequest {
            status: Some(MasterStatus::Inactive),
            ..Default::default()
        };
        s.engine()
            .update(&nagpur.id.to_string(), change, None)
            .await
            .unwrap();

        let names: Vec<_> = s
            .by_state("MAHARASHTRA")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Pune"]);

        let filter = CityFilter {
            state: Some("maharashtra".into()),
            country: None,
        };
        let page = s.find_all(&MasterQuery::default(), &filter).await.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(s.popular().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn statistics_break_down_by_state() {
        let s = CityService::new(Arc::new(MemoryMasterStore::new()));
        add(&s, "Pune", "Maharashtra", true).await;
        add(&s, "Mumbai", "Maharashtra", true).await;
        add(&s, "Mysuru", "Karnataka", false).await;

        let stats = s.statistics().await.unwrap();
        assert_eq!(stats.base.popular, 2);
        assert_eq!(
            stats.by_state,
            vec![
                GroupCount {
                    key: "Maharashtra".into(),
                    count: 2
                },
                GroupCount {
                    key: "Karnataka".into(),
                    count: 1
                },
            ]
        );
    }
}
