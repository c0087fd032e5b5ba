//! Property type accessors

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::accessors::{any_tag, enum_list, one_of, parse_enum, DISPLAY_SORT, POPULAR_SORT};
use super::master_data::{
    clean_tags, clean_text, normalize_with, KindSpec, MasterDataEngine, MasterResult,
    MasterStatistics,
};
use crate::api::Paginated;
use crate::domain::master::{MasterRecord, MasterType};
use crate::domain::property_types::{PropertyCategory, PropertyTypeAttributes, PropertyTypeFilter};
use crate::domain::query::MasterQuery;
use crate::store::{AttributeCondition, GroupCount, GroupKey, MasterStore, RecordFilter, SortField};

pub static PROPERTY_TYPE_SPEC: KindSpec = KindSpec {
    master_type: MasterType::PropertyType,
    searchable: &["description", "code", "tags"],
    sortable: &[
        ("popularityScore", SortField::Attribute("popularityScore")),
        ("category", SortField::Attribute("category")),
    ],
    parent: None,
    normalize: normalize_property_type,
};

fn normalize_property_type(attributes: Value) -> Result<Value, String> {
    normalize_with::<PropertyTypeAttributes, _>(attributes, |a| {
        clean_text(&mut a.description);
        clean_text(&mut a.code);
        clean_text(&mut a.icon);
        a.code = a.code.take().map(|c| c.to_uppercase());
        clean_tags(&mut a.tags);
        if a.popularity_score > 100 {
            return Err("popularityScore must be between 0 and 100".to_string());
        }
        Ok(())
    })
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTypeStatistics {
    #[serde(flatten)]
    pub base: MasterStatistics,
    pub by_category: Vec<GroupCount>,
}

#[derive(Clone)]
pub struct PropertyTypeService {
    engine: MasterDataEngine,
}

impl PropertyTypeService {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self {
            engine: MasterDataEngine::new(store, &PROPERTY_TYPE_SPEC),
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
        filter: &PropertyTypeFilter,
    ) -> MasterResult<Paginated<MasterRecord>> {
        let conditions = [
            one_of(
                "category",
                enum_list::<PropertyCategory>(filter.category.as_deref(), "category")?,
            ),
            any_tag("tags", filter.tags.as_deref()),
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
        self.engine.find_filtered(&filter, &POPULAR_SORT).await
    }

    pub async fn by_category(&self, category: &str) -> MasterResult<Vec<MasterRecord>> {
        let category: PropertyCategory = parse_enum(category, "category")?;
        self.in_category(category).await
    }

    pub async fn by_tag(&self, tag: &str) -> MasterResult<Vec<MasterRecord>> {
        let conditions = any_tag("tags", Some(tag)).into_iter().collect();
        self.engine.list_where(conditions, &DISPLAY_SORT).await
    }

    pub async fn residential(&self) -> MasterResult<Vec<MasterRecord>> {
        self.in_category(PropertyCategory::Residential).await
    }

    pub async fn commercial(&self) -> MasterResult<Vec<MasterRecord>> {
        self.in_category(PropertyCategory::Commercial).await
    }

    async fn in_category(&self, category: PropertyCategory) -> MasterResult<Vec<MasterRecord>> {
        let condition = AttributeCondition::Equals {
            path: "category",
            value: serde_json::json!(category),
        };
        self.engine.list_where(vec![condition], &DISPLAY_SORT).await
    }

    pub async fn statistics(&self) -> MasterResult<PropertyTypeStatistics> {
        Ok(PropertyTypeStatistics {
            base: self.engine.statistics().await?,
            by_category: self.engine.breakdown(GroupKey::Attribute("category")).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::master::CreateMasterRequest;
    use crate::store::MemoryMasterStore;
    use serde_json::json;

    async fn seeded() -> PropertyTypeService {
        let s = PropertyTypeService::new(Arc::new(MemoryMasterStore::new()));
        for (name, category, order, popular) in [
            ("Apartment", "residential", 1, true),
            ("Villa", "residential", 2, false),
            ("Office Space", "commercial", 1, true),
            ("Warehouse", "industrial", 1, false),
            ("Shop Cum Flat", "mixed-use", 1, false),
        ] {
            let input = CreateMasterRequest {
                name: name.to_string(),
                sort_order: Some(order),
                is_popular: Some(popular),
                attributes: Some(json!({ "category": category.replace('-', "_"), "tags": ["city"] })),
                ..Default::default()
            };
            s.engine().create(input, None).await.unwrap();
        }
        s
    }

    fn names(records: Vec<MasterRecord>) -> Vec<String> {
        records.into_iter().map(|r| r.name).collect()
    }

    #[tokio::test]
    async fn category_shortcuts_follow_display_order() {
        let s = seeded().await;
        assert_eq!(names(s.residential().await.unwrap()), ["Apartment", "Villa"]);
        assert_eq!(names(s.commercial().await.unwrap()), ["Office Space"]);
        assert_eq!(names(s.by_category("mixed-use").await.unwrap()), ["Shop Cum Flat"]);
        assert!(s.by_category("castle").await.is_err());
    }

    #[tokio::test]
    async fn popular_and_tag_accessors() {
        let s = seeded().await;
        let mut popular = names(s.popular().await.unwrap());
        popular.sort();
        assert_eq!(popular, ["Apartment", "Office Space"]);
        assert_eq!(s.by_tag("city").await.unwrap().len(), 5);
        assert!(s.by_tag("rural").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_filters_by_category_list() {
        let s = seeded().await;
        let filter = PropertyTypeFilter {
            category: Some("industrial,commercial".into()),
            ..Default::default()
        };
        let page = s.find_all(&MasterQuery::default(), &filter).await.unwrap();
        assert_eq!(page.pagination.total, 2);
    }

    #[tokio::test]
    async fn statistics_break_down_by_category() {
        let s = seeded().await;
        let stats = s.statistics().await.unwrap();
        assert_eq!(stats.base.total, 5);
        assert_eq!(stats.base.popular, 2);
        assert_eq!(
            stats.by_category[0],
            GroupCount {
                key: "residential".into(),
                count: 2
            }
        );
        assert_eq!(stats.by_category.len(), 4);
    }
}
