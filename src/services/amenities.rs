//! Amenity accessors

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::accessors::{any_tag, enum_list, flag, one_of, parse_enum, DISPLAY_SORT, POPULAR_SORT};
use super::master_data::{
    clean_tags, clean_text, normalize_with, KindSpec, MasterDataEngine, MasterResult,
    MasterStatistics,
};
use crate::api::Paginated;
use crate::domain::amenities::{
    AmenityAttributes, AmenityCategory, AmenityFilter, AvailabilityFlag, Importance,
};
use crate::domain::master::{MasterRecord, MasterType};
use crate::domain::query::MasterQuery;
use crate::store::{AttributeCondition, GroupCount, GroupKey, MasterStore, RecordFilter, SortField};

pub static AMENITY_SPEC: KindSpec = KindSpec {
    master_type: MasterType::Amenity,
    searchable: &["description", "code", "tags"],
    sortable: &[
        ("popularityScore", SortField::Attribute("popularityScore")),
        ("category", SortField::Attribute("category")),
        ("importance", SortField::Attribute("importance")),
    ],
    parent: None,
    normalize: normalize_amenity,
};

fn normalize_amenity(attributes: Value) -> Result<Value, String> {
    normalize_with::<AmenityAttributes, _>(attributes, |a| {
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
pub struct AmenityStatistics {
    #[serde(flatten)]
    pub base: MasterStatistics,
    pub by_category: Vec<GroupCount>,
    pub by_importance: Vec<GroupCount>,
    /// Non-archived amenities offered per segment
    pub availability: BTreeMap<String, u64>,
}

#[derive(Clone)]
pub struct AmenityService {
    engine: MasterDataEngine,
}

impl AmenityService {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self {
            engine: MasterDataEngine::new(store, &AMENITY_SPEC),
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
        filter: &AmenityFilter,
    ) -> MasterResult<Paginated<MasterRecord>> {
        let mut conditions: Vec<AttributeCondition> = [
            one_of(
                "category",
                enum_list::<AmenityCategory>(filter.category.as_deref(), "category")?,
            ),
            one_of(
                "importance",
                enum_list::<Importance>(filter.importance.as_deref(), "importance")?,
            ),
            any_tag("tags", filter.tags.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();

        conditions.extend(
            filter
                .flags()
                .into_iter()
                .map(|(segment, value)| flag(segment.path(), value)),
        );
        if let Some(min) = filter.min_popularity {
            conditions.push(AttributeCondition::Range {
                path: "popularityScore",
                min: Some(f64::from(min)),
                max: None,
            });
        }

        self.engine.find_all(query, conditions).await
    }

    /// Popular amenities, most popular first
    pub async fn popular(&self) -> MasterResult<Vec<MasterRecord>> {
        let filter = RecordFilter {
            is_popular: Some(true),
            ..self.engine.active_filter()
        };
        self.engine.find_filtered(&filter, &POPULAR_SORT).await
    }

    pub async fn by_category(&self, category: &str) -> MasterResult<Vec<MasterRecord>> {
        let category: AmenityCategory = parse_enum(category, "category")?;
        let condition = AttributeCondition::Equals {
            path: "category",
            value: serde_json::json!(category),
        };
        self.engine.list_where(vec![condition], &DISPLAY_SORT).await
    }

    pub async fn by_tag(&self, tag: &str) -> MasterResult<Vec<MasterRecord>> {
        let conditions = any_tag("tags", Some(tag)).into_iter().collect();
        self.engine.list_where(conditions, &DISPLAY_SORT).await
    }

    /// Amenities offered for one listing segment
    pub async fn by_availability(&self, segment: AvailabilityFlag) -> MasterResult<Vec<MasterRecord>> {
        self.engine
            .list_where(vec![flag(segment.path(), true)], &DISPLAY_SORT)
            .await
    }

    pub async fn statistics(&self) -> MasterResult<AmenityStatistics> {
        let base = self.engine.statistics().await?;
        let by_category = self.engine.breakdown(GroupKey::Attribute("category")).await?;
        let by_importance = self
            .engine
            .breakdown(GroupKey::Attribute("importance"))
            .await?;

        let mut availability = BTreeMap::new();
        for segment in AvailabilityFlag::ALL {
            let count = self.engine.count_where(flag(segment.path(), true)).await?;
            availability.insert(segment.as_str().to_string(), count);
        }

        Ok(AmenityStatistics {
            base,
            by_category,
            by_importance,
            availability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::master::{CreateMasterRequest, MasterStatus};
    use crate::services::master_data::MasterDataError;
    use crate::store::MemoryMasterStore;
    use serde_json::json;

    fn service() -> AmenityService {
        AmenityService::new(Arc::new(MemoryMasterStore::new()))
    }

    async fn add(service: &AmenityService, name: &str, attributes: Value) -> MasterRecord {
        add_with(service, name, attributes, |r| r).await
    }

    async fn add_with(
        service: &AmenityService,
        name: &str,
        attributes: Value,
        tweak: impl FnOnce(CreateMasterRequest) -> CreateMasterRequest,
    ) -> MasterRecord {
        let input = tweak(CreateMasterRequest {
            name: name.to_string(),
            attributes: Some(attributes),
            ..Default::default()
        });
        service.engine().create(input, None).await.unwrap()
    }

    #[tokio::test]
    async fn attributes_are_normalized_with_defaults() {
        let s = service();
        let gym = add(
            &s,
            "gym",
            json!({ "code": " gym01 ", "tags": ["Fitness", "fitness", " Indoor "], "description": "  " }),
        )
        .await;

        assert_eq!(
            gym.attributes,
            json!({
                "code": "GYM01",
                "category": "basic",
                "importance": "medium",
                "popularityScore": 0,
                "tags": ["fitness", "indoor"],
                "availability": { "residential": true, "commercial": false, "luxury": false, "basic": true }
            })
        );
    }

    #[tokio::test]
    async fn invalid_attributes_are_rejected() {
        let s = service();
        for bad in [
            json!({ "popularityScore": 101 }),
            json!({ "category": "spa" }),
            json!({ "colour": "blue" }),
            json!("not an object"),
        ] {
            let input = CreateMasterRequest {
                name: "Gym".into(),
                attributes: Some(bad),
                ..Default::default()
            };
            assert!(matches!(
                s.engine().create(input, None).await,
                Err(MasterDataError::BadRequest(_))
            ));
        }
    }

    #[tokio::test]
    async fn find_all_applies_amenity_filters() {
        let s = service();
        add(&s, "Pool", json!({ "category": "recreational", "tags": ["water"], "popularityScore": 90 })).await;
        add(&s, "Cctv", json!({ "category": "security", "importance": "essential" })).await;
        add(
            &s,
            "Spa",
            json!({ "category": "wellness", "tags": ["water", "luxury"], "availability": { "luxury": true } }),
        )
        .await;

        let names = |page: Paginated<MasterRecord>| {
            let mut n: Vec<_> = page.data.into_iter().map(|r| r.name).collect();
            n.sort();
            n
        };
        let query = MasterQuery::default();

        let filter = AmenityFilter {
            category: Some("recreational,wellness".into()),
            ..Default::default()
        };
        assert_eq!(names(s.find_all(&query, &filter).await.unwrap()), ["Pool", "Spa"]);

        let filter = AmenityFilter {
            tags: Some("water".into()),
            luxury: Some(true),
            ..Default::default()
        };
        assert_eq!(names(s.find_all(&query, &filter).await.unwrap()), ["Spa"]);

        let filter = AmenityFilter {
            min_popularity: Some(50),
            ..Default::default()
        };
        assert_eq!(names(s.find_all(&query, &filter).await.unwrap()), ["Pool"]);

        let filter = AmenityFilter {
            importance: Some("critical".into()),
            ..Default::default()
        };
        assert!(s.find_all(&query, &filter).await.is_err());
    }

    #[tokio::test]
    async fn popular_orders_by_score_then_sort_order() {
        let s = service();
        let popular = |r: CreateMasterRequest| CreateMasterRequest {
            is_popular: Some(true),
            ..r
        };
        add_with(&s, "Garden", json!({ "popularityScore": 40 }), popular).await;
        add_with(&s, "Pool", json!({ "popularityScore": 90 }), popular).await;
        add_with(&s, "Gym", json!({ "popularityScore": 90 }), |r| CreateMasterRequest {
            sort_order: Some(1),
            ..popular(r)
        })
        .await;
        add(&s, "Lift", json!({ "popularityScore": 99 })).await;

        let names: Vec<_> = s.popular().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Pool", "Gym", "Garden"]);
    }

    #[tokio::test]
    async fn accessors_skip_archived_records() {
        let s = service();
        add(&s, "Pool", json!({ "category": "sports", "tags": ["water"] })).await;
        add_with(&s, "Old Court", json!({ "category": "sports", "tags": ["water"] }), |r| {
            CreateMasterRequest {
                status: Some(MasterStatus::Archived),
                ..r
            }
        })
        .await;

        let by_category = s.by_category("Sports").await.unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].name, "Pool");

        let by_tag = s.by_tag("WATER").await.unwrap();
        assert_eq!(by_tag.len(), 1);

        let residential = s.by_availability(AvailabilityFlag::Residential).await.unwrap();
        assert_eq!(residential.len(), 1);
        assert!(s
            .by_availability(AvailabilityFlag::Luxury)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn statistics_merge_breakdowns() {
        let s = service();
        add(&s, "Pool", json!({ "category": "sports" })).await;
        add(&s, "Court", json!({ "category": "sports", "importance": "high" })).await;
        add(
            &s,
            "Lounge",
            json!({ "category": "recreational", "availability": { "commercial": true, "residential": false } }),
        )
        .await;

        let stats = s.statistics().await.unwrap();
        assert_eq!(stats.base.total, 3);
        assert_eq!(stats.base.active, 3);
        assert_eq!(
            stats.by_category,
            vec![
                GroupCount {
                    key: "sports".into(),
                    count: 2
                },
                GroupCount {
                    key: "recreational".into(),
                    count: 1
                },
            ]
        );
        assert_eq!(stats.by_importance[0], GroupCount { key: "medium".into(), count: 2 });
        assert_eq!(stats.availability["residential"], 2);
        assert_eq!(stats.availability["commercial"], 1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total"], 3);
        assert!(json["byCategory"].is_array());
    }
}
