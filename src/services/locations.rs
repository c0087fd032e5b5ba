//! Location accessors
//!
//! Locations hang off cities through `parentId`; the city engine is used to
//! resolve parents for scoping and statistics.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::accessors::DISPLAY_SORT;
use super::cities::CITY_SPEC;
use super::master_data::{
    clean_text, normalize_with, KindSpec, MasterDataEngine, MasterDataError, MasterResult,
    MasterStatistics, ParentRule,
};
use crate::api::Paginated;
use crate::domain::locations::{LocationAttributes, LocationFilter};
use crate::domain::master::{MasterRecord, MasterType};
use crate::domain::query::MasterQuery;
use crate::store::{AttributeCondition, GroupKey, MasterStore, RecordFilter};

pub static LOCATION_SPEC: KindSpec = KindSpec {
    master_type: MasterType::Location,
    searchable: &["description", "pincode"],
    sortable: &[],
    parent: Some(ParentRule {
        master_type: MasterType::City,
        required: true,
    }),
    normalize: normalize_location,
};

fn normalize_location(attributes: Value) -> Result<Value, String> {
    normalize_with::<LocationAttributes, _>(attributes, |a| {
        clean_text(&mut a.description);
        clean_text(&mut a.pincode);
        if let Some(pincode) = a.pincode.as_deref() {
            if !is_pincode(pincode) {
                return Err("pincode must be exactly 6 digits".to_string());
            }
        }
        if let Some(lat) = a.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err("latitude must be between -90 and 90".to_string());
            }
        }
        if let Some(lng) = a.longitude {
            if !(-180.0..=180.0).contains(&lng) {
                return Err("longitude must be between -180 and 180".to_string());
            }
        }
        Ok(())
    })
}

fn is_pincode(raw: &str) -> bool {
    raw.len() == 6 && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Non-archived locations under one city
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CityLocationCount {
    pub city_id: String,
    /// `None` when the parent could not be resolved
    pub city_name: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatistics {
    #[serde(flatten)]
    pub base: MasterStatistics,
    pub by_city: Vec<CityLocationCount>,
}

#[derive(Clone)]
pub struct LocationService {
    engine: MasterDataEngine,
    cities: MasterDataEngine,
}

impl LocationService {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self {
            cities: MasterDataEngine::new(store.clone(), &CITY_SPEC),
            engine: MasterDataEngine::new(store, &LOCATION_SPEC),
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
        filter: &LocationFilter,
    ) -> MasterResult<Paginated<MasterRecord>> {
        let mut query = query.clone();
        if filter.city_id.is_some() {
            query.parent_id = filter.city_id;
        }

        let conditions = filter
            .pincode
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|pincode| AttributeCondition::Equals {
                path: "pincode",
                value: json!(pincode),
            })
            .into_iter()
            .collect();

        self.engine.find_all(&query, conditions).await
    }

    /// Active locations of an existing city
    pub async fn by_city(&self, city_id: &str) -> MasterResult<Vec<MasterRecord>> {
        let city = self.cities.find_by_id(city_id).await?;
        let filter = RecordFilter {
            parent_id: Some(city.id),
            ..self.engine.active_filter()
        };
        self.engine.find_filtered(&filter, &DISPLAY_SORT).await
    }

    pub async fn popular(&self) -> MasterResult<Vec<MasterRecord>> {
        let filter = RecordFilter {
            is_popular: Some(true),
            ..self.engine.active_filter()
        };
        self.engine.find_filtered(&filter, &DISPLAY_SORT).await
    }

    pub async fn statistics(&self) -> MasterResult<LocationStatistics> {
        let base = self.engine.statistics().await?;
        let groups = self.engine.breakdown(GroupKey::Parent).await?;

        let mut by_city = Vec::with_capacity(groups.len());
        for group in groups {
            let city_name = match self.cities.find_by_id(&group.key).await {
                Ok(city) => Some(city.name),
                Err(MasterDataError::NotFound(_)) => None,
                Err(e) => return Err(e),
            };
            by_city.push(CityLocationCount {
                city_id: group.key,
                city_name,
                count: group.count,
            });
        }

        Ok(LocationStatistics { base, by_city })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::master::CreateMasterRequest;
    use crate::services::cities::CityService;
    use crate::store::MemoryMasterStore;
    use uuid::Uuid;

    struct Fixture {
        cities: CityService,
        locations: LocationService,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn MasterStore> = Arc::new(MemoryMasterStore::new());
        Fixture {
            cities: CityService::new(store.clone()),
            locations: LocationService::new(store),
        }
    }

    async fn city(f: &Fixture, name: &str) -> MasterRecord {
        let input = CreateMasterRequest {
            name: name.to_string(),
            attributes: Some(json!({ "state": "Maharashtra" })),
            ..Default::default()
        };
        f.cities.engine().create(input, None).await.unwrap()
    }

    async fn location(f: &Fixture, name: &str, city: &MasterRecord, attrs: Value) -> MasterRecord {
        let input = CreateMasterRequest {
            name: name.to_string(),
            parent_id: Some(city.id),
            attributes: Some(attrs),
            ..Default::default()
        };
        f.locations.engine().create(input, None).await.unwrap()
    }

    #[tokio::test]
    async fn location_requires_an_existing_city() {
        let f = fixture();
        let orphan = CreateMasterRequest {
            name: "Baner".into(),
            ..Default::default()
        };
        assert!(matches!(
            f.locations.engine().create(orphan, None).await,
            Err(MasterDataError::BadRequest(_))
        ));

        let dangling = CreateMasterRequest {
            name: "Baner".into(),
            parent_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(f.locations.engine().create(dangling, None).await.is_err());
    }

    #[tokio::test]
    async fn attributes_are_range_checked() {
        let f = fixture();
        let pune = city(&f, "Pune").await;
        for bad in [
            json!({ "pincode": "41104" }),
            json!({ "pincode": "4110a5" }),
            json!({ "latitude": 91.0 }),
            json!({ "longitude": -180.5 }),
        ] {
            let input = CreateMasterRequest {
                name: "Baner".into(),
                parent_id: Some(pune.id),
                attributes: Some(bad),
                ..Default::default()
            };
            assert!(f.locations.engine().create(input, None).await.is_err());
        }

        let ok = location(
            &f,
            "Baner",
            &pune,
            json!({ "pincode": " 411045 ", "latitude": 18.56, "longitude": 73.78 }),
        )
        .await;
        assert_eq!(ok.attributes["pincode"], "411045");
    }

    #[tokio::test]
    async fn by_city_scopes_to_parent() {
        let f = fixture();
        let pune = city(&f, "Pune").await;
        let mumbai = city(&f, "Mumbai").await;
        location(&f, "Baner", &pune, json!({})).await;
        location(&f, "Aundh", &pune, json!({})).await;
        location(&f, "Bandra", &mumbai, json!({})).await;

        let names: Vec<_> = f
            .locations
            .by_city(&pune.id.to_string())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Aundh", "Baner"]);

        assert!(matches!(
            f.locations.by_city(&Uuid::new_v4().to_string()).await,
            Err(MasterDataError::NotFound(_))
        ));
        assert!(matches!(
            f.locations.by_city("not-a-uuid").await,
            Err(MasterDataError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn find_all_filters_by_city_and_pincode() {
        let f = fixture();
        let pune = city(&f, "Pune").await;
        let mumbai = city(&f, "Mumbai").await;
        location(&f, "Baner", &pune, json!({ "pincode": "411045" })).await;
        location(&f, "Aundh", &pune, json!({ "pincode": "411007" })).await;
        location(&f, "Bandra", &mumbai, json!({ "pincode": "400050" })).await;

        let by_city = LocationFilter {
            city_id: Some(pune.id),
            pincode: None,
        };
        let page = f
            .locations
            .find_all(&MasterQuery::default(), &by_city)
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);

        let by_pincode = LocationFilter {
            city_id: None,
            pincode: Some("400050".into()),
        };
        let page = f
            .locations
            .find_all(&MasterQuery::default(), &by_pincode)
            .await
            .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].name, "Bandra");
    }

    #[tokio::test]
    async fn city_with_locations_cannot_be_removed() {
        let f = fixture();
        let pune = city(&f, "Pune").await;
        let baner = location(&f, "Baner", &pune, json!({})).await;

        assert!(matches!(
            f.cities.engine().remove(&pune.id.to_string()).await,
            Err(MasterDataError::BadRequest(_))
        ));
        f.locations
            .engine()
            .remove(&baner.id.to_string())
            .await
            .unwrap();
        f.cities
            .engine()
            .remove(&pune.id.to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn statistics_name_each_city() {
        let f = fixture();
        let pune = city(&f, "Pune").await;
        let mumbai = city(&f, "Mumbai").await;
        location(&f, "Baner", &pune, json!({})).await;
        location(&f, "Aundh", &pune, json!({})).await;
        location(&f, "Bandra", &mumbai, json!({})).await;

        let stats = f.locations.statistics().await.unwrap();
        assert_eq!(stats.base.total, 3);
        assert_eq!(
            stats.by_city[0],
            CityLocationCount {
                city_id: pune.id.to_string(),
                city_name: Some("Pune".into()),
                count: 2,
            }
        );
        assert_eq!(stats.by_city[1].city_name.as_deref(), Some("Mumbai"));
    }
}
