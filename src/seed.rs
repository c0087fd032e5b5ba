//! Default option sets inserted at startup
//!
//! Seeding is idempotent: records whose names already exist are skipped.

use serde_json::{json, Value};

use crate::domain::CreateMasterRequest;
use crate::services::{MasterDataEngine, MasterDataError, MasterRegistry};

const SEED_ACTOR: &str = "system";

struct SeedRecord {
    name: String,
    sort_order: i32,
    is_default: bool,
    is_popular: Option<bool>,
    attributes: Value,
}

impl SeedRecord {
    fn new(name: impl Into<String>, sort_order: i32, attributes: Value) -> Self {
        Self {
            name: name.into(),
            sort_order,
            is_default: false,
            is_popular: None,
            attributes,
        }
    }

    fn default_choice(mut self) -> Self {
        self.is_default = true;
        self
    }

    fn popular(mut self) -> Self {
        self.is_popular = Some(true);
        self
    }
}

/// Counts from one seeding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

pub async fn seed_master_data(registry: &MasterRegistry) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    let sets: [(&MasterDataEngine, Vec<SeedRecord>); 5] = [
        (registry.bedrooms.engine(), bedrooms()),
        (registry.bathrooms.engine(), bathrooms()),
        (registry.washrooms.engine(), washrooms()),
        (registry.amenities.engine(), amenities()),
        (registry.property_types.engine(), property_types()),
    ];

    for (engine, records) in sets {
        for record in records {
            let input = CreateMasterRequest {
                name: record.name,
                sort_order: Some(record.sort_order),
                is_default: Some(record.is_default),
                is_popular: record.is_popular,
                attributes: Some(record.attributes),
                ..Default::default()
            };
            match engine.create(input, Some(SEED_ACTOR)).await {
                Ok(_) => report.created += 1,
                Err(MasterDataError::Conflict(_)) => report.skipped += 1,
                Err(e) => {
                    return Err(anyhow::anyhow!(
                        "Failed to seed {} records: {}",
                        engine.master_type(),
                        e
                    ))
                }
            }
        }
    }

    tracing::info!(
        created = report.created,
        skipped = report.skipped,
        "Master data seeded"
    );
    Ok(report)
}

fn bedrooms() -> Vec<SeedRecord> {
    (1..=5)
        .map(|n| {
            let record = SeedRecord::new(format!("{} BHK", n), n, json!({ "value": n, "unit": "BHK" }));
            if n == 2 {
                record.default_choice().popular()
            } else {
                record
            }
        })
        .collect()
}

fn bathrooms() -> Vec<SeedRecord> {
    (1..=4)
        .map(|n| {
            let name = if n == 1 {
                "1 Bathroom".to_string()
            } else {
                format!("{} Bathrooms", n)
            };
            let record = SeedRecord::new(name, n, json!({ "value": n }));
            if n == 2 {
                record.default_choice()
            } else {
                record
            }
        })
        .collect()
}

fn washrooms() -> Vec<SeedRecord> {
    vec![
        SeedRecord::new(
            "Attached Washroom",
            1,
            json!({ "washroomType": "attached", "specifications": { "hasShower": true, "westernToilet": true } }),
        )
        .default_choice(),
        SeedRecord::new("Common Washroom", 2, json!({ "washroomType": "common" })),
        SeedRecord::new("Shared Washroom", 3, json!({ "washroomType": "shared" })),
        SeedRecord::new("Powder Room", 4, json!({ "washroomType": "powder" })),
    ]
}

fn amenities() -> Vec<SeedRecord> {
    vec![
        SeedRecord::new(
            "Swimming Pool",
            1,
            json!({ "category": "recreational", "importance": "high", "popularityScore": 90, "tags": ["pool", "water"], "availability": { "luxury": true } }),
        )
        .popular(),
        SeedRecord::new(
            "Gymnasium",
            2,
            json!({ "category": "wellness", "importance": "high", "popularityScore": 85, "tags": ["fitness"] }),
        )
        .popular(),
        SeedRecord::new(
            "24x7 Security",
            3,
            json!({ "category": "security", "importance": "essential", "popularityScore": 95, "availability": { "commercial": true } }),
        )
        .popular(),
        SeedRecord::new(
            "Power Backup",
            4,
            json!({ "category": "basic", "importance": "essential", "popularityScore": 80, "availability": { "commercial": true } }),
        ),
        SeedRecord::new(
            "Lift",
            5,
            json!({ "category": "convenience", "importance": "high", "popularityScore": 75, "availability": { "commercial": true } }),
        ),
        SeedRecord::new(
            "Children's Play Area",
            6,
            json!({ "category": "recreational", "popularityScore": 60, "tags": ["kids"] }),
        ),
        SeedRecord::new(
            "Garden",
            7,
            json!({ "category": "green", "popularityScore": 55, "tags": ["outdoor"] }),
        ),
        SeedRecord::new(
            "Covered Parking",
            8,
            json!({ "category": "convenience", "importance": "high", "popularityScore": 70, "availability": { "commercial": true } }),
        ),
    ]
}

fn property_types() -> Vec<SeedRecord> {
    vec![
        SeedRecord::new(
            "Apartment",
            1,
            json!({ "category": "residential", "popularityScore": 95, "tags": ["flat"] }),
        )
        .default_choice()
        .popular(),
        SeedRecord::new(
            "Independent House",
            2,
            json!({ "category": "residential", "popularityScore": 70 }),
        )
        .popular(),
        SeedRecord::new("Villa", 3, json!({ "category": "residential", "popularityScore": 60, "tags": ["luxury"] })),
        SeedRecord::new("Plot", 4, json!({ "category": "residential", "popularityScore": 50, "tags": ["land"] })),
        SeedRecord::new("Office Space", 5, json!({ "category": "commercial", "popularityScore": 55 })),
        SeedRecord::new("Shop", 6, json!({ "category": "commercial", "popularityScore": 45 })),
        SeedRecord::new("Warehouse", 7, json!({ "category": "industrial", "popularityScore": 20 })),
        SeedRecord::new("Farm Land", 8, json!({ "category": "agricultural", "popularityScore": 15, "tags": ["land"] })),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MasterStore, MemoryMasterStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_twice_creates_nothing_new() {
        let store: Arc<dyn MasterStore> = Arc::new(MemoryMasterStore::new());
        let registry = MasterRegistry::new(store);

        let first = seed_master_data(&registry).await.unwrap();
        assert_eq!(first.created, 29);
        assert_eq!(first.skipped, 0);

        let second = seed_master_data(&registry).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 29);

        let bedrooms = registry.bedrooms.in_range(&Default::default()).await.unwrap();
        assert_eq!(bedrooms.len(), 5);
        assert_eq!(bedrooms[0].name, "1 Bhk");

        let residential = registry.property_types.residential().await.unwrap();
        assert_eq!(residential[0].name, "Apartment");
    }
}
