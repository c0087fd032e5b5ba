//! Master data services
//!
//! `master_data` holds the generic engine; each kind module wraps it with the
//! kind's spec, filters, accessors and statistics.

pub mod accessors;
pub mod amenities;
pub mod cities;
pub mod locations;
pub mod master_data;
pub mod property_types;
pub mod rooms;
pub mod washrooms;

use std::sync::Arc;

pub use amenities::AmenityService;
pub use cities::CityService;
pub use locations::LocationService;
pub use master_data::{MasterDataEngine, MasterDataError, NoUsageCheck, UsageCheck};
pub use property_types::PropertyTypeService;
pub use rooms::{BathroomService, BedroomService, RoomCountService};
pub use washrooms::WashroomService;

use crate::store::MasterStore;

/// One service per master-data kind, all over the same store
#[derive(Clone)]
pub struct MasterRegistry {
    pub amenities: AmenityService,
    pub property_types: PropertyTypeService,
    pub washrooms: WashroomService,
    pub bedrooms: BedroomService,
    pub bathrooms: BathroomService,
    pub cities: CityService,
    pub locations: LocationService,
}

impl MasterRegistry {
    pub fn new(store: Arc<dyn MasterStore>) -> Self {
        Self::with_usage_checks(store, UsageChecks::default())
    }

    pub fn with_usage_checks(store: Arc<dyn MasterStore>, checks: UsageChecks) -> Self {
        let mut registry = Self {
            amenities: AmenityService::new(store.clone()),
            property_types: PropertyTypeService::new(store.clone()),
            washrooms: WashroomService::new(store.clone()),
            bedrooms: BedroomService::new(store.clone()),
            bathrooms: BathroomService::new(store.clone()),
            cities: CityService::new(store.clone()),
            locations: LocationService::new(store),
        };

        registry.amenities.engine_mut().set_usage_check(checks.amenities);
        registry.property_types.engine_mut().set_usage_check(checks.property_types);
        registry.washrooms.engine_mut().set_usage_check(checks.washrooms);
        registry.bedrooms.engine_mut().set_usage_check(checks.bedrooms);
        registry.bathrooms.engine_mut().set_usage_check(checks.bathrooms);
        registry.cities.engine_mut().set_usage_check(checks.cities);
        registry.locations.engine_mut().set_usage_check(checks.locations);
        registry
    }
}

/// Delete guards per kind; every kind defaults to [`NoUsageCheck`]
#[derive(Clone)]
pub struct UsageChecks {
    pub amenities: Arc<dyn UsageCheck>,
    pub property_types: Arc<dyn UsageCheck>,
    pub washrooms: Arc<dyn UsageCheck>,
    pub bedrooms: Arc<dyn UsageCheck>,
    pub bathrooms: Arc<dyn UsageCheck>,
    pub cities: Arc<dyn UsageCheck>,
    pub locations: Arc<dyn UsageCheck>,
}

impl Default for UsageChecks {
    fn default() -> Self {
        let none: Arc<dyn UsageCheck> = Arc::new(NoUsageCheck);
        Self {
            amenities: none.clone(),
            property_types: none.clone(),
            washrooms: none.clone(),
            bedrooms: none.clone(),
            bathrooms: none.clone(),
            cities: none.clone(),
            locations: none,
        }
    }
}

/// A kind service the generic CRUD handlers can be mounted for
pub trait MasterKind: Send + Sync + 'static {
    fn engine(&self) -> &MasterDataEngine;

    fn from_registry(registry: &MasterRegistry) -> &Self;
}

macro_rules! master_kind {
    ($service:ty, $field:ident, $engine:path) => {
        impl MasterKind for $service {
            fn engine(&self) -> &MasterDataEngine {
                $engine(self)
            }

            fn from_registry(registry: &MasterRegistry) -> &Self {
                &registry.$field
            }
        }
    };
}

master_kind!(AmenityService, amenities, AmenityService::engine);
master_kind!(PropertyTypeService, property_types, PropertyTypeService::engine);
master_kind!(WashroomService, washrooms, WashroomService::engine);
master_kind!(BedroomService, bedrooms, RoomCountService::engine);
master_kind!(BathroomService, bathrooms, RoomCountService::engine);
master_kind!(CityService, cities, CityService::engine);
master_kind!(LocationService, locations, LocationService::engine);
