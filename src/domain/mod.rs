//! Domain types and DTOs
//!
//! `master` holds the record shared by every kind; the remaining modules hold
//! each kind's attribute payload and list filters.

pub mod amenities;
pub mod cities;
pub mod locations;
pub mod master;
pub mod property_types;
pub mod query;
pub mod rooms;
pub mod washrooms;

pub use master::{CreateMasterRequest, MasterRecord, UpdateMasterRequest};
pub use query::{MasterQuery, RangeQuery};
