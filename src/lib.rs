//! Hospital proximity search and opening-hours evaluation.
//!
//! The core (`geo`, `hours`, `nearby`) is pure and stateless. `catalog`
//! builds `HospitalRecord`s from JSON or the built-in sample set, and
//! `server` exposes everything over HTTP.

pub mod catalog;
pub mod detail;
pub mod geo;
pub mod hospital;
pub mod hours;
pub mod nearby;
pub mod server;

pub use catalog::{Catalog, CatalogError};
pub use detail::HospitalDetail;
pub use geo::{distance_km, GeoPoint};
pub use hospital::HospitalRecord;
pub use hours::{is_open, next_open, today_hours, OpeningHours, ScheduleError, WeeklySchedule};
pub use nearby::{find_nearby, NearbyQuery, ProximityResult};
