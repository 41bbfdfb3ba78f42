//! Schedule store.
//!
//! Holds the static timetable the planner searches: stops, routes, trips
//! and the ordered stop visits of each trip. A store is built once from a
//! snapshot, shared read-only, and replaced wholesale on reload.

mod error;
#[cfg(test)]
pub(crate) mod fixture;
mod handle;
mod model;
mod snapshot;
mod store;

pub use error::ScheduleError;
pub use handle::{ScheduleHandle, Snapshot};
pub use model::{Route, RouteType, Stop, StopVisit, Trip};
pub use snapshot::{RouteRecord, ScheduleSnapshot, StopRecord, StopTimeRecord, TripRecord};
pub use store::{LoadReport, ScheduleStore, VisitRef};
