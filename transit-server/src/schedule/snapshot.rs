//! Serialized schedule snapshot records.
//!
//! The snapshot mirrors the GTFS static tables the planner needs. Fields
//! keep GTFS names so an ingestion job can emit them without renaming.
//! Times and coordinates stay as strings here; they are parsed once when
//! the store is built.

use serde::{Deserialize, Serialize};

use crate::domain::{RouteId, StopId, TripId};

/// A complete schedule snapshot as handed over by the ingestion job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
    #[serde(default)]
    pub stops: Vec<StopRecord>,
    #[serde(default)]
    pub trips: Vec<TripRecord>,
    #[serde(default)]
    pub stop_times: Vec<StopTimeRecord>,
}

/// A row of `routes.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_id: RouteId,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: Option<String>,
    #[serde(default)]
    pub route_type: Option<i32>,
    #[serde(default)]
    pub route_color: Option<String>,
    #[serde(default)]
    pub route_text_color: Option<String>,
    #[serde(default)]
    pub route_url: Option<String>,
}

/// A row of `stops.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRecord {
    pub stop_id: StopId,
    pub stop_name: String,
    pub stop_lat: String,
    pub stop_lon: String,
}

/// A row of `trips.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRecord {
    pub trip_id: TripId,
    pub route_id: RouteId,
    #[serde(default)]
    pub trip_headsign: Option<String>,
}

/// A row of `stop_times.txt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopTimeRecord {
    pub trip_id: TripId,
    pub stop_id: StopId,
    pub stop_sequence: u32,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
}
