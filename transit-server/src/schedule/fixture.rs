//! Test helpers for building small schedules.

use crate::domain::{RouteId, StopId, TripId};

use super::snapshot::{RouteRecord, ScheduleSnapshot, StopRecord, StopTimeRecord, TripRecord};
use super::store::ScheduleStore;

/// Fluent builder over a `ScheduleSnapshot`.
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    snapshot: ScheduleSnapshot,
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Three stops around Calgary used across planner tests: A and B are
    /// 5.6 km apart on the same meridian, C sits between them to the west.
    pub fn with_abc() -> Self {
        Self::new()
            .stop("A", 51.0000, -114.0000)
            .stop("B", 51.0500, -114.0000)
            .stop("C", 51.0250, -114.0300)
    }

    pub fn stop(mut self, id: &str, lat: f64, lon: f64) -> Self {
        self.snapshot.stops.push(StopRecord {
            stop_id: StopId::new(id),
            stop_name: format!("Stop {id}"),
            stop_lat: format!("{lat:.4}"),
            stop_lon: format!("{lon:.4}"),
        });
        self
    }

    pub fn route(mut self, id: &str) -> Self {
        self.snapshot.routes.push(RouteRecord {
            route_id: RouteId::new(id),
            route_short_name: Some(id.to_string()),
            route_long_name: Some(format!("Route {id}")),
            route_type: Some(3),
            route_color: None,
            route_text_color: None,
            route_url: None,
        });
        self
    }

    /// Add a trip visiting `(stop, "HH:MM")` pairs in order; the route is
    /// created on first use.
    pub fn trip(mut self, id: &str, route: &str, visits: &[(&str, &str)]) -> Self {
        if !self.snapshot.routes.iter().any(|r| r.route_id.as_str() == route) {
            self = self.route(route);
        }
        self.snapshot.trips.push(TripRecord {
            trip_id: TripId::new(id),
            route_id: RouteId::new(route),
            trip_headsign: None,
        });
        for (i, (stop, time)) in visits.iter().enumerate() {
            self.snapshot.stop_times.push(StopTimeRecord {
                trip_id: TripId::new(id),
                stop_id: StopId::new(*stop),
                stop_sequence: i as u32 + 1,
                arrival_time: Some(format!("{time}:00")),
                departure_time: Some(format!("{time}:00")),
            });
        }
        self
    }

    pub fn build(self) -> ScheduleStore {
        ScheduleStore::from_snapshot(self.snapshot).0
    }
}
