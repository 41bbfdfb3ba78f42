//! In-memory schedule store.
//!
//! Built once from a snapshot and never mutated afterwards. Every lookup the
//! planner performs is a hash-map lookup or a binary search over a
//! pre-sorted vector.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::{Coordinate, RouteId, ServiceTime, StopId, TripId};
use crate::spatial::{DistanceMetric, NearbyStop, StopIndex};

use super::error::ScheduleError;
use super::model::{Route, RouteType, Stop, StopVisit, Trip};
use super::snapshot::{ScheduleSnapshot, StopTimeRecord};

/// GTFS route type assumed when a route record omits it (bus).
const DEFAULT_ROUTE_TYPE: i32 = 3;

/// A departure of some trip from some stop, as held in the per-stop index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitRef {
    pub trip_id: TripId,
    /// Position of the visit within the trip's `visits`.
    pub position: usize,
    pub departure: ServiceTime,
}

/// Counts of what a snapshot load kept and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub stops: usize,
    pub routes: usize,
    pub trips: usize,
    pub stop_visits: usize,
    /// Stops kept without a usable position (not spatially indexed).
    pub unlocated_stops: usize,
    pub duplicate_records: usize,
    pub trips_without_route: usize,
    pub visits_without_trip: usize,
    pub visits_without_stop: usize,
    pub visits_with_bad_times: usize,
    pub duplicate_sequences: usize,
}

impl LoadReport {
    /// Total number of records that were dropped.
    pub fn skipped(&self) -> usize {
        self.duplicate_records
            + self.trips_without_route
            + self.visits_without_trip
            + self.visits_without_stop
            + self.visits_with_bad_times
            + self.duplicate_sequences
    }
}

/// Read-only view of routes, trips, stop visits and stop locations.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    stops: HashMap<StopId, Stop>,
    routes: HashMap<RouteId, Route>,
    trips: HashMap<TripId, Trip>,
    /// Per-stop departures sorted by time.
    departures: HashMap<StopId, Vec<VisitRef>>,
    /// Per-route trips sorted by id.
    trips_by_route: HashMap<RouteId, Vec<TripId>>,
    /// Per-stop routes sorted by id.
    routes_by_stop: HashMap<StopId, Vec<RouteId>>,
    index: StopIndex,
}

impl ScheduleStore {
    /// Build a store from snapshot records.
    ///
    /// Inconsistent records are skipped with a warning and counted in the
    /// returned report; they never fail the load.
    pub fn from_snapshot(snapshot: ScheduleSnapshot) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        let mut stops = HashMap::with_capacity(snapshot.stops.len());
        for record in snapshot.stops {
            let location = match Coordinate::parse(&record.stop_lat, &record.stop_lon) {
                Ok(location) => Some(location),
                Err(e) => {
                    warn!(stop = %record.stop_id, error = %e, "stop has unusable coordinates");
                    report.unlocated_stops += 1;
                    None
                }
            };
            match stops.entry(record.stop_id.clone()) {
                Entry::Occupied(_) => {
                    warn!(stop = %record.stop_id, "duplicate stop record skipped");
                    report.duplicate_records += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(Stop {
                        id: record.stop_id,
                        name: record.stop_name,
                        lat_text: record.stop_lat,
                        lon_text: record.stop_lon,
                        location,
                    });
                }
            }
        }

        let mut routes = HashMap::with_capacity(snapshot.routes.len());
        for record in snapshot.routes {
            match routes.entry(record.route_id.clone()) {
                Entry::Occupied(_) => {
                    warn!(route = %record.route_id, "duplicate route record skipped");
                    report.duplicate_records += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(Route {
                        id: record.route_id,
                        short_name: record.route_short_name.unwrap_or_default(),
                        long_name: record.route_long_name.unwrap_or_default(),
                        route_type: RouteType::from(
                            record.route_type.unwrap_or(DEFAULT_ROUTE_TYPE),
                        ),
                        color: record.route_color.filter(|c| !c.is_empty()),
                        text_color: record.route_text_color.filter(|c| !c.is_empty()),
                        url: record.route_url.filter(|u| !u.is_empty()),
                    });
                }
            }
        }

        let mut trips = HashMap::with_capacity(snapshot.trips.len());
        for record in snapshot.trips {
            if !routes.contains_key(&record.route_id) {
                warn!(trip = %record.trip_id, route = %record.route_id, "trip references unknown route");
                report.trips_without_route += 1;
                continue;
            }
            match trips.entry(record.trip_id.clone()) {
                Entry::Occupied(_) => {
                    warn!(trip = %record.trip_id, "duplicate trip record skipped");
                    report.duplicate_records += 1;
                }
                Entry::Vacant(slot) => {
                    slot.insert(Trip {
                        id: record.trip_id,
                        route_id: record.route_id,
                        headsign: record.trip_headsign.filter(|h| !h.is_empty()),
                        visits: Vec::new(),
                    });
                }
            }
        }

        for record in snapshot.stop_times {
            let Some(trip) = trips.get_mut(&record.trip_id) else {
                debug!(trip = %record.trip_id, "stop time references unknown trip");
                report.visits_without_trip += 1;
                continue;
            };
            if !stops.contains_key(&record.stop_id) {
                warn!(trip = %record.trip_id, stop = %record.stop_id, "stop time references unknown stop");
                report.visits_without_stop += 1;
                continue;
            }
            match parse_visit(&record) {
                Some(visit) => trip.visits.push(visit),
                None => {
                    warn!(
                        trip = %record.trip_id,
                        sequence = record.stop_sequence,
                        "stop time has unusable arrival/departure times"
                    );
                    report.visits_with_bad_times += 1;
                }
            }
        }

        for trip in trips.values_mut() {
            trip.visits.sort_by_key(|v| v.sequence);
            let before = trip.visits.len();
            trip.visits.dedup_by_key(|v| v.sequence);
            let dropped = before - trip.visits.len();
            if dropped > 0 {
                warn!(trip = %trip.id, dropped, "duplicate stop sequences skipped");
                report.duplicate_sequences += dropped;
            }
        }

        let store = Self::index(stops, routes, trips);

        report.stops = store.stops.len();
        report.routes = store.routes.len();
        report.trips = store.trips.len();
        report.stop_visits = store.trips.values().map(|t| t.visits.len()).sum();

        info!(
            stops = report.stops,
            routes = report.routes,
            trips = report.trips,
            stop_visits = report.stop_visits,
            skipped = report.skipped(),
            "schedule loaded"
        );

        (store, report)
    }

    /// Read a JSON-serialized snapshot from disk and build a store.
    pub fn load_json(path: impl AsRef<Path>) -> Result<(Self, LoadReport), ScheduleError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ScheduleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: ScheduleSnapshot =
            serde_json::from_slice(&bytes).map_err(|source| ScheduleError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Build the secondary lookup structures.
    fn index(
        stops: HashMap<StopId, Stop>,
        routes: HashMap<RouteId, Route>,
        trips: HashMap<TripId, Trip>,
    ) -> Self {
        let mut departures: HashMap<StopId, Vec<VisitRef>> = HashMap::new();
        let mut trips_by_route: HashMap<RouteId, Vec<TripId>> = HashMap::new();
        let mut routes_by_stop: HashMap<StopId, BTreeSet<RouteId>> = HashMap::new();

        for trip in trips.values() {
            trips_by_route
                .entry(trip.route_id.clone())
                .or_default()
                .push(trip.id.clone());

            for (position, visit) in trip.visits.iter().enumerate() {
                departures
                    .entry(visit.stop_id.clone())
                    .or_default()
                    .push(VisitRef {
                        trip_id: trip.id.clone(),
                        position,
                        departure: visit.departure,
                    });
                routes_by_stop
                    .entry(visit.stop_id.clone())
                    .or_default()
                    .insert(trip.route_id.clone());
            }
        }

        for refs in departures.values_mut() {
            refs.sort_by(|a, b| {
                a.departure
                    .cmp(&b.departure)
                    .then_with(|| a.trip_id.cmp(&b.trip_id))
                    .then_with(|| a.position.cmp(&b.position))
            });
        }
        for ids in trips_by_route.values_mut() {
            ids.sort();
        }

        let index = StopIndex::new(
            stops
                .values()
                .filter_map(|s| s.location.map(|loc| (s.id.clone(), loc))),
        );

        Self {
            stops,
            routes,
            trips,
            departures,
            trips_by_route,
            routes_by_stop: routes_by_stop
                .into_iter()
                .map(|(stop, set)| (stop, set.into_iter().collect()))
                .collect(),
            index,
        }
    }

    /// Look up a stop.
    pub fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.stops.get(id)
    }

    /// Look up a route.
    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    /// Look up a trip.
    pub fn trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips.get(id)
    }

    /// Trips running on a route, ordered by id.
    pub fn trips_for_route(&self, id: &RouteId) -> &[TripId] {
        self.trips_by_route.get(id).map_or(&[], Vec::as_slice)
    }

    /// Routes with at least one trip visiting a stop, ordered by id.
    pub fn routes_serving(&self, stop: &StopId) -> &[RouteId] {
        self.routes_by_stop.get(stop).map_or(&[], Vec::as_slice)
    }

    /// All departures from a stop, ordered by scheduled departure.
    pub fn departures(&self, stop: &StopId) -> &[VisitRef] {
        self.departures.get(stop).map_or(&[], Vec::as_slice)
    }

    /// Departures from a stop with raw scheduled time in `[from, to]`.
    pub fn departures_between(
        &self,
        stop: &StopId,
        from: ServiceTime,
        to: ServiceTime,
    ) -> &[VisitRef] {
        let refs = self.departures(stop);
        let start = refs.partition_point(|r| r.departure < from);
        let end = refs.partition_point(|r| r.departure <= to);
        if start >= end { &[] } else { &refs[start..end] }
    }

    /// Resolve a departure reference to its trip and visit.
    pub fn visit(&self, visit: &VisitRef) -> Option<(&Trip, &StopVisit)> {
        let trip = self.trips.get(&visit.trip_id)?;
        let stop_visit = trip.visits.get(visit.position)?;
        Some((trip, stop_visit))
    }

    /// Stops within `radius_km` of `center`, nearest first.
    pub fn nearby_stops(
        &self,
        center: Coordinate,
        radius_km: f64,
        metric: DistanceMetric,
    ) -> Vec<NearbyStop> {
        self.index.within(center, radius_km, metric)
    }

    /// All routes, ordered by id.
    pub fn routes(&self) -> Vec<&Route> {
        let mut routes: Vec<&Route> = self.routes.values().collect();
        routes.sort_by(|a, b| a.id.cmp(&b.id));
        routes
    }

    /// All stops, ordered by id.
    pub fn stops(&self) -> Vec<&Stop> {
        let mut stops: Vec<&Stop> = self.stops.values().collect();
        stops.sort_by(|a, b| a.id.cmp(&b.id));
        stops
    }

    /// Number of stops.
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Number of trips.
    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }
}

/// Parse a stop-time record's times, letting a missing arrival or departure
/// fall back to the other.
fn parse_visit(record: &StopTimeRecord) -> Option<StopVisit> {
    let parse = |field: &Option<String>| -> Result<Option<ServiceTime>, ()> {
        match field.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => ServiceTime::parse(s).map(Some).map_err(|_| ()),
        }
    };

    let arrival = parse(&record.arrival_time).ok()?;
    let departure = parse(&record.departure_time).ok()?;
    let (arrival, departure) = match (arrival, departure) {
        (Some(a), Some(d)) => (a, d),
        (Some(a), None) => (a, a),
        (None, Some(d)) => (d, d),
        (None, None) => return None,
    };

    Some(StopVisit {
        stop_id: record.stop_id.clone(),
        sequence: record.stop_sequence,
        arrival,
        departure,
    })
}
