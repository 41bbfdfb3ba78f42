//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Itinerary, Leg, LegStop, ServiceTime, TripId};
use crate::planner::{AnnotatedItinerary, SearchResult, SearchStatus};
use crate::prediction::{Annotation, CrowdingLevel};
use crate::schedule::{Route, ScheduleStore, Stop};
use crate::spatial::NearbyStop;

/// Trip ids listed in a route lookup.
const ROUTE_TRIP_SAMPLE: usize = 10;

/// Listing page size when the client gives none.
const DEFAULT_PER_PAGE: usize = 50;

/// Largest listing page a client may ask for.
const MAX_PER_PAGE: usize = 100;

/// Request for stops near a point.
#[derive(Debug, Deserialize)]
pub struct NearbyStopsRequest {
    pub lat: f64,
    pub lon: f64,

    /// Search radius in km (defaults to the configured radius)
    pub radius: Option<f64>,
}

/// Request to search for itineraries.
#[derive(Debug, Deserialize)]
pub struct SearchItinerariesRequest {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,

    /// Departure time in HH:MM format (defaults to now)
    pub time: Option<String>,

    /// Stop search radius around each end in km
    pub radius: Option<f64>,

    /// Number of itineraries wanted
    pub max_results: Option<usize>,
}

/// Request for a page of routes.
#[derive(Debug, Default, Deserialize)]
pub struct ListRoutesRequest {
    /// Only list routes with this GTFS route_type code
    pub route_type: Option<i32>,

    /// 1-based page number
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Request for a page of stops.
#[derive(Debug, Default, Deserialize)]
pub struct ListStopsRequest {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// A resolved listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    /// Resolve the requested page, defaulting to the first page of 50 and
    /// capping the size at 100.
    pub fn new(page: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            number: page.unwrap_or(1).max(1),
            size: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Number of items before this page.
    pub fn offset(&self) -> usize {
        (self.number - 1).saturating_mul(self.size)
    }

    /// The items of `all` falling on this page.
    pub fn slice<T>(&self, all: impl IntoIterator<Item = T>) -> Vec<T> {
        all.into_iter().skip(self.offset()).take(self.size).collect()
    }
}

/// A stop near a requested point.
#[derive(Debug, Serialize)]
pub struct NearbyStopResult {
    pub stop_id: String,
    pub name: String,

    /// Latitude as stored in the schedule
    pub lat: String,

    /// Longitude as stored in the schedule
    pub lon: String,

    /// Distance from the requested point (km, three decimals)
    pub distance_km: f64,
}

/// Response for a nearby-stops lookup.
#[derive(Debug, Serialize)]
pub struct NearbyStopsResponse {
    pub stops: Vec<NearbyStopResult>,
}

/// Stop information for display.
#[derive(Debug, Serialize)]
pub struct StopInfo {
    pub stop_id: String,
    pub name: String,
    pub lat: String,
    pub lon: String,

    /// Scheduled time at this stop
    pub time: String,
}

/// A ride on one trip.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub trip_id: String,
    pub route_id: String,

    /// Route display name ("short - long")
    pub route_name: String,

    pub headsign: Option<String>,

    /// Boarding stop
    pub board: StopInfo,

    /// Alighting stop
    pub alight: StopInfo,

    pub travel_minutes: i32,
}

/// Predicted conditions at arrival.
#[derive(Debug, Serialize)]
pub struct AnnotationResult {
    pub scheduled_arrival: String,
    pub predicted_arrival: Option<String>,
    pub predicted_delay_minutes: Option<i32>,
    pub crowding: CrowdingLevel,
    pub crowding_label: &'static str,
    pub confidence: Option<f64>,
}

/// An itinerary option.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    /// "direct" or "transfer"
    #[serde(rename = "type")]
    pub kind: &'static str,

    /// Route display names, in riding order
    pub route_names: Vec<String>,

    pub legs: Vec<LegResult>,

    /// Departure time from the first stop
    pub departure_time: String,

    /// Arrival time at the last stop
    pub arrival_time: String,

    /// Total minutes including any wait at the interchange
    pub travel_minutes: i32,

    /// Number of transfers
    pub transfers: usize,

    /// Ranking score, lower is better
    pub score: f64,

    pub annotation: AnnotationResult,
}

/// Response for itinerary search.
#[derive(Debug, Serialize)]
pub struct SearchItinerariesResponse {
    /// "found", "no_stops_nearby" or "no_itinerary_found"
    pub status: &'static str,

    /// Found itineraries, best first
    pub itineraries: Vec<ItineraryResult>,

    pub origin_stops: Vec<NearbyStopResult>,
    pub destination_stops: Vec<NearbyStopResult>,
}

/// Details of one route.
#[derive(Debug, Serialize)]
pub struct RouteResult {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
    pub display_name: String,

    /// GTFS route_type code
    pub route_type: i32,

    pub color: Option<String>,
    pub text_color: Option<String>,
    pub url: Option<String>,

    /// Number of trips running on the route
    pub trip_count: usize,

    /// First few trip ids, in id order
    pub trip_ids: Vec<String>,
}

/// A route in a listing.
#[derive(Debug, Serialize)]
pub struct RouteSummary {
    pub route_id: String,
    pub short_name: String,
    pub long_name: String,
    pub display_name: String,
    pub route_type: i32,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub url: Option<String>,
}

/// Response for a route listing.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub page: usize,
    pub per_page: usize,
    pub routes: Vec<RouteSummary>,
}

/// A stop in a listing.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub stop_id: String,
    pub name: String,
    pub lat: String,
    pub lon: String,
}

/// Response for a stop listing.
#[derive(Debug, Serialize)]
pub struct StopsResponse {
    pub page: usize,
    pub per_page: usize,
    pub stops: Vec<StopResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl NearbyStopResult {
    /// Create from a resolved nearby stop. Returns `None` if the stop is
    /// not in the store.
    pub fn from_nearby(nearby: &NearbyStop, store: &ScheduleStore) -> Option<Self> {
        let stop = store.stop(&nearby.stop_id)?;
        Some(Self {
            stop_id: stop.id.to_string(),
            name: stop.name.clone(),
            lat: stop.lat_text.clone(),
            lon: stop.lon_text.clone(),
            distance_km: round_km(nearby.distance_km),
        })
    }

    /// Convert a list of nearby stops, dropping any unknown to the store.
    pub fn from_list(nearby: &[NearbyStop], store: &ScheduleStore) -> Vec<Self> {
        nearby
            .iter()
            .filter_map(|n| Self::from_nearby(n, store))
            .collect()
    }
}

impl StopInfo {
    fn from_leg_stop(leg_stop: &LegStop, store: &ScheduleStore) -> Self {
        let stop = store.stop(&leg_stop.stop_id);
        Self {
            stop_id: leg_stop.stop_id.to_string(),
            name: stop.map(|s| s.name.clone()).unwrap_or_default(),
            lat: stop.map(|s| s.lat_text.clone()).unwrap_or_default(),
            lon: stop.map(|s| s.lon_text.clone()).unwrap_or_default(),
            time: format_time(&leg_stop.time),
        }
    }
}

impl LegResult {
    /// Create from a domain Leg, looking up names in the store.
    pub fn from_leg(leg: &Leg, store: &ScheduleStore) -> Self {
        Self {
            trip_id: leg.trip_id().to_string(),
            route_id: leg.route_id().to_string(),
            route_name: store
                .route(leg.route_id())
                .map(Route::display_name)
                .unwrap_or_else(|| leg.route_id().to_string()),
            headsign: store.trip(leg.trip_id()).and_then(|t| t.headsign.clone()),
            board: StopInfo::from_leg_stop(leg.board(), store),
            alight: StopInfo::from_leg_stop(leg.alight(), store),
            travel_minutes: leg.travel_minutes(),
        }
    }
}

impl AnnotationResult {
    pub fn from_annotation(annotation: &Annotation) -> Self {
        Self {
            scheduled_arrival: format_time(&annotation.scheduled_arrival),
            predicted_arrival: annotation.predicted_arrival.as_ref().map(format_time),
            predicted_delay_minutes: annotation.predicted_delay_minutes,
            crowding: annotation.crowding,
            crowding_label: annotation.crowding.label(),
            confidence: annotation.confidence,
        }
    }
}

impl ItineraryResult {
    /// Create from an annotated itinerary.
    pub fn from_annotated(found: &AnnotatedItinerary, store: &ScheduleStore) -> Self {
        let itinerary = &found.itinerary;
        let legs: Vec<LegResult> = itinerary
            .legs()
            .into_iter()
            .map(|leg| LegResult::from_leg(leg, store))
            .collect();

        Self {
            kind: match itinerary {
                Itinerary::Direct(_) => "direct",
                Itinerary::Transfer(_) => "transfer",
            },
            route_names: legs.iter().map(|l| l.route_name.clone()).collect(),
            legs,
            departure_time: format_time(&itinerary.departure_time()),
            arrival_time: format_time(&itinerary.arrival_time()),
            travel_minutes: itinerary.travel_minutes(),
            transfers: itinerary.transfer_count(),
            score: found.score,
            annotation: AnnotationResult::from_annotation(&found.annotation),
        }
    }
}

impl SearchItinerariesResponse {
    /// Create from a completed search.
    pub fn from_result(result: &SearchResult, store: &ScheduleStore) -> Self {
        Self {
            status: status_tag(result.status),
            itineraries: result
                .itineraries
                .iter()
                .map(|found| ItineraryResult::from_annotated(found, store))
                .collect(),
            origin_stops: NearbyStopResult::from_list(&result.origin_stops, store),
            destination_stops: NearbyStopResult::from_list(&result.destination_stops, store),
        }
    }
}

impl RouteResult {
    /// Create from a route and its trips.
    pub fn from_route(route: &Route, trips: &[TripId]) -> Self {
        Self {
            route_id: route.id.to_string(),
            short_name: route.short_name.clone(),
            long_name: route.long_name.clone(),
            display_name: route.display_name(),
            route_type: route.route_type.code(),
            color: route.color.clone(),
            text_color: route.text_color.clone(),
            url: route.url.clone(),
            trip_count: trips.len(),
            trip_ids: trips
                .iter()
                .take(ROUTE_TRIP_SAMPLE)
                .map(TripId::to_string)
                .collect(),
        }
    }
}

impl RouteSummary {
    pub fn from_route(route: &Route) -> Self {
        Self {
            route_id: route.id.to_string(),
            short_name: route.short_name.clone(),
            long_name: route.long_name.clone(),
            display_name: route.display_name(),
            route_type: route.route_type.code(),
            color: route.color.clone(),
            text_color: route.text_color.clone(),
            url: route.url.clone(),
        }
    }
}

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            stop_id: stop.id.to_string(),
            name: stop.name.clone(),
            lat: stop.lat_text.clone(),
            lon: stop.lon_text.clone(),
        }
    }
}

/// Wire name of a search outcome.
pub fn status_tag(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::Found => "found",
        SearchStatus::NoStopsNearby => "no_stops_nearby",
        SearchStatus::NoItineraryFound => "no_itinerary_found",
    }
}

/// Format a ServiceTime as HH:MM on the 24-hour clock.
pub fn format_time(time: &ServiceTime) -> String {
    time.to_string()
}

fn round_km(km: f64) -> f64 {
    (km * 1000.0).round() / 1000.0
}
