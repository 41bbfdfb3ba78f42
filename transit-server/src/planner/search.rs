//! Itinerary search orchestration.
//!
//! Composes stop resolution, direct and transfer matching, deduplication,
//! ranking and annotation into one search. The search moves through these
//! stages in order:
//!
//! `ValidatingInput → ResolvingStops → MatchingDirect → MatchingTransfers
//! (only when few direct itineraries were found) → Deduplicating → Ranking
//! → Annotating → Done`
//!
//! Only malformed input fails a search. Every later stage degrades to an
//! empty result with a reason.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::domain::{Coordinate, InvalidCoordinate, Itinerary, ServiceTime};
use crate::prediction::{Annotation, PredictionAdapter, PredictionContext, PredictionQuery};
use crate::schedule::ScheduleStore;
use crate::spatial::NearbyStop;

use super::cancel::{CancelFlag, Cancelled};
use super::config::SearchConfig;
use super::direct::DirectMatcher;
use super::rank::{RankedItinerary, deduplicate, rank_itineraries};
use super::transfer::TransferMatcher;
use super::window::TimeWindow;

/// Error from itinerary search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// Malformed origin or destination
    #[error("invalid search request: {0}")]
    InvalidInput(#[from] InvalidCoordinate),

    /// The caller went away before the search finished
    #[error("search cancelled")]
    Cancelled,
}

impl From<Cancelled> for SearchError {
    fn from(_: Cancelled) -> Self {
        SearchError::Cancelled
    }
}

/// Request for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub destination_lat: f64,
    pub destination_lon: f64,

    /// Desired departure time; defaults to the clock time of `now`.
    pub target_time: Option<ServiceTime>,

    /// When the search is made.
    pub now: NaiveDateTime,

    /// Stop search radius around each end (km).
    pub radius_km: Option<f64>,

    /// Itineraries wanted.
    pub max_results: Option<usize>,
}

impl SearchRequest {
    /// Create a request departing around `now` with default radius and
    /// result count.
    pub fn new(origin: (f64, f64), destination: (f64, f64), now: NaiveDateTime) -> Self {
        Self {
            origin_lat: origin.0,
            origin_lon: origin.1,
            destination_lat: destination.0,
            destination_lon: destination.1,
            target_time: None,
            now,
            radius_km: None,
            max_results: None,
        }
    }

    /// Depart around an explicit time instead of `now`.
    pub fn departing_at(mut self, target: ServiceTime) -> Self {
        self.target_time = Some(target);
        self
    }

    pub fn with_radius(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = Some(n);
        self
    }

    /// Validate the search request, returning the two endpoints.
    pub fn validate(&self) -> Result<(Coordinate, Coordinate), SearchError> {
        let origin = Coordinate::new(self.origin_lat, self.origin_lon)?;
        let destination = Coordinate::new(self.destination_lat, self.destination_lon)?;
        Ok((origin, destination))
    }

    /// The time departures are searched around.
    pub fn target(&self) -> ServiceTime {
        self.target_time
            .unwrap_or_else(|| ServiceTime::from_clock(self.now.time()))
    }

    /// Clock time of the request, for prediction context.
    fn context(&self) -> PredictionContext {
        PredictionContext {
            current_hour: self.now.hour(),
            weekend: matches!(self.now.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }
}

/// Stages a search passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStage {
    ValidatingInput,
    ResolvingStops,
    MatchingDirect,
    MatchingTransfers,
    Deduplicating,
    Ranking,
    Annotating,
    Done,
    Failed,
}

/// Outcome tag of a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// At least one itinerary was found
    Found,
    /// No stop near the origin or no stop near the destination
    NoStopsNearby,
    /// Stops exist on both ends but nothing connects them in the window
    NoItineraryFound,
}

/// Result of stop resolution, matching and ranking.
#[derive(Debug, Clone)]
pub struct Plan {
    pub status: SearchStatus,
    /// Ranked best-first, at most the requested count.
    pub itineraries: Vec<RankedItinerary>,
    pub origin_stops: Vec<NearbyStop>,
    pub destination_stops: Vec<NearbyStop>,
    pub stages: Vec<SearchStage>,
}

/// A ranked itinerary with its predicted conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedItinerary {
    pub itinerary: Itinerary,
    pub score: f64,
    pub annotation: Annotation,
}

/// Result of itinerary search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub status: SearchStatus,
    /// Found itineraries, ranked best-first.
    pub itineraries: Vec<AnnotatedItinerary>,
    pub origin_stops: Vec<NearbyStop>,
    pub destination_stops: Vec<NearbyStop>,
    /// Stages visited, in order.
    pub stages: Vec<SearchStage>,
}

/// Itinerary planner over one schedule snapshot.
pub struct Planner<'a, P: PredictionAdapter> {
    store: &'a ScheduleStore,
    predictor: &'a P,
    config: &'a SearchConfig,
}

impl<'a, P: PredictionAdapter> Planner<'a, P> {
    /// Create a new planner.
    pub fn new(store: &'a ScheduleStore, predictor: &'a P, config: &'a SearchConfig) -> Self {
        Self {
            store,
            predictor,
            config,
        }
    }

    /// Resolve stops, then match, deduplicate and rank itineraries.
    pub fn plan(&self, request: &SearchRequest, cancel: &CancelFlag) -> Result<Plan, SearchError> {
        let mut stages = vec![SearchStage::ValidatingInput];
        let (origin, destination) = request.validate().inspect_err(|e| {
            debug!(stage = ?SearchStage::Failed, error = %e, "search rejected");
        })?;

        stages.push(SearchStage::ResolvingStops);
        let radius = self.config.effective_radius(request.radius_km);
        let origin_stops = self.store.nearby_stops(origin, radius, self.config.metric);
        let destination_stops = self
            .store
            .nearby_stops(destination, radius, self.config.metric);
        debug!(
            radius,
            origin = origin_stops.len(),
            destination = destination_stops.len(),
            "stops resolved"
        );

        let mut plan = Plan {
            status: SearchStatus::NoStopsNearby,
            itineraries: Vec::new(),
            origin_stops,
            destination_stops,
            stages,
        };
        if plan.origin_stops.is_empty() || plan.destination_stops.is_empty() {
            plan.stages.push(SearchStage::Done);
            return Ok(plan);
        }

        let window = TimeWindow::around(
            request.target(),
            self.config.window_before_mins,
            self.config.window_after_mins,
        );

        plan.stages.push(SearchStage::MatchingDirect);
        let mut found = DirectMatcher::new(self.store, self.config).find_direct(
            &plan.origin_stops,
            &plan.destination_stops,
            &window,
            cancel,
        )?;

        if found.len() < self.config.transfer_threshold {
            plan.stages.push(SearchStage::MatchingTransfers);
            found.extend(TransferMatcher::new(self.store, self.config).find_transfers(
                &plan.origin_stops,
                &plan.destination_stops,
                &window,
                cancel,
            )?);
        }

        plan.stages.push(SearchStage::Deduplicating);
        let found = deduplicate(found);

        plan.stages.push(SearchStage::Ranking);
        let mut ranked = rank_itineraries(found, window.reference());
        ranked.truncate(self.config.result_limit(request.max_results));
        plan.itineraries = ranked;
        plan.status = if plan.itineraries.is_empty() {
            SearchStatus::NoItineraryFound
        } else {
            SearchStatus::Found
        };

        debug!(status = ?plan.status, count = plan.itineraries.len(), "matching done");
        Ok(plan)
    }

    /// Search for itineraries between two coordinates.
    pub async fn search(
        &self,
        request: &SearchRequest,
        cancel: &CancelFlag,
    ) -> Result<SearchResult, SearchError> {
        let mut plan = self.plan(request, cancel)?;

        let itineraries = if plan.itineraries.is_empty() {
            Vec::new()
        } else {
            cancel.check()?;
            plan.stages.push(SearchStage::Annotating);
            self.annotate(plan.itineraries, request.context()).await
        };
        plan.stages.push(SearchStage::Done);

        Ok(SearchResult {
            status: plan.status,
            itineraries,
            origin_stops: plan.origin_stops,
            destination_stops: plan.destination_stops,
            stages: plan.stages,
        })
    }

    /// Attach predictions to every itinerary concurrently, each bounded by
    /// the prediction timeout.
    async fn annotate(
        &self,
        ranked: Vec<RankedItinerary>,
        context: PredictionContext,
    ) -> Vec<AnnotatedItinerary> {
        let timeout = self.config.prediction_timeout();

        let annotations = join_all(ranked.iter().map(|r| {
            let query = prediction_query(&r.itinerary, context);
            let scheduled_arrival = r.itinerary.arrival_time();
            async move {
                match tokio::time::timeout(timeout, self.predictor.predict(&query)).await {
                    Ok(Ok(prediction)) => Annotation::from_prediction(scheduled_arrival, &prediction),
                    Ok(Err(e)) => {
                        warn!(trip = %query.trip_id, error = %e, "prediction unavailable");
                        Annotation::unknown(scheduled_arrival)
                    }
                    Err(_) => {
                        warn!(trip = %query.trip_id, "prediction timed out");
                        Annotation::unknown(scheduled_arrival)
                    }
                }
            }
        }))
        .await;

        ranked
            .into_iter()
            .zip(annotations)
            .map(|(r, annotation)| AnnotatedItinerary {
                itinerary: r.itinerary,
                score: r.score,
                annotation,
            })
            .collect()
    }
}

/// Describe an itinerary to the prediction backend by its final leg.
fn prediction_query(itinerary: &Itinerary, context: PredictionContext) -> PredictionQuery {
    let last = itinerary.last_leg();
    PredictionQuery {
        trip_id: last.trip_id().clone(),
        route_id: last.route_id().clone(),
        stop_id: last.alight().stop_id.clone(),
        scheduled_travel_minutes: itinerary.travel_minutes(),
        departure_hour: itinerary.departure_time().hour_of_day(),
        context: Some(context),
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
