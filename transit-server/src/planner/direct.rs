//! Single-trip itinerary matching.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::{Itinerary, Leg, LegStop, StopId};
use crate::schedule::ScheduleStore;
use crate::spatial::NearbyStop;

use super::cancel::{CancelFlag, Cancelled};
use super::config::SearchConfig;
use super::window::TimeWindow;

/// Build legs boarding at `board_stop` within `window` and alighting at the
/// first later stop of the same trip accepted by `alight_at`.
///
/// Rides longer than `max_travel_mins` are dropped. Results follow departure
/// order.
pub(super) fn rides_from(
    store: &ScheduleStore,
    board_stop: &StopId,
    window: &TimeWindow,
    sample: usize,
    max_travel_mins: i32,
    alight_at: impl Fn(&StopId) -> bool,
) -> Vec<Leg> {
    let mut legs = Vec::new();

    for departure in window.departures(store, board_stop, sample) {
        let Some((trip, visit)) = store.visit(departure) else {
            continue;
        };
        let Some((_, alight)) = trip.find_visit_after(departure.position, |stop| {
            stop != board_stop && alight_at(stop)
        }) else {
            continue;
        };

        let travel = alight.arrival.minutes_since(visit.departure);
        if travel > max_travel_mins {
            debug!(trip = %trip.id, travel, "ride exceeds travel limit");
            continue;
        }

        let boarded_at = window.normalize(visit.departure);
        let leg = Leg::new(
            trip.route_id.clone(),
            trip.id.clone(),
            LegStop::new(visit.stop_id.clone(), visit.sequence, boarded_at),
            LegStop::new(alight.stop_id.clone(), alight.sequence, boarded_at + travel),
        );
        match leg {
            Ok(leg) => legs.push(leg),
            Err(e) => warn!(trip = %trip.id, error = %e, "skipping malformed ride"),
        }
    }

    legs
}

/// Finds trips that visit an origin stop and later a destination stop.
pub struct DirectMatcher<'a> {
    store: &'a ScheduleStore,
    config: &'a SearchConfig,
}

impl<'a> DirectMatcher<'a> {
    pub fn new(store: &'a ScheduleStore, config: &'a SearchConfig) -> Self {
        Self { store, config }
    }

    /// Direct itineraries from the closest origin stops to the closest
    /// destination stops, departing within `window`.
    pub fn find_direct(
        &self,
        origin: &[NearbyStop],
        destination: &[NearbyStop],
        window: &TimeWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Itinerary>, Cancelled> {
        let destination: HashSet<&StopId> = destination
            .iter()
            .take(self.config.candidate_stops)
            .map(|n| &n.stop_id)
            .collect();

        let mut found = Vec::new();
        for board in origin.iter().take(self.config.candidate_stops) {
            cancel.check()?;

            let legs = rides_from(
                self.store,
                &board.stop_id,
                window,
                self.config.visit_sample,
                self.config.max_direct_travel_mins,
                |stop| destination.contains(stop),
            );
            found.extend(legs.into_iter().map(Itinerary::Direct));

            if found.len() >= self.config.max_direct_results {
                found.truncate(self.config.max_direct_results);
                break;
            }
        }

        debug!(count = found.len(), "direct matching done");
        Ok(found)
    }
}
