//! One-interchange itinerary matching.
//!
//! Interchanges are discovered from route geometry rather than by searching
//! outward from the origin: take the routes serving each side, one
//! representative trip per route, and intersect the stops those trips
//! visit. Legs are then matched through that small set of stops only.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{Itinerary, Leg, RouteId, StopId, Transfer};
use crate::schedule::ScheduleStore;
use crate::spatial::NearbyStop;

use super::cancel::{CancelFlag, Cancelled};
use super::config::SearchConfig;
use super::direct::rides_from;
use super::window::TimeWindow;

/// Finds itineraries with exactly one change of trip.
pub struct TransferMatcher<'a> {
    store: &'a ScheduleStore,
    config: &'a SearchConfig,
}

impl<'a> TransferMatcher<'a> {
    pub fn new(store: &'a ScheduleStore, config: &'a SearchConfig) -> Self {
        Self { store, config }
    }

    /// Routes serving any of `stops`, in stop order, capped per side.
    fn routes_serving(&self, stops: &[&StopId]) -> Vec<&'a RouteId> {
        let mut routes: Vec<&RouteId> = Vec::new();
        for stop in stops {
            for route in self.store.routes_serving(stop) {
                if routes.len() >= self.config.max_routes_per_side {
                    return routes;
                }
                if !routes.contains(&route) {
                    routes.push(route);
                }
            }
        }
        routes
    }

    /// Stops visited by one representative trip of each route, in visit
    /// order, without repeats.
    fn representative_stops(&self, routes: &[&RouteId]) -> Vec<&'a StopId> {
        let mut stops: Vec<&StopId> = Vec::new();
        for route in routes {
            let Some(trip) = self
                .store
                .trips_for_route(route)
                .first()
                .and_then(|id| self.store.trip(id))
            else {
                continue;
            };
            for visit in &trip.visits {
                if !stops.contains(&&visit.stop_id) {
                    stops.push(&visit.stop_id);
                }
            }
        }
        stops
    }

    /// Candidate interchange stops between the two sides.
    pub fn interchanges(&self, origin: &[&StopId], destination: &[&StopId]) -> Vec<&'a StopId> {
        let origin_side = self.representative_stops(&self.routes_serving(origin));
        let destination_side: HashSet<&StopId> = self
            .representative_stops(&self.routes_serving(destination))
            .into_iter()
            .collect();

        origin_side
            .into_iter()
            .filter(|stop| destination_side.contains(stop))
            .filter(|stop| !origin.iter().chain(destination).any(|end| end == stop))
            .take(self.config.max_interchanges)
            .collect()
    }

    /// Transfer itineraries from the closest origin stops to the closest
    /// destination stops, with the first leg departing within `window`.
    pub fn find_transfers(
        &self,
        origin: &[NearbyStop],
        destination: &[NearbyStop],
        window: &TimeWindow,
        cancel: &CancelFlag,
    ) -> Result<Vec<Itinerary>, Cancelled> {
        let origin: Vec<&StopId> = origin
            .iter()
            .take(self.config.candidate_stops)
            .map(|n| &n.stop_id)
            .collect();
        let destination: Vec<&StopId> = destination
            .iter()
            .take(self.config.candidate_stops)
            .map(|n| &n.stop_id)
            .collect();

        let interchanges: HashSet<&StopId> =
            self.interchanges(&origin, &destination).into_iter().collect();
        debug!(count = interchanges.len(), "interchange candidates");
        if interchanges.is_empty() {
            return Ok(Vec::new());
        }

        let mut first_legs: Vec<Leg> = Vec::new();
        for board in &origin {
            cancel.check()?;
            first_legs.extend(rides_from(
                self.store,
                board,
                window,
                self.config.visit_sample,
                self.config.max_direct_travel_mins,
                |stop| interchanges.contains(stop),
            ));
        }
        first_legs.sort_by(|a, b| {
            a.arrival_time()
                .cmp(&b.arrival_time())
                .then_with(|| a.departure_time().cmp(&b.departure_time()))
                .then_with(|| a.trip_id().cmp(b.trip_id()))
        });

        let destination: HashSet<&StopId> = destination.into_iter().collect();
        let mut processed: HashSet<(RouteId, RouteId)> = HashSet::new();
        let mut found = Vec::new();

        for first in first_legs {
            cancel.check()?;
            if found.len() >= self.config.max_transfer_results {
                break;
            }

            let interchange = &first.alight().stop_id;
            let earliest = first.arrival_time() + self.config.min_transfer_mins;
            let onward = TimeWindow::between(
                window.reference(),
                earliest,
                earliest + self.config.max_transfer_wait_mins,
            );

            let second_legs = rides_from(
                self.store,
                interchange,
                &onward,
                self.config.visit_sample,
                self.config.max_direct_travel_mins,
                |stop| destination.contains(stop),
            );

            for second in second_legs {
                if second.route_id() == first.route_id() {
                    continue;
                }
                let pair = (first.route_id().clone(), second.route_id().clone());
                if processed.contains(&pair) {
                    continue;
                }
                match Transfer::new(first.clone(), second, self.config.min_transfer_mins) {
                    Ok(transfer) => {
                        processed.insert(pair);
                        found.push(Itinerary::Transfer(transfer));
                        break;
                    }
                    Err(e) => debug!(error = %e, "connection rejected"),
                }
            }
        }

        debug!(count = found.len(), "transfer matching done");
        Ok(found)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::ServiceTime;
    use crate::schedule::fixture::ScheduleBuilder;
    use proptest::prelude::*;

    fn clock(mins: i32) -> String {
        format!("{:02}:{:02}", mins / 60, mins % 60)
    }

    proptest! {
        #[test]
        fn connections_respect_buffer(
            first_legs in prop::collection::vec((420i32..540, 5i32..40), 1..5),
            second_legs in prop::collection::vec((420i32..660, 5i32..40), 1..5),
        ) {
            let mut builder = ScheduleBuilder::with_abc();
            for (i, (dep, ride)) in first_legs.iter().enumerate() {
                builder = builder.trip(
                    &format!("F{i}"),
                    &format!("RF{i}"),
                    &[("A", clock(*dep).as_str()), ("C", clock(dep + ride).as_str())],
                );
            }
            for (i, (dep, ride)) in second_legs.iter().enumerate() {
                builder = builder.trip(
                    &format!("S{i}"),
                    &format!("RS{i}"),
                    &[("C", clock(*dep).as_str()), ("B", clock(dep + ride).as_str())],
                );
            }
            let store = builder.build();
            let config = SearchConfig::default();
            let origin = vec![NearbyStop { stop_id: StopId::new("A"), distance_km: 0.0 }];
            let dest = vec![NearbyStop { stop_id: StopId::new("B"), distance_km: 0.0 }];

            let found = TransferMatcher::new(&store, &config)
                .find_transfers(
                    &origin,
                    &dest,
                    &TimeWindow::around(ServiceTime::from_minutes(420), 5, 120),
                    &CancelFlag::new(),
                )
                .unwrap();

            prop_assert!(found.len() <= config.max_transfer_results);
            for itinerary in &found {
                let Itinerary::Transfer(transfer) = itinerary else {
                    return Err(TestCaseError::fail("expected a transfer"));
                };
                prop_assert!(
                    transfer.second().departure_time()
                        >= transfer.first().arrival_time() + config.min_transfer_mins
                );
                prop_assert_ne!(transfer.first().route_id(), transfer.second().route_id());
            }
        }
    }
}
