//! Itinerary deduplication and ranking.
//!
//! Ranks itineraries by a weighted score to present the most useful options
//! first.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::{Itinerary, ServiceTime};

/// Weight of total travel minutes in the score.
pub const TRAVEL_WEIGHT: f64 = 0.7;

/// Weight of minutes spent waiting for the first departure.
pub const WAIT_WEIGHT: f64 = 0.2;

/// Weight of the transfer penalty.
pub const TRANSFER_WEIGHT: f64 = 0.1;

/// Minutes charged per transfer before weighting.
pub const TRANSFER_PENALTY_MINS: f64 = 15.0;

/// Score an itinerary; lower is better.
///
/// Wait is counted from `target`, the requested departure time, which must
/// already be normalized against the same reference as the itinerary's
/// times.
///
/// # Examples
///
/// ```
/// use transit_server::domain::{Itinerary, Leg, LegStop, RouteId, ServiceTime, StopId, TripId};
/// use transit_server::planner::score;
///
/// let t = |s| ServiceTime::parse(s).unwrap();
/// let leg = Leg::new(
///     RouteId::new("R1"),
///     TripId::new("T1"),
///     LegStop::new(StopId::new("A"), 1, t("08:00")),
///     LegStop::new(StopId::new("B"), 2, t("08:20")),
/// )
/// .unwrap();
///
/// // 0.7 * 20 travel + 0.2 * 2 wait
/// let s = score(&Itinerary::Direct(leg), t("07:58"));
/// assert!((s - 14.4).abs() < 1e-9);
/// ```
pub fn score(itinerary: &Itinerary, target: ServiceTime) -> f64 {
    let travel = f64::from(itinerary.travel_minutes());
    let wait = f64::from(itinerary.departure_time().wait_after(target));
    let transfers = itinerary.transfer_count() as f64;

    TRAVEL_WEIGHT * travel + WAIT_WEIGHT * wait + TRANSFER_WEIGHT * (transfers * TRANSFER_PENALTY_MINS)
}

/// An itinerary with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedItinerary {
    pub itinerary: Itinerary,
    pub score: f64,
}

/// Rank itineraries by score against the target departure time, best first.
///
/// The sort is stable: equal scores keep their input order, so ranking an
/// already-ranked list changes nothing.
pub fn rank_itineraries(itineraries: Vec<Itinerary>, target: ServiceTime) -> Vec<RankedItinerary> {
    let mut ranked: Vec<RankedItinerary> = itineraries
        .into_iter()
        .map(|itinerary| RankedItinerary {
            score: score(&itinerary, target),
            itinerary,
        })
        .collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked
}

/// Keep one itinerary per signature.
///
/// Itineraries riding the same trips in the same order are duplicates. The
/// one with lower travel time survives; on a tie the first encountered
/// does. Survivors keep the position of the first member of their group.
pub fn deduplicate(itineraries: Vec<Itinerary>) -> Vec<Itinerary> {
    if itineraries.len() <= 1 {
        return itineraries;
    }

    let mut slots: Vec<Itinerary> = Vec::with_capacity(itineraries.len());
    let mut seen = HashMap::new();

    for itinerary in itineraries {
        match seen.entry(itinerary.signature()) {
            Entry::Occupied(entry) => {
                let slot: &mut Itinerary = &mut slots[*entry.get()];
                if itinerary.travel_minutes() < slot.travel_minutes() {
                    *slot = itinerary;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(slots.len());
                slots.push(itinerary);
            }
        }
    }

    slots
}
