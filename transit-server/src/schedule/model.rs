//! Schedule entities held by the store.

use crate::domain::{Coordinate, RouteId, ServiceTime, StopId, TripId};

/// A physical boarding/alighting location.
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    /// Latitude exactly as written in the feed.
    pub lat_text: String,
    /// Longitude exactly as written in the feed.
    pub lon_text: String,
    /// Parsed position; `None` when the feed coordinates are unusable.
    pub location: Option<Coordinate>,
}

/// Transit mode of a route, following the GTFS `route_type` taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    Trolleybus,
    Monorail,
    Other(i32),
}

impl RouteType {
    /// Returns the GTFS integer code.
    pub fn code(self) -> i32 {
        match self {
            RouteType::Tram => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableTram => 5,
            RouteType::AerialLift => 6,
            RouteType::Funicular => 7,
            RouteType::Trolleybus => 11,
            RouteType::Monorail => 12,
            RouteType::Other(code) => code,
        }
    }
}

impl From<i32> for RouteType {
    fn from(code: i32) -> Self {
        match code {
            0 => RouteType::Tram,
            1 => RouteType::Subway,
            2 => RouteType::Rail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            5 => RouteType::CableTram,
            6 => RouteType::AerialLift,
            7 => RouteType::Funicular,
            11 => RouteType::Trolleybus,
            12 => RouteType::Monorail,
            other => RouteType::Other(other),
        }
    }
}

/// A named service comprising many trips.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: RouteId,
    pub short_name: String,
    pub long_name: String,
    pub route_type: RouteType,
    pub color: Option<String>,
    pub text_color: Option<String>,
    pub url: Option<String>,
}

impl Route {
    /// Display name in the form "short - long", falling back to whichever
    /// part is present, then to the id.
    pub fn display_name(&self) -> String {
        match (self.short_name.is_empty(), self.long_name.is_empty()) {
            (false, false) => format!("{} - {}", self.short_name, self.long_name),
            (false, true) => self.short_name.clone(),
            (true, false) => self.long_name.clone(),
            (true, true) => self.id.to_string(),
        }
    }
}

/// One scheduled stop within one trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopVisit {
    pub stop_id: StopId,
    pub sequence: u32,
    pub arrival: ServiceTime,
    pub departure: ServiceTime,
}

/// One scheduled run of a vehicle along a route.
///
/// # Invariants
///
/// - `visits` is sorted by `sequence` with no duplicate sequence values
/// - Every visit references a stop present in the store
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: TripId,
    pub route_id: RouteId,
    pub headsign: Option<String>,
    pub visits: Vec<StopVisit>,
}

impl Trip {
    /// Returns the first visit at or after `position` whose stop satisfies
    /// the predicate, together with its position.
    pub fn find_visit_after(
        &self,
        position: usize,
        mut pred: impl FnMut(&StopId) -> bool,
    ) -> Option<(usize, &StopVisit)> {
        self.visits
            .iter()
            .enumerate()
            .skip(position + 1)
            .find(|(_, visit)| pred(&visit.stop_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(short: &str, long: &str) -> Route {
        Route {
            id: RouteId::new("R1"),
            short_name: short.to_string(),
            long_name: long.to_string(),
            route_type: RouteType::Bus,
            color: None,
            text_color: None,
            url: None,
        }
    }

    #[test]
    fn display_name_variants() {
        assert_eq!(route("3", "Centre Street").display_name(), "3 - Centre Street");
        assert_eq!(route("3", "").display_name(), "3");
        assert_eq!(route("", "Centre Street").display_name(), "Centre Street");
        assert_eq!(route("", "").display_name(), "R1");
    }

    #[test]
    fn route_type_codes() {
        assert_eq!(RouteType::from(3), RouteType::Bus);
        assert_eq!(RouteType::from(0), RouteType::Tram);
        assert_eq!(RouteType::from(715), RouteType::Other(715));
        assert_eq!(RouteType::from(12).code(), 12);
        assert_eq!(RouteType::Other(715).code(), 715);
    }

    #[test]
    fn find_visit_after_skips_earlier_positions() {
        let visit = |stop: &str, seq: u32| StopVisit {
            stop_id: StopId::new(stop),
            sequence: seq,
            arrival: ServiceTime::from_minutes(seq as i32),
            departure: ServiceTime::from_minutes(seq as i32),
        };
        let trip = Trip {
            id: TripId::new("T1"),
            route_id: RouteId::new("R1"),
            headsign: None,
            visits: vec![visit("A", 1), visit("B", 2), visit("A", 3)],
        };

        let found = trip.find_visit_after(0, |s| s.as_str() == "A");
        assert_eq!(found.map(|(pos, v)| (pos, v.sequence)), Some((2, 3)));
        assert!(trip.find_visit_after(2, |s| s.as_str() == "A").is_none());
    }
}
