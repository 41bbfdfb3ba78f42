//! Itinerary types.
//!
//! A `Leg` is a ride on one trip from a boarding stop to a later alighting
//! stop. An `Itinerary` is either a single leg or two legs joined at an
//! interchange stop. Itineraries are transient values that live for the
//! duration of one search.

use super::{DomainError, RouteId, ServiceTime, StopId, TripId};

/// One end of a leg: a stop visit on the leg's trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegStop {
    /// The stop boarded or alighted at.
    pub stop_id: StopId,
    /// Sequence index of the visit within its trip.
    pub sequence: u32,
    /// Scheduled time, normalized against the search reference time so that
    /// post-midnight visits compare correctly with late-evening ones.
    pub time: ServiceTime,
}

impl LegStop {
    /// Creates a leg endpoint.
    pub fn new(stop_id: StopId, sequence: u32, time: ServiceTime) -> Self {
        Self {
            stop_id,
            sequence,
            time,
        }
    }
}

/// A leg of an itinerary (one trip).
///
/// # Invariants
///
/// - `alight.sequence > board.sequence` (travel forward along the trip)
/// - `alight.time >= board.time`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leg {
    route_id: RouteId,
    trip_id: TripId,
    board: LegStop,
    alight: LegStop,
}

impl Leg {
    /// Construct a leg, validating its direction of travel.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::domain::{Leg, LegStop, RouteId, ServiceTime, StopId, TripId};
    ///
    /// let board = LegStop::new(StopId::new("A"), 1, ServiceTime::parse("08:00").unwrap());
    /// let alight = LegStop::new(StopId::new("B"), 4, ServiceTime::parse("08:20").unwrap());
    ///
    /// let leg = Leg::new(RouteId::new("R1"), TripId::new("T1"), board.clone(), alight.clone()).unwrap();
    /// assert_eq!(leg.travel_minutes(), 20);
    ///
    /// // Travelling backwards along the trip is rejected
    /// assert!(Leg::new(RouteId::new("R1"), TripId::new("T1"), alight, board).is_err());
    /// ```
    pub fn new(
        route_id: RouteId,
        trip_id: TripId,
        board: LegStop,
        alight: LegStop,
    ) -> Result<Self, DomainError> {
        if alight.sequence <= board.sequence {
            return Err(DomainError::InvalidLeg(
                "alight sequence must be after board sequence",
            ));
        }
        if alight.time < board.time {
            return Err(DomainError::InvalidLeg(
                "alight time must not precede board time",
            ));
        }

        Ok(Self {
            route_id,
            trip_id,
            board,
            alight,
        })
    }

    /// Returns the route this leg rides.
    pub fn route_id(&self) -> &RouteId {
        &self.route_id
    }

    /// Returns the trip this leg rides.
    pub fn trip_id(&self) -> &TripId {
        &self.trip_id
    }

    /// Returns the boarding visit.
    pub fn board(&self) -> &LegStop {
        &self.board
    }

    /// Returns the alighting visit.
    pub fn alight(&self) -> &LegStop {
        &self.alight
    }

    /// Returns the (normalized) departure time from the boarding stop.
    pub fn departure_time(&self) -> ServiceTime {
        self.board.time
    }

    /// Returns the (normalized) arrival time at the alighting stop.
    pub fn arrival_time(&self) -> ServiceTime {
        self.alight.time
    }

    /// Returns the time on board in minutes.
    pub fn travel_minutes(&self) -> i32 {
        self.alight.time.minutes() - self.board.time.minutes()
    }
}

/// Two legs joined at an interchange stop.
///
/// # Invariants
///
/// - The first leg alights where the second boards
/// - The second leg departs no earlier than the first arrives plus the
///   minimum transfer buffer
/// - The legs ride different trips
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    first: Leg,
    second: Leg,
}

impl Transfer {
    /// Join two legs, validating the connection.
    pub fn new(first: Leg, second: Leg, min_buffer_mins: i32) -> Result<Self, DomainError> {
        if first.alight.stop_id != second.board.stop_id {
            return Err(DomainError::LegsNotConnected {
                alight: first.alight.stop_id.clone(),
                board: second.board.stop_id.clone(),
            });
        }
        if first.trip_id == second.trip_id {
            return Err(DomainError::InvalidLeg(
                "transfer legs must ride different trips",
            ));
        }

        let slack_mins = second.departure_time().minutes() - first.arrival_time().minutes();
        if slack_mins < min_buffer_mins {
            return Err(DomainError::ConnectionTooTight {
                stop: first.alight.stop_id.clone(),
                slack_mins,
                required_mins: min_buffer_mins,
            });
        }

        Ok(Self { first, second })
    }

    /// Returns the leg from the origin area to the interchange.
    pub fn first(&self) -> &Leg {
        &self.first
    }

    /// Returns the leg from the interchange to the destination area.
    pub fn second(&self) -> &Leg {
        &self.second
    }

    /// Returns the interchange stop.
    pub fn interchange(&self) -> &StopId {
        &self.first.alight.stop_id
    }

    /// Returns the minutes spent waiting at the interchange.
    pub fn connection_minutes(&self) -> i32 {
        self.second.departure_time().minutes() - self.first.arrival_time().minutes()
    }
}

/// Canonical identity of an itinerary: the trips it rides, in leg order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItinerarySignature(Vec<TripId>);

impl ItinerarySignature {
    /// Returns the trips making up this signature.
    pub fn trips(&self) -> &[TripId] {
        &self.0
    }
}

/// A computed journey option: direct or with exactly one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Itinerary {
    /// A single trip from origin area to destination area
    Direct(Leg),
    /// Two trips joined at an interchange stop
    Transfer(Transfer),
}

impl Itinerary {
    /// Returns the first leg.
    pub fn first_leg(&self) -> &Leg {
        match self {
            Itinerary::Direct(leg) => leg,
            Itinerary::Transfer(transfer) => transfer.first(),
        }
    }

    /// Returns the last leg.
    pub fn last_leg(&self) -> &Leg {
        match self {
            Itinerary::Direct(leg) => leg,
            Itinerary::Transfer(transfer) => transfer.second(),
        }
    }

    /// Returns all legs in travel order.
    pub fn legs(&self) -> Vec<&Leg> {
        match self {
            Itinerary::Direct(leg) => vec![leg],
            Itinerary::Transfer(transfer) => vec![transfer.first(), transfer.second()],
        }
    }

    /// Returns true for a single-trip itinerary.
    pub fn is_direct(&self) -> bool {
        matches!(self, Itinerary::Direct(_))
    }

    /// Returns the interchange stop, if any.
    pub fn interchange(&self) -> Option<&StopId> {
        match self {
            Itinerary::Direct(_) => None,
            Itinerary::Transfer(transfer) => Some(transfer.interchange()),
        }
    }

    /// Returns the boarding time of the first leg.
    pub fn departure_time(&self) -> ServiceTime {
        self.first_leg().departure_time()
    }

    /// Returns the alighting time of the last leg.
    pub fn arrival_time(&self) -> ServiceTime {
        self.last_leg().arrival_time()
    }

    /// Total travel time in minutes, including any wait at the interchange.
    pub fn travel_minutes(&self) -> i32 {
        self.arrival_time().minutes() - self.departure_time().minutes()
    }

    /// Number of transfers (0 or 1).
    pub fn transfer_count(&self) -> usize {
        match self {
            Itinerary::Direct(_) => 0,
            Itinerary::Transfer(_) => 1,
        }
    }

    /// Returns the canonical signature used for deduplication.
    pub fn signature(&self) -> ItinerarySignature {
        ItinerarySignature(self.legs().into_iter().map(|l| l.trip_id().clone()).collect())
    }
}
