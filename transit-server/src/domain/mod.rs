//! Domain types for the transit itinerary planner.
//!
//! This module contains the core value types that represent validated
//! schedule data and computed itineraries. All types enforce their
//! invariants at construction time, so code that receives these types can
//! trust their validity.

mod coord;
mod error;
mod ids;
mod itinerary;
mod time;

pub use coord::{Coordinate, InvalidCoordinate};
pub use error::DomainError;
pub use ids::{RouteId, StopId, TripId};
pub use itinerary::{Itinerary, ItinerarySignature, Leg, LegStop, Transfer};
pub use time::{MINUTES_PER_DAY, ServiceTime, TimeError};
