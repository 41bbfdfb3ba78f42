//! Domain error types.
//!
//! These errors represent validation failures when assembling itineraries.
//! They are distinct from schedule loading and prediction errors.

use super::StopId;

/// Domain-level errors for itinerary construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Invalid leg construction (e.g., alight before board)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// The second leg does not start where the first one ends
    #[error("legs do not connect: first alights at {alight}, second boards at {board}")]
    LegsNotConnected { alight: StopId, board: StopId },

    /// Not enough time between legs at the interchange stop
    #[error("connection at {stop} leaves {slack_mins} minutes, {required_mins} required")]
    ConnectionTooTight {
        stop: StopId,
        slack_mins: i32,
        required_mins: i32,
    },
}
