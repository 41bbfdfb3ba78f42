//! Web layer for the transit itinerary planner.
//!
//! Provides JSON endpoints for stop and route listings, nearby stops,
//! itinerary search and route lookup.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
