//! Itinerary planner over a static schedule.
//!
//! Answers "how do I get from here to there around this time?" with
//! direct rides and single-transfer connections between the stops near
//! each end, ranked by travel time, wait and transfers.

mod cancel;
mod config;
mod direct;
mod rank;
mod search;
mod transfer;
mod window;

pub use cancel::{CancelFlag, CancelOnDrop, Cancelled};
pub use config::SearchConfig;
pub use direct::DirectMatcher;
pub use rank::{RankedItinerary, deduplicate, rank_itineraries, score};
pub use search::{
    AnnotatedItinerary, Plan, Planner, SearchError, SearchRequest, SearchResult, SearchStage,
    SearchStatus,
};
pub use transfer::TransferMatcher;
pub use window::TimeWindow;
