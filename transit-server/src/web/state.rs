//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::SearchConfig;
use crate::prediction::PredictionBackend;
use crate::schedule::ScheduleHandle;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Current schedule snapshot, swapped on reload
    pub schedule: Arc<ScheduleHandle>,

    /// Delay and crowding predictions
    pub predictor: Arc<PredictionBackend>,

    /// Itinerary planner configuration
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        schedule: Arc<ScheduleHandle>,
        predictor: PredictionBackend,
        config: SearchConfig,
    ) -> Self {
        Self {
            schedule,
            predictor: Arc::new(predictor),
            config: Arc::new(config),
        }
    }
}
