//! Arrival-delay and crowding predictions.
//!
//! The planner treats prediction as an opaque function of the final leg of
//! an itinerary. Backends: a remote HTTP service (optionally cached) or the
//! local rush-hour heuristic.

mod cache;
mod client;
mod error;
mod model;
mod types;

use std::future::Future;

pub use cache::{CacheConfig, CachedPredictor};
pub use client::{HttpPredictionClient, PredictionClientConfig};
pub use error::PredictionError;
pub use model::{RushHourModel, is_rush_hour};
pub use types::{Annotation, CrowdingLevel, Prediction, PredictionContext, PredictionQuery};

/// Source of delay and crowding predictions.
///
/// This abstraction allows the planner to be tested with canned
/// predictions.
pub trait PredictionAdapter: Send + Sync {
    /// Predict conditions for the final leg described by `query`.
    fn predict(
        &self,
        query: &PredictionQuery,
    ) -> impl Future<Output = Result<Prediction, PredictionError>> + Send;
}

/// The prediction backend chosen at startup.
pub enum PredictionBackend {
    /// External service behind a short-lived cache
    Remote(CachedPredictor<HttpPredictionClient>),
    /// Built-in heuristic
    Local(RushHourModel),
}

impl PredictionBackend {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            PredictionBackend::Remote(_) => "remote",
            PredictionBackend::Local(_) => "local",
        }
    }
}

impl PredictionAdapter for PredictionBackend {
    async fn predict(&self, query: &PredictionQuery) -> Result<Prediction, PredictionError> {
        match self {
            PredictionBackend::Remote(client) => client.predict(query).await,
            PredictionBackend::Local(model) => model.predict(query).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_backend_delegates() {
        let backend = PredictionBackend::Local(RushHourModel::new());
        assert_eq!(backend.name(), "local");

        let query = PredictionQuery {
            trip_id: "T1".into(),
            route_id: "R1".into(),
            stop_id: "B".into(),
            scheduled_travel_minutes: 60,
            departure_hour: 17,
            context: None,
        };
        let prediction = backend.predict(&query).await.unwrap();
        assert_eq!(prediction.delay_minutes, 9);
        assert_eq!(prediction.crowding, CrowdingLevel::High);
    }
}
