//! Local rush-hour heuristic.
//!
//! A deterministic stand-in for a trained model: delays grow with scheduled
//! travel time during the morning and evening peaks, and crowding steps up
//! at peak hours, more so on weekdays.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::domain::RouteId;

use super::PredictionAdapter;
use super::error::PredictionError;
use super::types::{CrowdingLevel, Prediction, PredictionQuery};

const MORNING_PEAK: RangeInclusive<u32> = 7..=9;
const EVENING_PEAK: RangeInclusive<u32> = 16..=18;

/// Fraction of scheduled travel time added as delay at peak hours.
const PEAK_DELAY_FACTOR: f64 = 0.15;

/// Fraction of scheduled travel time added as delay off-peak.
const OFF_PEAK_DELAY_FACTOR: f64 = 0.025;

/// Confidence reported for every heuristic prediction.
const CONFIDENCE: f64 = 0.85;

/// Crowding step outside any adjustment (Low).
const BASE_CROWDING_STEP: i32 = 1;

/// Whether an hour of day falls in a peak period.
pub fn is_rush_hour(hour: u32) -> bool {
    MORNING_PEAK.contains(&hour) || EVENING_PEAK.contains(&hour)
}

/// Heuristic prediction adapter needing no external service.
#[derive(Debug, Clone, Default)]
pub struct RushHourModel {
    popular_routes: HashSet<RouteId>,
}

impl RushHourModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark routes whose ridership is high enough to bump crowding a step.
    pub fn with_popular_routes(mut self, routes: impl IntoIterator<Item = RouteId>) -> Self {
        self.popular_routes.extend(routes);
        self
    }

    /// Predict synchronously.
    ///
    /// Delay depends on the hour the search is made (falling back to the
    /// departure hour when no context is given); crowding on the departure
    /// hour.
    pub fn estimate(&self, query: &PredictionQuery) -> Prediction {
        let current_hour = query
            .context
            .map_or(query.departure_hour, |c| c.current_hour);
        let factor = if is_rush_hour(current_hour) {
            PEAK_DELAY_FACTOR
        } else {
            OFF_PEAK_DELAY_FACTOR
        };
        let delay_minutes = (f64::from(query.scheduled_travel_minutes.max(0)) * factor) as i32;

        let weekend = query.context.is_some_and(|c| c.weekend);
        let mut step = BASE_CROWDING_STEP;
        if is_rush_hour(query.departure_hour) {
            step += if weekend { 1 } else { 2 };
        }
        if self.popular_routes.contains(&query.route_id) {
            step += 1;
        }

        Prediction {
            delay_minutes,
            crowding: CrowdingLevel::from_step(step),
            confidence: CONFIDENCE,
        }
    }
}

impl PredictionAdapter for RushHourModel {
    async fn predict(&self, query: &PredictionQuery) -> Result<Prediction, PredictionError> {
        Ok(self.estimate(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::PredictionContext;

    fn query(travel: i32, departure_hour: u32, context: Option<(u32, bool)>) -> PredictionQuery {
        PredictionQuery {
            trip_id: "T1".into(),
            route_id: "R1".into(),
            stop_id: "B".into(),
            scheduled_travel_minutes: travel,
            departure_hour,
            context: context.map(|(current_hour, weekend)| PredictionContext {
                current_hour,
                weekend,
            }),
        }
    }

    #[test]
    fn rush_hour_bounds() {
        assert!(!is_rush_hour(6));
        assert!(is_rush_hour(7));
        assert!(is_rush_hour(9));
        assert!(!is_rush_hour(10));
        assert!(is_rush_hour(16));
        assert!(is_rush_hour(18));
        assert!(!is_rush_hour(19));
    }

    #[test]
    fn delay_scales_with_travel() {
        let model = RushHourModel::new();
        assert_eq!(model.estimate(&query(40, 8, Some((8, false)))).delay_minutes, 6);
        assert_eq!(model.estimate(&query(40, 12, Some((12, false)))).delay_minutes, 1);
        assert_eq!(model.estimate(&query(20, 12, Some((12, false)))).delay_minutes, 0);
    }

    #[test]
    fn delay_uses_search_hour() {
        let model = RushHourModel::new();
        // Off-peak departure, but searched during the morning peak
        assert_eq!(model.estimate(&query(40, 12, Some((8, false)))).delay_minutes, 6);
        // No context: departure hour stands in
        assert_eq!(model.estimate(&query(40, 8, None)).delay_minutes, 6);
    }

    #[test]
    fn crowding_levels() {
        let model = RushHourModel::new();
        assert_eq!(model.estimate(&query(20, 12, Some((12, false)))).crowding, CrowdingLevel::Low);
        assert_eq!(model.estimate(&query(20, 8, Some((8, false)))).crowding, CrowdingLevel::High);
        assert_eq!(model.estimate(&query(20, 8, Some((8, true)))).crowding, CrowdingLevel::Medium);

        let popular = RushHourModel::new().with_popular_routes([RouteId::new("R1")]);
        assert_eq!(popular.estimate(&query(20, 12, None)).crowding, CrowdingLevel::Medium);
        assert_eq!(
            popular.estimate(&query(20, 17, Some((17, false)))).crowding,
            CrowdingLevel::VeryHigh
        );
    }

    #[tokio::test]
    async fn adapter_never_fails() {
        let prediction = RushHourModel::new().predict(&query(30, 17, None)).await.unwrap();
        assert_eq!(prediction.confidence, 0.85);
    }
}
