//! Search configuration for the itinerary planner.

use std::time::Duration;

use crate::spatial::{DistanceMetric, effective_radius};

/// Configuration parameters for itinerary search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Closest stops kept from each of the origin and destination sets.
    pub candidate_stops: usize,

    /// Departures examined per origin stop.
    pub visit_sample: usize,

    /// How early before the target a departure may leave (minutes).
    pub window_before_mins: i32,

    /// How late after the target a departure may leave (minutes).
    pub window_after_mins: i32,

    /// Longest direct ride accepted (minutes).
    pub max_direct_travel_mins: i32,

    /// Cap on direct itineraries collected.
    pub max_direct_results: usize,

    /// Transfers are searched only when fewer direct itineraries than this
    /// were found.
    pub transfer_threshold: usize,

    /// Routes considered on each side when looking for interchanges.
    pub max_routes_per_side: usize,

    /// Interchange stops considered.
    pub max_interchanges: usize,

    /// Cap on transfer itineraries collected.
    pub max_transfer_results: usize,

    /// Minimum time between arriving at an interchange and departing it
    /// (minutes). Tighter connections are rejected.
    pub min_transfer_mins: i32,

    /// Longest wait at an interchange beyond the minimum (minutes).
    pub max_transfer_wait_mins: i32,

    /// Itineraries returned.
    pub max_results: usize,

    /// Stop search radius used when none (or an invalid one) is given (km).
    pub default_radius_km: f64,

    /// Largest stop search radius honoured (km).
    pub max_radius_km: f64,

    /// Per-itinerary bound on prediction calls (milliseconds).
    pub prediction_timeout_ms: u64,

    /// Distance metric for stop lookup.
    pub metric: DistanceMetric,
}

impl SearchConfig {
    /// Returns the prediction timeout as a Duration.
    pub fn prediction_timeout(&self) -> Duration {
        Duration::from_millis(self.prediction_timeout_ms)
    }

    /// Normalize a requested stop search radius against this config.
    pub fn effective_radius(&self, requested: Option<f64>) -> f64 {
        effective_radius(requested, self.default_radius_km, self.max_radius_km)
    }

    /// Resolve a requested result count, falling back to the default and
    /// never exceeding it.
    pub fn result_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if n > 0 => n.min(self.max_results),
            _ => self.max_results,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_stops: 3,
            visit_sample: 20,
            window_before_mins: 5,
            window_after_mins: 120,
            max_direct_travel_mins: 180, // 3 hours
            max_direct_results: 10,
            transfer_threshold: 5,
            max_routes_per_side: 5,
            max_interchanges: 10,
            max_transfer_results: 10,
            min_transfer_mins: 5,
            max_transfer_wait_mins: 60,
            max_results: 5,
            default_radius_km: 0.5,
            max_radius_km: 5.0,
            prediction_timeout_ms: 800,
            metric: DistanceMetric::Planar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.candidate_stops, 3);
        assert_eq!(config.visit_sample, 20);
        assert_eq!(config.window_before_mins, 5);
        assert_eq!(config.window_after_mins, 120);
        assert_eq!(config.max_direct_travel_mins, 180);
        assert_eq!(config.transfer_threshold, 5);
        assert_eq!(config.max_routes_per_side, 5);
        assert_eq!(config.max_interchanges, 10);
        assert_eq!(config.max_transfer_results, 10);
        assert_eq!(config.min_transfer_mins, 5);
        assert_eq!(config.max_results, 5);
        assert_eq!(config.metric, DistanceMetric::Planar);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::default();
        assert_eq!(config.prediction_timeout(), Duration::from_millis(800));
    }

    #[test]
    fn radius_and_limit_normalization() {
        let config = SearchConfig::default();

        assert_eq!(config.effective_radius(None), 0.5);
        assert_eq!(config.effective_radius(Some(-3.0)), 0.5);
        assert_eq!(config.effective_radius(Some(7.5)), 5.0);

        assert_eq!(config.result_limit(None), 5);
        assert_eq!(config.result_limit(Some(0)), 5);
        assert_eq!(config.result_limit(Some(2)), 2);
        assert_eq!(config.result_limit(Some(50)), 5);
    }
}
