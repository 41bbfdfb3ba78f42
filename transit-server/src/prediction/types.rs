//! Prediction request and response types.

use serde::{Deserialize, Serialize};

use crate::domain::{RouteId, ServiceTime, StopId, TripId};

/// Discrete occupancy level of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrowdingLevel {
    Empty,
    Low,
    Medium,
    High,
    VeryHigh,
    Unknown,
}

impl CrowdingLevel {
    /// Levels in increasing order of occupancy.
    const SCALE: [CrowdingLevel; 5] = [
        CrowdingLevel::Empty,
        CrowdingLevel::Low,
        CrowdingLevel::Medium,
        CrowdingLevel::High,
        CrowdingLevel::VeryHigh,
    ];

    /// Level at a position on the five-step scale, clamped to the ends.
    pub fn from_step(step: i32) -> Self {
        Self::SCALE[step.clamp(0, Self::SCALE.len() as i32 - 1) as usize]
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            CrowdingLevel::Empty => "Empty",
            CrowdingLevel::Low => "Low",
            CrowdingLevel::Medium => "Medium",
            CrowdingLevel::High => "High",
            CrowdingLevel::VeryHigh => "Very High",
            CrowdingLevel::Unknown => "Unknown",
        }
    }
}

/// Time-of-request context for a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredictionContext {
    /// Wall-clock hour the search was made (0-23).
    pub current_hour: u32,
    /// Whether the search was made on a Saturday or Sunday.
    pub weekend: bool,
}

/// What to predict: the final leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionQuery {
    pub trip_id: TripId,
    pub route_id: RouteId,
    /// Stop the rider alights at.
    pub stop_id: StopId,
    /// Scheduled travel minutes for the whole itinerary.
    pub scheduled_travel_minutes: i32,
    /// Hour (0-23) the itinerary departs.
    pub departure_hour: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<PredictionContext>,
}

/// A delay and crowding prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub delay_minutes: i32,
    pub crowding: CrowdingLevel,
    pub confidence: f64,
}

/// Predicted conditions attached to a ranked itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub scheduled_arrival: ServiceTime,
    pub predicted_arrival: Option<ServiceTime>,
    pub predicted_delay_minutes: Option<i32>,
    pub crowding: CrowdingLevel,
    pub confidence: Option<f64>,
}

impl Annotation {
    /// Annotation built from a successful prediction.
    pub fn from_prediction(scheduled_arrival: ServiceTime, prediction: &Prediction) -> Self {
        Self {
            scheduled_arrival,
            predicted_arrival: Some(scheduled_arrival + prediction.delay_minutes),
            predicted_delay_minutes: Some(prediction.delay_minutes),
            crowding: prediction.crowding,
            confidence: Some(prediction.confidence),
        }
    }

    /// Neutral annotation used when no prediction is available.
    pub fn unknown(scheduled_arrival: ServiceTime) -> Self {
        Self {
            scheduled_arrival,
            predicted_arrival: None,
            predicted_delay_minutes: None,
            crowding: CrowdingLevel::Unknown,
            confidence: None,
        }
    }

    /// Returns true for the neutral annotation.
    pub fn is_unknown(&self) -> bool {
        self.predicted_delay_minutes.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crowding_steps_clamp() {
        assert_eq!(CrowdingLevel::from_step(-2), CrowdingLevel::Empty);
        assert_eq!(CrowdingLevel::from_step(1), CrowdingLevel::Low);
        assert_eq!(CrowdingLevel::from_step(4), CrowdingLevel::VeryHigh);
        assert_eq!(CrowdingLevel::from_step(9), CrowdingLevel::VeryHigh);
    }

    #[test]
    fn crowding_serializes_snake_case() {
        let json = serde_json::to_string(&CrowdingLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"very_high\"");
        assert_eq!(CrowdingLevel::VeryHigh.label(), "Very High");
    }

    #[test]
    fn annotation_from_prediction() {
        let scheduled = ServiceTime::parse("08:40").unwrap();
        let annotation = Annotation::from_prediction(
            scheduled,
            &Prediction {
                delay_minutes: 3,
                crowding: CrowdingLevel::High,
                confidence: 0.85,
            },
        );
        assert_eq!(annotation.predicted_arrival, Some(ServiceTime::parse("08:43").unwrap()));
        assert!(!annotation.is_unknown());

        let unknown = Annotation::unknown(scheduled);
        assert!(unknown.is_unknown());
        assert_eq!(unknown.crowding, CrowdingLevel::Unknown);
    }

    #[test]
    fn query_omits_missing_context() {
        let query = PredictionQuery {
            trip_id: TripId::new("T1"),
            route_id: RouteId::new("R1"),
            stop_id: StopId::new("B"),
            scheduled_travel_minutes: 20,
            departure_hour: 8,
            context: None,
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["trip_id"], "T1");
        assert!(json.get("context").is_none());
    }
}
