//! Scenario tests for the itinerary search.

use super::*;
use crate::domain::{StopId, TripId};
use crate::prediction::{CrowdingLevel, Prediction, PredictionError, RushHourModel};
use crate::schedule::fixture::ScheduleBuilder;
use std::time::Duration;

const A: (f64, f64) = (51.0000, -114.0000);
const B: (f64, f64) = (51.0500, -114.0000);
const NOWHERE: (f64, f64) = (10.0, 10.0);

fn at(hhmm: &str) -> NaiveDateTime {
    // A Friday
    chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_time(chrono::NaiveTime::parse_from_str(hhmm, "%H:%M").unwrap())
}

fn t(s: &str) -> ServiceTime {
    ServiceTime::parse(s).unwrap()
}

/// Predictor returning a fixed answer.
struct Fixed(i32);

impl PredictionAdapter for Fixed {
    async fn predict(&self, _query: &PredictionQuery) -> Result<Prediction, PredictionError> {
        Ok(Prediction {
            delay_minutes: self.0,
            crowding: CrowdingLevel::Medium,
            confidence: 0.9,
        })
    }
}

/// Predictor that always fails.
struct Broken;

impl PredictionAdapter for Broken {
    async fn predict(&self, _query: &PredictionQuery) -> Result<Prediction, PredictionError> {
        Err(PredictionError::Status {
            status: 503,
            message: "down".into(),
        })
    }
}

/// Predictor that never answers in time.
struct Slow;

impl PredictionAdapter for Slow {
    async fn predict(&self, _query: &PredictionQuery) -> Result<Prediction, PredictionError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Err(PredictionError::Timeout)
    }
}

fn direct_store() -> ScheduleStore {
    ScheduleBuilder::with_abc()
        .trip("T1", "R1", &[("A", "08:00"), ("B", "08:20")])
        .build()
}

fn transfer_store(second_departs: &str) -> ScheduleStore {
    ScheduleBuilder::with_abc()
        .trip("T1", "R1", &[("A", "08:00"), ("C", "08:15")])
        .trip("T2", "R2", &[("C", second_departs), ("B", "08:40")])
        .build()
}

async fn search<P: PredictionAdapter>(
    store: &ScheduleStore,
    predictor: &P,
    request: SearchRequest,
) -> SearchResult {
    let config = SearchConfig::default();
    Planner::new(store, predictor, &config)
        .search(&request, &CancelFlag::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn direct_trip_found() {
    let store = direct_store();
    let result = search(&store, &Fixed(0), SearchRequest::new(A, B, at("07:58"))).await;

    assert_eq!(result.status, SearchStatus::Found);
    assert_eq!(result.itineraries.len(), 1);
    let found = &result.itineraries[0];
    assert!(found.itinerary.is_direct());
    assert_eq!(found.itinerary.travel_minutes(), 20);
    assert_eq!(found.itinerary.first_leg().trip_id(), &TripId::new("T1"));

    assert_eq!(result.origin_stops[0].stop_id, StopId::new("A"));
    assert_eq!(result.destination_stops[0].stop_id, StopId::new("B"));
    assert_eq!(
        result.stages,
        [
            SearchStage::ValidatingInput,
            SearchStage::ResolvingStops,
            SearchStage::MatchingDirect,
            SearchStage::MatchingTransfers,
            SearchStage::Deduplicating,
            SearchStage::Ranking,
            SearchStage::Annotating,
            SearchStage::Done,
        ]
    );
}

#[tokio::test]
async fn explicit_target_time_overrides_now() {
    let store = direct_store();
    let request = SearchRequest::new(A, B, at("13:00")).departing_at(t("07:58"));
    let result = search(&store, &Fixed(0), request).await;
    assert_eq!(result.status, SearchStatus::Found);

    let request = SearchRequest::new(A, B, at("07:58")).departing_at(t("13:00"));
    let result = search(&store, &Fixed(0), request).await;
    assert_eq!(result.status, SearchStatus::NoItineraryFound);
}

#[tokio::test]
async fn transfer_with_enough_buffer_found() {
    let store = transfer_store("08:22");
    let result = search(&store, &Fixed(0), SearchRequest::new(A, B, at("07:58"))).await;

    assert_eq!(result.status, SearchStatus::Found);
    assert_eq!(result.itineraries.len(), 1);
    let itinerary = &result.itineraries[0].itinerary;
    assert_eq!(itinerary.transfer_count(), 1);
    assert_eq!(itinerary.interchange(), Some(&StopId::new("C")));
}

#[tokio::test]
async fn transfer_too_tight_not_found() {
    let store = transfer_store("08:17");
    let result = search(&store, &Fixed(0), SearchRequest::new(A, B, at("07:58"))).await;

    assert_eq!(result.status, SearchStatus::NoItineraryFound);
    assert!(result.itineraries.is_empty());
    assert_eq!(result.stages.last(), Some(&SearchStage::Done));
    assert!(!result.stages.contains(&SearchStage::Annotating));
}

#[tokio::test]
async fn no_stops_near_origin() {
    let store = direct_store();
    let result = search(&store, &Fixed(0), SearchRequest::new(NOWHERE, B, at("07:58"))).await;

    assert_eq!(result.status, SearchStatus::NoStopsNearby);
    assert!(result.origin_stops.is_empty());
    assert_eq!(
        result.stages,
        [
            SearchStage::ValidatingInput,
            SearchStage::ResolvingStops,
            SearchStage::Done,
        ]
    );
}

#[tokio::test]
async fn no_stops_near_destination() {
    let store = direct_store();
    let result = search(&store, &Fixed(0), SearchRequest::new(A, NOWHERE, at("07:58"))).await;
    assert_eq!(result.status, SearchStatus::NoStopsNearby);
}

#[tokio::test]
async fn departure_after_midnight_considered() {
    let store = ScheduleBuilder::with_abc()
        .trip("Owl", "R1", &[("A", "00:10"), ("B", "00:30")])
        .build();
    let result = search(&store, &Fixed(0), SearchRequest::new(A, B, at("23:50"))).await;

    assert_eq!(result.status, SearchStatus::Found);
    let itinerary = &result.itineraries[0].itinerary;
    assert_eq!(itinerary.departure_time().minutes(), 24 * 60 + 10);
}

#[tokio::test]
async fn wider_radius_reaches_more_stops() {
    let store = direct_store();
    let request = SearchRequest::new(A, B, at("07:58")).with_radius(4.0);
    let result = search(&store, &Fixed(0), request).await;

    let ids: Vec<_> = result.origin_stops.iter().map(|n| n.stop_id.as_str()).collect();
    assert_eq!(ids, ["A", "C"]);
}

#[tokio::test]
async fn invalid_coordinates_rejected() {
    let store = direct_store();
    let config = SearchConfig::default();
    let planner = Planner::new(&store, &Fixed(0), &config);

    let request = SearchRequest::new((91.0, 0.0), B, at("07:58"));
    let result = planner.search(&request, &CancelFlag::new()).await;
    assert!(matches!(result, Err(SearchError::InvalidInput(_))));

    let request = SearchRequest::new(A, (0.0, f64::NAN), at("07:58"));
    let result = planner.search(&request, &CancelFlag::new()).await;
    assert!(matches!(result, Err(SearchError::InvalidInput(_))));
}

#[tokio::test]
async fn cancelled_search_stops() {
    let store = direct_store();
    let config = SearchConfig::default();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let result = Planner::new(&store, &Fixed(0), &config)
        .search(&SearchRequest::new(A, B, at("07:58")), &cancel)
        .await;
    assert_eq!(result.unwrap_err(), SearchError::Cancelled);
}

#[tokio::test]
async fn predictions_attached() {
    let store = direct_store();
    let result = search(&store, &Fixed(4), SearchRequest::new(A, B, at("07:58"))).await;

    let annotation = &result.itineraries[0].annotation;
    assert_eq!(annotation.scheduled_arrival, t("08:20"));
    assert_eq!(annotation.predicted_arrival, Some(t("08:24")));
    assert_eq!(annotation.crowding, CrowdingLevel::Medium);
}

#[tokio::test]
async fn failed_prediction_becomes_unknown() {
    let store = direct_store();
    let result = search(&store, &Broken, SearchRequest::new(A, B, at("07:58"))).await;

    assert_eq!(result.status, SearchStatus::Found);
    assert!(result.itineraries[0].annotation.is_unknown());
}

#[tokio::test]
async fn slow_prediction_times_out() {
    let store = direct_store();
    let config = SearchConfig {
        prediction_timeout_ms: 20,
        ..SearchConfig::default()
    };
    let result = Planner::new(&store, &Slow, &config)
        .search(&SearchRequest::new(A, B, at("07:58")), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(result.itineraries.len(), 1);
    assert!(result.itineraries[0].annotation.is_unknown());
}

#[tokio::test]
async fn rush_hour_model_annotates() {
    let store = ScheduleBuilder::with_abc()
        .trip("T1", "R1", &[("A", "08:00"), ("B", "08:40")])
        .build();
    let result = search(&store, &RushHourModel::new(), SearchRequest::new(A, B, at("07:58"))).await;

    let annotation = &result.itineraries[0].annotation;
    // 15% of 40 minutes on a weekday morning
    assert_eq!(annotation.predicted_delay_minutes, Some(6));
    assert_eq!(annotation.crowding, CrowdingLevel::High);
}

#[test]
fn enough_direct_results_skip_transfers() {
    let mut builder = ScheduleBuilder::with_abc();
    for (i, dep) in ["08:00", "08:05", "08:10", "08:15", "08:20"].into_iter().enumerate() {
        let arr = format!("08:{}", 30 + i * 5);
        builder = builder.trip(&format!("T{i}"), "R1", &[("A", dep), ("B", arr.as_str())]);
    }
    let store = builder.build();
    let config = SearchConfig::default();

    let plan = Planner::new(&store, &Fixed(0), &config)
        .plan(&SearchRequest::new(A, B, at("07:58")), &CancelFlag::new())
        .unwrap();

    assert!(!plan.stages.contains(&SearchStage::MatchingTransfers));
    assert_eq!(plan.itineraries.len(), 5);
}

#[test]
fn results_ranked_and_truncated() {
    let store = ScheduleBuilder::with_abc()
        .trip("Slow", "R1", &[("A", "08:00"), ("B", "09:00")])
        .trip("Fast", "R2", &[("A", "08:05"), ("B", "08:25")])
        .trip("Later", "R3", &[("A", "09:00"), ("B", "09:20")])
        .build();
    let config = SearchConfig::default();
    let planner = Planner::new(&store, &Fixed(0), &config);

    let plan = planner
        .plan(&SearchRequest::new(A, B, at("07:58")), &CancelFlag::new())
        .unwrap();
    let trips: Vec<_> = plan
        .itineraries
        .iter()
        .map(|r| r.itinerary.first_leg().trip_id().as_str())
        .collect();
    assert_eq!(trips, ["Fast", "Later", "Slow"]);
    for pair in plan.itineraries.windows(2) {
        assert!(pair[0].score <= pair[1].score);
    }

    let plan = planner
        .plan(
            &SearchRequest::new(A, B, at("07:58")).with_max_results(1),
            &CancelFlag::new(),
        )
        .unwrap();
    assert_eq!(plan.itineraries.len(), 1);
}

#[test]
fn wait_measured_from_target_not_clock() {
    let store = ScheduleBuilder::with_abc()
        .trip("Late", "R1", &[("A", "09:50"), ("B", "10:18")])
        .trip("OnTime", "R2", &[("A", "08:00"), ("B", "08:30")])
        .build();
    let config = SearchConfig::default();
    let request = SearchRequest::new(A, B, at("10:00")).departing_at(t("08:00"));

    let plan = Planner::new(&store, &Fixed(0), &config)
        .plan(&request, &CancelFlag::new())
        .unwrap();

    let ranked: Vec<_> = plan
        .itineraries
        .iter()
        .map(|r| (r.itinerary.first_leg().trip_id().as_str(), r.score))
        .collect();
    assert_eq!(ranked[0].0, "OnTime");
    assert!((ranked[0].1 - 21.0).abs() < 1e-9);
    assert_eq!(ranked[1].0, "Late");
    assert!((ranked[1].1 - 41.6).abs() < 1e-9);
}

#[test]
fn later_target_adds_no_wait() {
    let store = direct_store();
    let config = SearchConfig::default();
    let request = SearchRequest::new(A, B, at("05:00")).departing_at(t("08:00"));

    let plan = Planner::new(&store, &Fixed(0), &config)
        .plan(&request, &CancelFlag::new())
        .unwrap();
    assert!((plan.itineraries[0].score - 14.0).abs() < 1e-9);
}

#[test]
fn prediction_query_describes_final_leg() {
    let store = transfer_store("08:22");
    let config = SearchConfig::default();
    let plan = Planner::new(&store, &Fixed(0), &config)
        .plan(&SearchRequest::new(A, B, at("07:58")), &CancelFlag::new())
        .unwrap();

    let context = PredictionContext {
        current_hour: 7,
        weekend: false,
    };
    let query = prediction_query(&plan.itineraries[0].itinerary, context);
    assert_eq!(query.trip_id, TripId::new("T2"));
    assert_eq!(query.stop_id, StopId::new("B"));
    assert_eq!(query.scheduled_travel_minutes, 40);
    assert_eq!(query.departure_hour, 8);
}
