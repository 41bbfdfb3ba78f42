//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Local;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::{Coordinate, RouteId, ServiceTime};
use crate::planner::{CancelFlag, Planner, SearchError, SearchRequest};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops", get(list_stops))
        .route("/api/stops/nearby", get(nearby_stops))
        .route("/api/search", get(search_itineraries))
        .route("/api/routes", get(list_routes))
        .route("/api/routes/:route_id", get(route_details))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Stops within a radius of a point, nearest first.
async fn nearby_stops(
    State(state): State<AppState>,
    Query(req): Query<NearbyStopsRequest>,
) -> Result<Json<NearbyStopsResponse>, AppError> {
    let center = Coordinate::new(req.lat, req.lon).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let store = state.schedule.current().await.store;
    let radius = state.config.effective_radius(req.radius);
    let nearby = store.nearby_stops(center, radius, state.config.metric);

    Ok(Json(NearbyStopsResponse {
        stops: NearbyStopResult::from_list(&nearby, &store),
    }))
}

/// Search for itineraries between two points.
///
/// The search runs on its own task against the snapshot current when the
/// request arrived. If the client goes away first, the handler future is
/// dropped and the guard cancels the search.
async fn search_itineraries(
    State(state): State<AppState>,
    Query(req): Query<SearchItinerariesRequest>,
) -> Result<Json<SearchItinerariesResponse>, AppError> {
    let target_time = req
        .time
        .as_deref()
        .map(ServiceTime::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest {
            message: format!("Invalid time {:?}: {e}", req.time.as_deref().unwrap_or("")),
        })?;

    let mut request = SearchRequest::new(
        (req.start_lat, req.start_lon),
        (req.end_lat, req.end_lon),
        Local::now().naive_local(),
    );
    request.target_time = target_time;
    request.radius_km = req.radius;
    request.max_results = req.max_results;

    let snapshot = state.schedule.current().await;
    let cancel = CancelFlag::new();
    let guard = cancel.cancel_on_drop();

    let task = tokio::spawn(async move {
        let store = snapshot.store;
        let planner = Planner::new(&store, state.predictor.as_ref(), &state.config);
        let result = planner.search(&request, &cancel).await?;
        debug!(
            version = snapshot.version,
            status = ?result.status,
            count = result.itineraries.len(),
            "search finished"
        );
        Ok::<_, SearchError>(SearchItinerariesResponse::from_result(&result, &store))
    });

    let response = task.await.map_err(|e| AppError::Internal {
        message: format!("search task failed: {e}"),
    })??;
    guard.disarm();

    Ok(Json(response))
}

/// A page of routes in id order, optionally of one route type.
async fn list_routes(
    State(state): State<AppState>,
    Query(req): Query<ListRoutesRequest>,
) -> Json<RoutesResponse> {
    let store = state.schedule.current().await.store;
    let page = Page::new(req.page, req.per_page);
    let routes = store
        .routes()
        .into_iter()
        .filter(|r| req.route_type.is_none_or(|code| r.route_type.code() == code))
        .map(RouteSummary::from_route);

    Json(RoutesResponse {
        page: page.number,
        per_page: page.size,
        routes: page.slice(routes),
    })
}

/// A page of stops in id order.
async fn list_stops(
    State(state): State<AppState>,
    Query(req): Query<ListStopsRequest>,
) -> Json<StopsResponse> {
    let store = state.schedule.current().await.store;
    let page = Page::new(req.page, req.per_page);

    Json(StopsResponse {
        page: page.number,
        per_page: page.size,
        stops: page.slice(store.stops().into_iter().map(StopResult::from_stop)),
    })
}

/// Route details with its trip count.
async fn route_details(
    State(state): State<AppState>,
    Path(route_id): Path<String>,
) -> Result<Json<RouteResult>, AppError> {
    let store = state.schedule.current().await.store;
    let id = RouteId::new(route_id);
    let route = store.route(&id).ok_or_else(|| AppError::NotFound {
        message: format!("Route {id} not found"),
    })?;

    Ok(Json(RouteResult::from_route(route, store.trips_for_route(&id))))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidInput(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            SearchError::Cancelled => AppError::Unavailable {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
