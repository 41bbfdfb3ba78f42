use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_server::planner::SearchConfig;
use transit_server::prediction::{
    CacheConfig, CachedPredictor, HttpPredictionClient, PredictionBackend, PredictionClientConfig,
    RushHourModel,
};
use transit_server::schedule::{ScheduleHandle, ScheduleStore};
use transit_server::settings::ServerSettings;
use transit_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = ServerSettings::from_env()?;

    // Load the schedule (fail fast if unusable)
    let (store, report) = ScheduleStore::load_json(&settings.schedule_path)?;
    if report.skipped() > 0 {
        warn!(skipped = report.skipped(), "schedule loaded with skipped records");
    }
    let schedule = Arc::new(ScheduleHandle::new(store));

    let predictor = match &settings.prediction_url {
        Some(url) => {
            let config =
                PredictionClientConfig::new(url.as_str()).with_timeout(settings.prediction_timeout_ms);
            let client = HttpPredictionClient::new(config)?;
            info!(endpoint = client.endpoint(), "using remote predictions");
            PredictionBackend::Remote(CachedPredictor::new(client, &CacheConfig::default()))
        }
        None => PredictionBackend::Local(RushHourModel::new()),
    };

    let search_config = SearchConfig {
        prediction_timeout_ms: settings.prediction_timeout_ms,
        ..SearchConfig::default()
    };

    if let Some(every) = settings.schedule_refresh {
        tokio::spawn(reload_schedule(
            Arc::clone(&schedule),
            settings.schedule_path.clone(),
            every,
        ));
    }

    info!(backend = predictor.name(), "prediction backend ready");
    let state = AppState::new(schedule, predictor, search_config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    info!(addr = %settings.bind_addr, "transit planner listening");
    info!("  GET /health");
    info!("  GET /api/stops?page=&per_page=");
    info!("  GET /api/stops/nearby?lat=&lon=&radius=");
    info!("  GET /api/search?start_lat=&start_lon=&end_lat=&end_lon=&time=");
    info!("  GET /api/routes?route_type=&page=&per_page=");
    info!("  GET /api/routes/{{route_id}}");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically reload the schedule snapshot. A failed reload keeps the
/// current snapshot.
async fn reload_schedule(schedule: Arc<ScheduleHandle>, path: PathBuf, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.tick().await; // First tick is immediate, skip it
    loop {
        interval.tick().await;
        let path = path.clone();
        match tokio::task::spawn_blocking(move || ScheduleStore::load_json(path)).await {
            Ok(Ok((store, report))) => {
                let version = schedule.replace(store).await;
                info!(version, skipped = report.skipped(), "schedule reloaded");
            }
            Ok(Err(e)) => warn!(error = %e, "schedule reload failed, keeping current snapshot"),
            Err(e) => error!(error = %e, "schedule reload task failed"),
        }
    }
}
