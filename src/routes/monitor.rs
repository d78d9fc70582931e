use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use serde::Deserialize;
use tracing::debug;

use crate::aggregator::GLOBAL_HISTORY_CAPACITY;
use crate::alerts::ALERT_LOG_CAPACITY;
use crate::models::ReadingRecord;
use crate::simulation::SharedSimulation;
use crate::snapshot::Snapshot;

// ---

const DEFAULT_ALERT_LIMIT: usize = 10;
const DEFAULT_READING_LIMIT: usize = 50;

pub fn router() -> Router<SharedSimulation> {
    // ---
    Router::new()
        .route("/statistics", get(statistics))
        .route("/pollution-map", get(pollution_map))
        .route("/alerts", get(alerts))
        .route("/readings", get(readings))
        .route("/snapshot", get(snapshot))
}

/// `GET /statistics` – 204 until the first reading has been ingested.
async fn statistics(State(sim): State<SharedSimulation>) -> impl IntoResponse {
    // ---
    let stats = sim.lock().await.statistics();
    match stats {
        Some(stats) => (StatusCode::OK, Json(stats)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn pollution_map(State(sim): State<SharedSimulation>) -> impl IntoResponse {
    // ---
    let map = sim.lock().await.pollution_map();
    Json(map)
}

/// Query parameters for `GET /alerts`
#[derive(Debug, Deserialize)]
struct AlertsQuery {
    limit: Option<usize>,
}

async fn alerts(
    Query(params): Query<AlertsQuery>,
    State(sim): State<SharedSimulation>,
) -> impl IntoResponse {
    // ---
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ALERT_LIMIT)
        .min(ALERT_LOG_CAPACITY);
    debug!("GET /alerts - limit {}", limit);

    let alerts = sim.lock().await.recent_alerts(limit);
    Json(alerts)
}

/// Query parameters for filtering readings
#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    mote_id: Option<String>,
    limit: Option<usize>,
}

/// `GET /readings` – most recent global readings, oldest first, optionally
/// filtered to one mote. The limit applies after filtering.
async fn readings(
    Query(params): Query<ReadingsQuery>,
    State(sim): State<SharedSimulation>,
) -> impl IntoResponse {
    // ---
    let limit = params
        .limit
        .unwrap_or(DEFAULT_READING_LIMIT)
        .min(GLOBAL_HISTORY_CAPACITY);
    debug!("GET /readings - {:?}", params);

    let guard = sim.lock().await;
    let mut records: Vec<ReadingRecord> = guard
        .aggregator()
        .history()
        .iter()
        .rev()
        .filter(|r| params.mote_id.as_ref().map_or(true, |id| &r.mote_id == id))
        .take(limit)
        .map(ReadingRecord::from)
        .collect();
    drop(guard);

    records.reverse();
    Json(records)
}

async fn snapshot(State(sim): State<SharedSimulation>) -> impl IntoResponse {
    // ---
    let snapshot = Snapshot::capture(&*sim.lock().await);
    Json(snapshot)
}
