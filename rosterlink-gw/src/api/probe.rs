//! Backing-server probe route

use axum::{extract::State, routing::get, Json, Router};

use crate::probe::{probe_targets, ProbeReport};
use crate::AppState;

/// GET /probe
///
/// Probe every configured backing server concurrently and report
/// per-target reachability.
pub async fn probe(State(state): State<AppState>) -> Json<ProbeReport> {
    let report = probe_targets(&state.http, &state.config.probe_targets).await;
    Json(report)
}

/// Build probe routes
pub fn probe_routes() -> Router<AppState> {
    Router::new().route("/probe", get(probe))
}
