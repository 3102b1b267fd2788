//! REST destination-store route group
//!
//! Bulk-create and snapshot passthroughs, the unified display view over the
//! snapshot, and the source → REST transfer pipeline trigger.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use rosterlink_common::model::{PlayerWrite, StoreSnapshot, Team, TransferSummary, UnifiedRow};

use crate::error::ApiResult;
use crate::transfer::{run_transfer, DestinationStore};
use crate::unified::build_unified_rows;
use crate::AppState;

/// POST /rest/teams
pub async fn create_teams(
    State(state): State<AppState>,
    Json(teams): Json<Vec<Team>>,
) -> ApiResult<Json<Value>> {
    state.rest.create_teams(&teams).await?;
    Ok(Json(json!({ "message": "Teams created successfully" })))
}

/// POST /rest/players
pub async fn create_players(
    State(state): State<AppState>,
    Json(players): Json<Vec<PlayerWrite>>,
) -> ApiResult<Json<Value>> {
    state.rest.create_players(&players).await?;
    Ok(Json(json!({ "message": "Players created successfully" })))
}

/// GET /rest/data
///
/// Full current destination-store contents as `{teams, players}`.
pub async fn data(State(state): State<AppState>) -> ApiResult<Json<StoreSnapshot>> {
    let snapshot = state.rest.fetch_all().await?;
    Ok(Json(snapshot))
}

/// POST /rest/clear
pub async fn clear(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.rest.clear().await?;
    Ok(Json(json!({ "message": "Destination store cleared" })))
}

/// GET /rest/view
///
/// Destination snapshot flattened into unified display rows.
pub async fn view(State(state): State<AppState>) -> ApiResult<Json<Vec<UnifiedRow>>> {
    let snapshot = state.rest.fetch_all().await?;
    Ok(Json(build_unified_rows(&snapshot)))
}

/// POST /rest/transfer
///
/// Run the full source → REST pipeline: query the triple store, normalize,
/// then clear/write/read-back/rewrite/write against the destination.
pub async fn transfer(State(state): State<AppState>) -> ApiResult<Json<TransferSummary>> {
    let entities = super::sparql::roster_entities(&state).await?;
    let report = run_transfer(&state.rest, &entities, state.config.transfer).await?;

    tracing::info!(
        teams = report.teams_written,
        players = report.players_written,
        skipped = report.players_skipped,
        "Source transfer completed"
    );
    Ok(Json(report.into_summary()))
}

/// Build REST store routes
pub fn rest_routes() -> Router<AppState> {
    Router::new()
        .route("/rest/teams", post(create_teams))
        .route("/rest/players", post(create_players))
        .route("/rest/data", get(data))
        .route("/rest/clear", post(clear))
        .route("/rest/view", get(view))
        .route("/rest/transfer", post(transfer))
}
