//! Triple-store route group
//!
//! Passthrough queries plus the two reshaped projections of the fixed
//! roster query: normalized entities and the JSON-LD graph.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::clients::sparql::ROSTER_QUERY;
use crate::error::ApiResult;
use crate::jsonld::{project_bindings, JsonLdDocument};
use crate::normalize::{normalize_bindings, NormalizedEntities};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SparqlQueryParams {
    /// SPARQL SELECT query string
    pub query: String,
}

/// GET /sparql/query?query=...
///
/// Forward an arbitrary SELECT query and return the results envelope
/// verbatim.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<SparqlQueryParams>,
) -> ApiResult<Json<Value>> {
    let results = state.sparql.select_raw(&params.query).await?;
    Ok(Json(results))
}

/// GET /sparql/entities
///
/// Run the fixed roster query and normalize its bindings into deduplicated
/// teams and players.
pub async fn entities(State(state): State<AppState>) -> ApiResult<Json<NormalizedEntities>> {
    let entities = roster_entities(&state).await?;
    Ok(Json(entities))
}

/// GET /sparql/jsonld
///
/// Run the fixed roster query and project its bindings into a linked-data
/// graph document.
pub async fn jsonld(State(state): State<AppState>) -> ApiResult<Json<JsonLdDocument>> {
    let results = state.sparql.select(ROSTER_QUERY).await?;
    let document = project_bindings(&results.results.bindings)?;
    Ok(Json(document))
}

/// Fetch and normalize the roster. Shared with the transfer pipeline route.
pub(crate) async fn roster_entities(state: &AppState) -> ApiResult<NormalizedEntities> {
    let results = state.sparql.select(ROSTER_QUERY).await?;
    Ok(normalize_bindings(
        &results.results.bindings,
        state.config.transfer.merge_policy,
    ))
}

/// Build triple-store routes
pub fn sparql_routes() -> Router<AppState> {
    Router::new()
        .route("/sparql/query", get(query))
        .route("/sparql/entities", get(entities))
        .route("/sparql/jsonld", get(jsonld))
}
