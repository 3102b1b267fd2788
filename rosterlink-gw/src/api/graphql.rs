//! GraphQL store route group
//!
//! Passthrough query execution, the unified display view over the GraphQL
//! store's contents, and the REST → GraphQL transfer hop.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use rosterlink_common::model::{StoreSnapshot, TransferSummary, UnifiedRow};

use crate::clients::graphql::ALL_DATA_QUERY;
use crate::clients::GraphqlResponse;
use crate::error::{ApiError, ApiResult};
use crate::transfer::transfer_to_graphql;
use crate::unified::build_unified_rows;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GraphqlQueryBody {
    /// GraphQL document to execute
    pub query: String,
    #[serde(default)]
    pub variables: Option<Value>,
}

/// POST /graphql/query
///
/// Forward an arbitrary GraphQL document and return the `{data, errors}`
/// envelope verbatim. A store that does not answer the reachability probe
/// yields 503 rather than a slow network error.
pub async fn query(
    State(state): State<AppState>,
    Json(body): Json<GraphqlQueryBody>,
) -> ApiResult<Json<GraphqlResponse>> {
    if !state.graphql.is_reachable().await {
        return Err(ApiError::ServiceUnavailable(
            "GraphQL server is not reachable".to_string(),
        ));
    }
    let response = state
        .graphql
        .execute(&body.query, body.variables.as_ref())
        .await?;
    Ok(Json(response))
}

/// GET /graphql/view
///
/// Fetch all teams and players from the GraphQL store and flatten them into
/// unified display rows.
pub async fn view(State(state): State<AppState>) -> ApiResult<Json<Vec<UnifiedRow>>> {
    let response = state.graphql.execute(ALL_DATA_QUERY, None).await?;
    if let Some(errors) = &response.errors {
        if !errors.is_empty() {
            return Err(ApiError::BadGateway(format!(
                "GraphQL query failed: {}",
                summarize_errors(errors)
            )));
        }
    }

    let snapshot = snapshot_from_response(&response)?;
    Ok(Json(build_unified_rows(&snapshot)))
}

/// POST /graphql/transfer
///
/// Copy the current REST store contents into the GraphQL store.
pub async fn transfer(State(state): State<AppState>) -> ApiResult<Json<TransferSummary>> {
    let summary = transfer_to_graphql(&state.rest, &state.graphql).await?;
    tracing::info!(
        successful = summary.successful_operations,
        failed = summary.failed_operations,
        "GraphQL transfer completed"
    );
    Ok(Json(summary))
}

fn snapshot_from_response(response: &GraphqlResponse) -> Result<StoreSnapshot, ApiError> {
    let data = response.data.as_ref().ok_or_else(no_data)?;
    let teams = data.get("allTeams").cloned().ok_or_else(no_data)?;
    let players = data.get("allPlayers").cloned().ok_or_else(no_data)?;

    let snapshot = StoreSnapshot {
        teams: serde_json::from_value(teams)
            .map_err(|e| ApiError::BadGateway(format!("Malformed GraphQL team data: {e}")))?,
        players: serde_json::from_value(players)
            .map_err(|e| ApiError::BadGateway(format!("Malformed GraphQL player data: {e}")))?,
    };
    Ok(snapshot)
}

fn no_data() -> ApiError {
    ApiError::NotFound(
        "No data found on GraphQL server. Try transferring data first.".to_string(),
    )
}

fn summarize_errors(errors: &[Value]) -> String {
    errors
        .iter()
        .map(|e| {
            e.get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build GraphQL store routes
pub fn graphql_routes() -> Router<AppState> {
    Router::new()
        .route("/graphql/query", post(query))
        .route("/graphql/view", get(view))
        .route("/graphql/transfer", post(transfer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_requires_both_collections() {
        let response = GraphqlResponse {
            data: Some(json!({ "allTeams": [] })),
            errors: None,
        };
        assert!(snapshot_from_response(&response).is_err());
    }

    #[test]
    fn snapshot_parses_full_payload() {
        let response = GraphqlResponse {
            data: Some(json!({
                "allTeams": [{ "id": 1, "name": "Lakers", "sport": "Basketball" }],
                "allPlayers": [{ "id": 2, "name": "LeBron James", "team_id": 1 }],
            })),
            errors: None,
        };
        let snapshot = snapshot_from_response(&response).unwrap();
        assert_eq!(snapshot.teams.len(), 1);
        assert_eq!(snapshot.players[0].team_id, Some(1));
    }

    #[test]
    fn error_messages_are_joined() {
        let errors = vec![json!({ "message": "bad field" }), json!({})];
        assert_eq!(summarize_errors(&errors), "bad field; unknown error");
    }
}
