//! Ranking route
//!
//! Flattens ranking-query bindings into fact lines and forwards them to the
//! analysis endpoint. The route always answers 200 with either a success or
//! a failure payload, so a missing API key or a dead triple store surfaces
//! as structured JSON instead of a gateway error page.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use rosterlink_common::model::Binding;

use crate::clients::sparql::RANKING_QUERY;
use crate::clients::AnalysisError;
use crate::config::ANALYSIS_API_KEY_ENV;
use crate::AppState;

const MISSING_FIELD: &str = "N/A";

/// Ranking endpoint response. Success and failure are distinguished by
/// shape, matching the analysis payload callers already consume.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RankingReply {
    Failure {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
    },
    Success {
        players_count: usize,
        analysis: String,
        model_used: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tokens_used: Option<u64>,
    },
}

impl RankingReply {
    fn failure(error: impl Into<String>) -> Self {
        RankingReply::Failure {
            error: error.into(),
            suggestion: None,
        }
    }

    fn failure_with_suggestion(error: impl Into<String>, suggestion: impl Into<String>) -> Self {
        RankingReply::Failure {
            error: error.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// GET /ranking
pub async fn ranking(State(state): State<AppState>) -> Json<RankingReply> {
    let results = match state.sparql.select(RANKING_QUERY).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(error = %e, "Ranking query against the triple store failed");
            return Json(RankingReply::failure_with_suggestion(
                format!("Failed to query player data: {e}"),
                "Check that the triple store is running and reachable",
            ));
        }
    };

    let player_lines = flatten_player_lines(&results.results.bindings);
    if player_lines.is_empty() {
        return Json(RankingReply::failure(
            "No player data found for the 2024 season",
        ));
    }

    match state.analysis.rank_players(&player_lines).await {
        Ok(analysis) => Json(RankingReply::Success {
            players_count: player_lines.len(),
            analysis: analysis.text,
            model_used: analysis.model,
            tokens_used: analysis.tokens_used,
        }),
        Err(AnalysisError::MissingApiKey) => Json(RankingReply::failure_with_suggestion(
            "Analysis API key is not configured",
            format!(
                "Set the {ANALYSIS_API_KEY_ENV} environment variable or the analysis.api_key config field"
            ),
        )),
        Err(e) => {
            tracing::warn!(error = %e, "Analysis endpoint call failed");
            Json(RankingReply::failure(format!(
                "Failed to generate ranking: {e}"
            )))
        }
    }
}

/// One fact line per binding row, in row order. Missing fields render as
/// `N/A` so every line keeps the same shape for the prompt.
fn flatten_player_lines(bindings: &[Binding]) -> Vec<String> {
    bindings
        .iter()
        .filter_map(|row| {
            let name = row.value("playerName")?;
            let team = row.value("teamName").unwrap_or(MISSING_FIELD);
            let height = row.value("playerHeight").unwrap_or(MISSING_FIELD);
            let weight = row.value("playerWeight").unwrap_or(MISSING_FIELD);
            let stats = row.value("playerStats").unwrap_or(MISSING_FIELD);
            Some(format!(
                "- {name} ({team}) - Height: {height}, Weight: {weight}, Stats: {stats}"
            ))
        })
        .collect()
}

/// Build ranking routes
pub fn ranking_routes() -> Router<AppState> {
    Router::new().route("/ranking", get(ranking))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_use_placeholders_for_missing_fields() {
        let rows = vec![Binding::default()
            .bind("playerName", "LeBron James")
            .bind("teamName", "Lakers")
            .bind("playerHeight", "206 cm")];

        let lines = flatten_player_lines(&rows);
        assert_eq!(
            lines,
            vec!["- LeBron James (Lakers) - Height: 206 cm, Weight: N/A, Stats: N/A"]
        );
    }

    #[test]
    fn rows_without_a_name_are_dropped() {
        let rows = vec![Binding::default().bind("teamName", "Lakers")];
        assert!(flatten_player_lines(&rows).is_empty());
    }

    #[test]
    fn failure_reply_omits_absent_suggestion() {
        let reply = RankingReply::failure("boom");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["error"], "boom");
        assert!(json.get("suggestion").is_none());
    }
}
