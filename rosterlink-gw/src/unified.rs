//! Unified view construction
//!
//! Flattens a `{teams, players}` store snapshot into the four-field display
//! rows used by the table view, one row per non-identifier player attribute.
//! Works identically over the REST read-back shape and the GraphQL query
//! shape: the only assumptions are that teams carry a name and id, and that
//! players carry a name, a `team_id` foreign key, and scalar attributes.

use rosterlink_common::model::{StoreSnapshot, StoredPlayer, UnifiedRow};
use serde_json::Value;

/// Player-name placeholder for a team without players
pub const NO_PLAYER: &str = "N/A";

/// Property/value emitted for a team with zero matched players
pub const NO_PLAYERS_PROPERTY: &str = "team_info";
pub const NO_PLAYERS_VALUE: &str = "No players found";

/// Build the flat display rows for a snapshot.
///
/// Teams are visited in snapshot order. A team with no matching players
/// yields exactly one placeholder row; otherwise each matched player yields
/// one row per attribute, skipping identifiers (`id`, `team_id`) and absent
/// or empty values.
pub fn build_unified_rows(snapshot: &StoreSnapshot) -> Vec<UnifiedRow> {
    let mut rows = Vec::new();

    for team in &snapshot.teams {
        let team_players: Vec<&StoredPlayer> = snapshot
            .players
            .iter()
            .filter(|player| player.team_id == Some(team.id))
            .collect();

        if team_players.is_empty() {
            rows.push(UnifiedRow {
                team_name: team.name.clone(),
                player_name: NO_PLAYER.to_string(),
                property: NO_PLAYERS_PROPERTY.to_string(),
                value: NO_PLAYERS_VALUE.to_string(),
            });
            continue;
        }

        for player in team_players {
            rows.push(UnifiedRow {
                team_name: team.name.clone(),
                player_name: player.name.clone(),
                property: "name".to_string(),
                value: player.name.clone(),
            });

            for (key, value) in &player.attrs {
                if key == "id" || key == "team_id" {
                    continue;
                }
                let Some(value) = scalar_value(value) else {
                    continue;
                };
                if value.is_empty() {
                    continue;
                }
                rows.push(UnifiedRow {
                    team_name: team.name.clone(),
                    player_name: player.name.clone(),
                    property: key.clone(),
                    value,
                });
            }
        }
    }

    rows
}

fn scalar_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
