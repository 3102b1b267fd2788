//! Binding normalization
//!
//! Converts flat SPARQL binding rows (each row mixing team and player
//! variables) into two deduplicated entity collections: teams keyed by name
//! and players keyed by name, both in first-seen order.
//!
//! The merge policy is an explicit configuration choice. Under the default
//! `FirstWins`, the first row carrying a new name is authoritative and later
//! rows for that name are ignored entirely; under `LastWins`, later rows
//! overwrite any optional field they bind a value for.

use rosterlink_common::config::MergePolicy;
use rosterlink_common::model::{Binding, Player, Team};
use serde::Serialize;
use std::collections::HashMap;

/// Output of one normalization pass. Entity names are unique within each
/// collection and ordering follows first appearance in the input rows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedEntities {
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
}

/// Normalize an ordered sequence of binding rows into entities.
///
/// A row missing a team name is skipped for team construction but may still
/// register a player, and vice versa.
pub fn normalize_bindings(bindings: &[Binding], policy: MergePolicy) -> NormalizedEntities {
    let mut teams: Vec<Team> = Vec::new();
    let mut team_index: HashMap<String, usize> = HashMap::new();
    let mut players: Vec<Player> = Vec::new();
    let mut player_index: HashMap<String, usize> = HashMap::new();

    for row in bindings {
        if let Some(team_name) = row.value("teamName") {
            match team_index.get(team_name) {
                None => {
                    team_index.insert(team_name.to_string(), teams.len());
                    teams.push(team_from_row(team_name, row));
                }
                Some(&at) if policy == MergePolicy::LastWins => merge_team(&mut teams[at], row),
                Some(_) => {}
            }
        }

        if let Some(player_name) = row.value("playerName") {
            match player_index.get(player_name) {
                None => {
                    player_index.insert(player_name.to_string(), players.len());
                    players.push(player_from_row(player_name, row));
                }
                Some(&at) if policy == MergePolicy::LastWins => {
                    merge_player(&mut players[at], row)
                }
                Some(_) => {}
            }
        }
    }

    NormalizedEntities { teams, players }
}

fn opt(row: &Binding, var: &str) -> Option<String> {
    row.value(var).map(str::to_string)
}

fn team_from_row(name: &str, row: &Binding) -> Team {
    Team {
        name: name.to_string(),
        url: opt(row, "teamUrl"),
        description: opt(row, "teamDescription"),
        founding_date: opt(row, "teamFoundingDate"),
        sport: opt(row, "teamSport"),
        location: opt(row, "teamLocation"),
        coach: opt(row, "teamCoach"),
    }
}

fn player_from_row(name: &str, row: &Binding) -> Player {
    Player {
        name: name.to_string(),
        height: opt(row, "playerHeight"),
        weight: opt(row, "playerWeight"),
        nationality: opt(row, "playerNationality"),
        team_name: opt(row, "teamName"),
    }
}

fn merge_team(team: &mut Team, row: &Binding) {
    overwrite(&mut team.url, row, "teamUrl");
    overwrite(&mut team.description, row, "teamDescription");
    overwrite(&mut team.founding_date, row, "teamFoundingDate");
    overwrite(&mut team.sport, row, "teamSport");
    overwrite(&mut team.location, row, "teamLocation");
    overwrite(&mut team.coach, row, "teamCoach");
}

fn merge_player(player: &mut Player, row: &Binding) {
    overwrite(&mut player.height, row, "playerHeight");
    overwrite(&mut player.weight, row, "playerWeight");
    overwrite(&mut player.nationality, row, "playerNationality");
    overwrite(&mut player.team_name, row, "teamName");
}

fn overwrite(field: &mut Option<String>, row: &Binding, var: &str) {
    if let Some(value) = row.value(var) {
        *field = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lakers_rows() -> Vec<Binding> {
        vec![
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("playerName", "A")
                .bind("playerNationality", "American"),
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("playerName", "B")
                .bind("playerNationality", "American"),
        ]
    }

    #[test]
    fn deduplicates_teams_and_players_by_name() {
        let entities = normalize_bindings(&lakers_rows(), MergePolicy::FirstWins);

        assert_eq!(entities.teams.len(), 1);
        assert_eq!(entities.teams[0].name, "Lakers");
        assert_eq!(entities.teams[0].url, None);

        assert_eq!(entities.players.len(), 2);
        assert_eq!(entities.players[0].name, "A");
        assert_eq!(entities.players[0].team_name.as_deref(), Some("Lakers"));
        assert_eq!(entities.players[1].name, "B");
    }

    #[test]
    fn first_seen_field_values_win() {
        let rows = vec![
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("teamUrl", "https://first.example"),
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("teamUrl", "https://second.example"),
        ];

        let entities = normalize_bindings(&rows, MergePolicy::FirstWins);
        assert_eq!(
            entities.teams[0].url.as_deref(),
            Some("https://first.example")
        );
    }

    #[test]
    fn last_wins_overwrites_bound_fields_only() {
        let rows = vec![
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("teamUrl", "https://first.example")
                .bind("teamSport", "Basketball"),
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("teamUrl", "https://second.example"),
        ];

        let entities = normalize_bindings(&rows, MergePolicy::LastWins);
        assert_eq!(
            entities.teams[0].url.as_deref(),
            Some("https://second.example")
        );
        // second row left the sport unbound, value survives
        assert_eq!(entities.teams[0].sport.as_deref(), Some("Basketball"));
    }

    #[test]
    fn row_without_team_name_still_registers_player() {
        let rows = vec![Binding::default()
            .bind("playerName", "Orphan")
            .bind("playerHeight", "201cm")];

        let entities = normalize_bindings(&rows, MergePolicy::FirstWins);
        assert!(entities.teams.is_empty());
        assert_eq!(entities.players.len(), 1);
        assert_eq!(entities.players[0].team_name, None);
    }

    #[test]
    fn row_without_player_name_still_registers_team() {
        let rows = vec![Binding::default().bind("teamName", "Lakers")];

        let entities = normalize_bindings(&rows, MergePolicy::FirstWins);
        assert_eq!(entities.teams.len(), 1);
        assert!(entities.players.is_empty());
    }

    #[test]
    fn teams_preserve_first_seen_order() {
        let rows = vec![
            Binding::default().bind("teamName", "Celtics"),
            Binding::default().bind("teamName", "Lakers"),
            Binding::default().bind("teamName", "Celtics"),
        ];

        let entities = normalize_bindings(&rows, MergePolicy::FirstWins);
        let names: Vec<&str> = entities.teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Celtics", "Lakers"]);
    }
}
