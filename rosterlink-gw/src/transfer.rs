//! Cross-store transfer pipelines
//!
//! Two hops live here:
//! - source → REST: normalized entities are written to the REST destination
//!   store, which assigns its own numeric ids; player team references are
//!   rewritten from names to those ids via a read-back step.
//! - REST → GraphQL: the REST snapshot is replayed into the GraphQL store as
//!   one create mutation per entity, with per-operation success counting.
//!
//! Neither pipeline rolls back on partial failure: a fatal player-write
//! failure leaves the already-written teams in place, and the summary or
//! error reports that state rather than undoing it.

use async_trait::async_trait;
use rosterlink_common::config::{ClearMode, TransferPolicy, UnresolvedPolicy};
use rosterlink_common::model::{
    PlayerWrite, StoreSnapshot, StoredPlayer, StoredTeam, Team, TransferSummary,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::clients::graphql::GraphqlClient;
use crate::clients::rest::RestError;
use crate::normalize::NormalizedEntities;

/// Mutations are sent in groups of this size, with per-group progress logging
const MUTATION_BATCH_SIZE: usize = 10;

const CREATE_TEAM_MUTATION: &str = r#"
mutation CreateTeam($name: String!, $url: String!, $description: String!,
                    $foundingDate: String!, $sport: String!, $location: String!, $coach: String!) {
    createTeam(
        name: $name,
        url: $url,
        description: $description,
        foundingDate: $foundingDate,
        sport: $sport,
        location: $location,
        coach: $coach
    ) {
        id
        name
    }
}
"#;

const CREATE_PLAYER_MUTATION: &str = r#"
mutation CreatePlayer($name: String!, $height: String!, $weight: String!,
                      $nationality: String!, $team_id: Int!) {
    createPlayer(
        name: $name,
        height: $height,
        weight: $weight,
        nationality: $nationality,
        team_id: $team_id
    ) {
        id
        name
    }
}
"#;

/// Write API of a destination store that assigns its own numeric ids
#[async_trait]
pub trait DestinationStore {
    /// Remove all current contents
    async fn clear(&self) -> Result<(), RestError>;
    /// Bulk-create teams; the store assigns ids
    async fn create_teams(&self, teams: &[Team]) -> Result<(), RestError>;
    /// Bulk-create players carrying resolved team ids
    async fn create_players(&self, players: &[PlayerWrite]) -> Result<(), RestError>;
    /// Read back the full current contents
    async fn fetch_all(&self) -> Result<StoreSnapshot, RestError>;
}

/// Result of looking a team name up in the destination snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamIdResolution {
    /// Exactly one destination team carries this name
    Found(i64),
    /// More than one destination team carries this name
    Ambiguous,
    /// No destination team carries this name
    NotFound,
}

/// Source → REST pipeline failure
#[derive(Debug, Error)]
pub enum TransferError {
    /// Clear step failed under `ClearMode::Required`
    #[error("Destination clear failed: {0}")]
    ClearFailed(RestError),

    /// Team bulk-write failed; nothing was transferred
    #[error("Team write failed: {0}")]
    TeamWriteFailed(RestError),

    /// Could not read back destination contents after the team write
    #[error("Destination read-back failed: {0}")]
    ReadBackFailed(RestError),

    /// A player references a team name absent from the destination
    #[error("Player '{player}' references team {team:?} which the destination does not hold")]
    UnresolvedTeam {
        player: String,
        team: Option<String>,
    },

    /// A player references a team name held by several destination teams
    #[error("Player '{player}' references team '{team}' which matches multiple destination teams")]
    AmbiguousTeam { player: String, team: String },

    /// Player bulk-write failed. Teams are already written at this point;
    /// the destination is left in that intermediate state.
    #[error("Player write failed, destination retains the already-written teams: {0}")]
    PlayerWriteFailed(RestError),
}

/// REST → GraphQL pipeline failure (per-operation failures are counted in
/// the summary instead)
#[derive(Debug, Error)]
pub enum GraphqlTransferError {
    #[error("GraphQL server is not reachable; start it before transferring")]
    ServiceUnavailable,

    #[error("Failed to fetch the snapshot to transfer: {0}")]
    Snapshot(RestError),
}

/// What the source → REST pipeline accomplished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub teams_written: usize,
    pub players_written: usize,
    pub players_skipped: usize,
}

impl TransferReport {
    pub fn into_summary(self) -> TransferSummary {
        let successful = self.teams_written + self.players_written;
        TransferSummary {
            total_operations: successful + self.players_skipped,
            successful_operations: successful,
            failed_operations: self.players_skipped,
            message: format!(
                "Transfer completed. {} successful, {} failed",
                successful, self.players_skipped
            ),
        }
    }
}

/// Build the name → id lookup from a destination snapshot. Duplicate names
/// degrade to `Ambiguous` rather than silently picking one id.
pub fn resolve_team_ids(snapshot: &StoreSnapshot) -> HashMap<String, TeamIdResolution> {
    let mut lookup = HashMap::new();
    for team in &snapshot.teams {
        lookup
            .entry(team.name.clone())
            .and_modify(|resolution| *resolution = TeamIdResolution::Ambiguous)
            .or_insert(TeamIdResolution::Found(team.id));
    }
    lookup
}

/// Run the source → REST transfer pipeline.
///
/// Steps, in order: clear (per `ClearMode`), team bulk-write (fatal on
/// failure), read-back, team-id resolution and player rewrite (unresolved
/// references handled per `UnresolvedPolicy`), player bulk-write (fatal).
pub async fn run_transfer<S: DestinationStore + Sync + ?Sized>(
    store: &S,
    entities: &NormalizedEntities,
    policy: TransferPolicy,
) -> Result<TransferReport, TransferError> {
    match policy.clear_mode {
        ClearMode::Skip => {}
        ClearMode::BestEffort => {
            if let Err(e) = store.clear().await {
                tracing::warn!(error = %e, "Destination clear failed, continuing with transfer");
            }
        }
        ClearMode::Required => store.clear().await.map_err(TransferError::ClearFailed)?,
    }

    store
        .create_teams(&entities.teams)
        .await
        .map_err(TransferError::TeamWriteFailed)?;

    let snapshot = store
        .fetch_all()
        .await
        .map_err(TransferError::ReadBackFailed)?;
    let lookup = resolve_team_ids(&snapshot);

    let mut writes = Vec::with_capacity(entities.players.len());
    let mut skipped = 0usize;
    for player in &entities.players {
        let resolution = player
            .team_name
            .as_deref()
            .and_then(|name| lookup.get(name).copied())
            .unwrap_or(TeamIdResolution::NotFound);

        match resolution {
            TeamIdResolution::Found(team_id) => writes.push(PlayerWrite {
                name: player.name.clone(),
                height: player.height.clone(),
                weight: player.weight.clone(),
                nationality: player.nationality.clone(),
                team_id,
            }),
            TeamIdResolution::Ambiguous => {
                let team = player.team_name.clone().unwrap_or_default();
                if policy.on_unresolved == UnresolvedPolicy::Fail {
                    return Err(TransferError::AmbiguousTeam {
                        player: player.name.clone(),
                        team,
                    });
                }
                tracing::warn!(player = %player.name, team = %team, "Skipping player with ambiguous team reference");
                skipped += 1;
            }
            TeamIdResolution::NotFound => {
                if policy.on_unresolved == UnresolvedPolicy::Fail {
                    return Err(TransferError::UnresolvedTeam {
                        player: player.name.clone(),
                        team: player.team_name.clone(),
                    });
                }
                tracing::warn!(player = %player.name, team = ?player.team_name, "Skipping player with unresolved team reference");
                skipped += 1;
            }
        }
    }

    store
        .create_players(&writes)
        .await
        .map_err(TransferError::PlayerWriteFailed)?;

    Ok(TransferReport {
        teams_written: entities.teams.len(),
        players_written: writes.len(),
        players_skipped: skipped,
    })
}

/// Run the REST → GraphQL transfer.
///
/// Reachability is checked first; the clear is best-effort; each validated
/// entity becomes one create mutation, executed sequentially in batches,
/// with successes and failures counted rather than aborting mid-stream.
pub async fn transfer_to_graphql<S: DestinationStore + Sync + ?Sized>(
    source: &S,
    graphql: &GraphqlClient,
) -> Result<TransferSummary, GraphqlTransferError> {
    if !graphql.is_reachable().await {
        return Err(GraphqlTransferError::ServiceUnavailable);
    }

    clear_graphql_store(graphql).await;

    let snapshot = source
        .fetch_all()
        .await
        .map_err(GraphqlTransferError::Snapshot)?;

    if snapshot.teams.is_empty() && snapshot.players.is_empty() {
        return Ok(TransferSummary {
            total_operations: 0,
            successful_operations: 0,
            failed_operations: 0,
            message: "No data found to transfer".to_string(),
        });
    }

    let mut operations: Vec<Value> = Vec::new();
    for team in &snapshot.teams {
        match team_variables(team) {
            Some(variables) => operations.push(json!({
                "query": CREATE_TEAM_MUTATION,
                "variables": variables,
            })),
            None => tracing::warn!(id = team.id, "Skipping invalid team without a name"),
        }
    }
    for player in &snapshot.players {
        match player_variables(player) {
            Some(variables) => operations.push(json!({
                "query": CREATE_PLAYER_MUTATION,
                "variables": variables,
            })),
            None => {
                tracing::warn!(id = player.id, name = %player.name, "Skipping invalid player without a name or team id")
            }
        }
    }

    let total = operations.len();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for batch in operations.chunks(MUTATION_BATCH_SIZE) {
        for operation in batch {
            let query = operation["query"].as_str().unwrap_or_default();
            let variables = &operation["variables"];
            match graphql.execute(query, Some(variables)).await {
                Ok(response) if response.is_success() => successful += 1,
                Ok(response) => {
                    failed += 1;
                    tracing::warn!(errors = ?response.errors, "GraphQL operation failed");
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(error = %e, "GraphQL operation failed");
                }
            }
        }
        tracing::debug!(successful, failed, total, "GraphQL transfer progress");
    }

    Ok(TransferSummary {
        total_operations: total,
        successful_operations: successful,
        failed_operations: failed,
        message: format!(
            "Transfer completed. {} successful, {} failed",
            successful, failed
        ),
    })
}

/// Best-effort clear of the GraphQL store: enumerate current ids and issue
/// one delete mutation each. Failures are logged and never abort the
/// transfer; the store may simply be empty or not support deletion.
async fn clear_graphql_store(graphql: &GraphqlClient) {
    let current = match graphql.execute("{ allTeams { id } allPlayers { id } }", None).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Could not enumerate existing GraphQL data, continuing with transfer");
            return;
        }
    };

    let Some(data) = current.data else { return };

    // players before teams, mirroring foreign-key direction
    for (collection, mutation) in [
        ("allPlayers", "deletePlayer"),
        ("allTeams", "deleteTeam"),
    ] {
        let Some(records) = data.get(collection).and_then(Value::as_array) else {
            continue;
        };
        for record in records {
            let Some(id) = record.get("id").and_then(Value::as_i64) else {
                continue;
            };
            let delete = format!("mutation {{ {}(id: {}) {{ id }} }}", mutation, id);
            if let Err(e) = graphql.execute(&delete, None).await {
                tracing::warn!(error = %e, id, "Failed to delete existing GraphQL record");
            }
        }
    }
}

fn attr_string(attrs: &serde_json::Map<String, Value>, key: &str) -> String {
    match attrs.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Variables for the team create mutation; `None` when the team fails
/// validation (a team must carry a name)
fn team_variables(team: &StoredTeam) -> Option<Value> {
    if team.name.is_empty() {
        return None;
    }
    Some(json!({
        "name": team.name,
        "url": attr_string(&team.attrs, "url"),
        "description": attr_string(&team.attrs, "description"),
        "foundingDate": attr_string(&team.attrs, "foundingDate"),
        "sport": attr_string(&team.attrs, "sport"),
        "location": attr_string(&team.attrs, "location"),
        "coach": attr_string(&team.attrs, "coach"),
    }))
}

/// Variables for the player create mutation; `None` when the player fails
/// validation (a player must carry a name and a team id)
fn player_variables(player: &StoredPlayer) -> Option<Value> {
    if player.name.is_empty() {
        return None;
    }
    let team_id = player.team_id?;
    Some(json!({
        "name": player.name,
        "height": attr_string(&player.attrs, "height"),
        "weight": attr_string(&player.attrs, "weight"),
        "nationality": attr_string(&player.attrs, "nationality"),
        "team_id": team_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_bindings;
    use rosterlink_common::config::MergePolicy;
    use rosterlink_common::model::Binding;
    use tokio::sync::Mutex;

    /// In-memory destination store. Ids are assigned from 7 upward in
    /// insertion order, so the first team always receives id 7.
    #[derive(Default)]
    struct MockStore {
        teams: Mutex<Vec<Team>>,
        players: Mutex<Vec<PlayerWrite>>,
        fail_clear: bool,
        fail_player_write: bool,
        duplicate_first_team: bool,
        cleared: Mutex<bool>,
    }

    #[async_trait]
    impl DestinationStore for MockStore {
        async fn clear(&self) -> Result<(), RestError> {
            if self.fail_clear {
                return Err(RestError::Api(404, "no clear support".to_string()));
            }
            self.teams.lock().await.clear();
            self.players.lock().await.clear();
            *self.cleared.lock().await = true;
            Ok(())
        }

        async fn create_teams(&self, teams: &[Team]) -> Result<(), RestError> {
            self.teams.lock().await.extend_from_slice(teams);
            Ok(())
        }

        async fn create_players(&self, players: &[PlayerWrite]) -> Result<(), RestError> {
            if self.fail_player_write {
                return Err(RestError::Api(500, "player write rejected".to_string()));
            }
            self.players.lock().await.extend_from_slice(players);
            Ok(())
        }

        async fn fetch_all(&self) -> Result<StoreSnapshot, RestError> {
            let mut teams: Vec<StoredTeam> = self
                .teams
                .lock()
                .await
                .iter()
                .enumerate()
                .map(|(at, team)| StoredTeam {
                    id: 7 + at as i64,
                    name: team.name.clone(),
                    attrs: Default::default(),
                })
                .collect();
            if self.duplicate_first_team {
                let mut duplicate = teams[0].clone();
                duplicate.id += 100;
                teams.push(duplicate);
            }
            Ok(StoreSnapshot {
                teams,
                players: Vec::new(),
            })
        }
    }

    fn lakers_entities() -> NormalizedEntities {
        let rows = vec![
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("playerName", "A")
                .bind("playerNationality", "American"),
            Binding::default()
                .bind("teamName", "Lakers")
                .bind("playerName", "B")
                .bind("playerNationality", "American"),
        ];
        normalize_bindings(&rows, MergePolicy::FirstWins)
    }

    #[tokio::test]
    async fn players_are_rewritten_to_destination_team_ids() {
        let store = MockStore::default();

        let report = run_transfer(&store, &lakers_entities(), TransferPolicy::default())
            .await
            .unwrap();

        assert_eq!(report.teams_written, 1);
        assert_eq!(report.players_written, 2);
        assert_eq!(report.players_skipped, 0);

        let players = store.players.lock().await;
        assert_eq!(players.len(), 2);
        // destination assigned Lakers id 7; both players carry it
        assert!(players.iter().all(|p| p.team_id == 7));
        assert_eq!(players[0].nationality.as_deref(), Some("American"));
    }

    #[tokio::test]
    async fn player_write_failure_leaves_teams_written() {
        let store = MockStore {
            fail_player_write: true,
            ..Default::default()
        };

        let err = run_transfer(&store, &lakers_entities(), TransferPolicy::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransferError::PlayerWriteFailed(RestError::Api(500, _))
        ));
        // no rollback: the destination keeps the teams
        assert_eq!(store.teams.lock().await.len(), 1);
        assert!(store.players.lock().await.is_empty());
    }

    #[tokio::test]
    async fn best_effort_clear_failure_does_not_abort() {
        let store = MockStore {
            fail_clear: true,
            ..Default::default()
        };

        let report = run_transfer(&store, &lakers_entities(), TransferPolicy::default())
            .await
            .unwrap();
        assert_eq!(report.players_written, 2);
    }

    #[tokio::test]
    async fn required_clear_failure_is_fatal() {
        let store = MockStore {
            fail_clear: true,
            ..Default::default()
        };
        let policy = TransferPolicy {
            clear_mode: ClearMode::Required,
            ..Default::default()
        };

        let err = run_transfer(&store, &lakers_entities(), policy)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::ClearFailed(_)));
        assert!(store.teams.lock().await.is_empty());
    }

    #[tokio::test]
    async fn unresolved_team_reference_fails_by_default() {
        let store = MockStore::default();
        let mut entities = lakers_entities();
        entities.players[1].team_name = Some("Ghosts".to_string());

        let err = run_transfer(&store, &entities, TransferPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::UnresolvedTeam { ref player, .. } if player == "B"
        ));
        // failure happens before any player write
        assert!(store.players.lock().await.is_empty());
    }

    #[tokio::test]
    async fn unresolved_team_reference_can_be_skipped() {
        let store = MockStore::default();
        let mut entities = lakers_entities();
        entities.players[1].team_name = None;

        let policy = TransferPolicy {
            on_unresolved: UnresolvedPolicy::Skip,
            ..Default::default()
        };
        let report = run_transfer(&store, &entities, policy).await.unwrap();

        assert_eq!(report.players_written, 1);
        assert_eq!(report.players_skipped, 1);
        assert_eq!(store.players.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_destination_names_are_ambiguous() {
        let store = MockStore {
            duplicate_first_team: true,
            ..Default::default()
        };

        let err = run_transfer(&store, &lakers_entities(), TransferPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::AmbiguousTeam { ref team, .. } if team == "Lakers"
        ));
    }

    #[tokio::test]
    async fn skip_clear_mode_preserves_existing_contents() {
        let store = MockStore::default();
        store.teams.lock().await.push(Team::named("Existing"));

        let policy = TransferPolicy {
            clear_mode: ClearMode::Skip,
            on_unresolved: UnresolvedPolicy::Skip,
            ..Default::default()
        };
        run_transfer(&store, &lakers_entities(), policy)
            .await
            .unwrap();

        assert!(!*store.cleared.lock().await);
        assert_eq!(store.teams.lock().await.len(), 2);
    }

    #[test]
    fn resolution_lookup_tags_duplicates() {
        let snapshot = StoreSnapshot {
            teams: vec![
                StoredTeam {
                    id: 1,
                    name: "Lakers".to_string(),
                    attrs: Default::default(),
                },
                StoredTeam {
                    id: 2,
                    name: "Lakers".to_string(),
                    attrs: Default::default(),
                },
                StoredTeam {
                    id: 3,
                    name: "Celtics".to_string(),
                    attrs: Default::default(),
                },
            ],
            players: Vec::new(),
        };

        let lookup = resolve_team_ids(&snapshot);
        assert_eq!(lookup.get("Lakers"), Some(&TeamIdResolution::Ambiguous));
        assert_eq!(lookup.get("Celtics"), Some(&TeamIdResolution::Found(3)));
        assert_eq!(lookup.get("Ghosts"), None);
    }

    #[test]
    fn invalid_entities_fail_validation() {
        let unnamed_team = StoredTeam {
            id: 1,
            name: String::new(),
            attrs: Default::default(),
        };
        assert!(team_variables(&unnamed_team).is_none());

        let player_without_team: StoredPlayer =
            serde_json::from_value(serde_json::json!({"id": 2, "name": "A"})).unwrap();
        assert!(player_variables(&player_without_team).is_none());

        let valid: StoredPlayer = serde_json::from_value(
            serde_json::json!({"id": 2, "name": "A", "team_id": 7, "height": "201cm"}),
        )
        .unwrap();
        let variables = player_variables(&valid).unwrap();
        assert_eq!(variables["team_id"], 7);
        assert_eq!(variables["height"], "201cm");
        // absent attributes degrade to empty strings for the non-null mutation variables
        assert_eq!(variables["weight"], "");
    }
}
