//! Entity and wire models shared across the gateway
//!
//! Three families of shapes live here:
//! - SPARQL JSON results (the source representation: flat binding rows)
//! - Normalized entities (teams and players keyed by name)
//! - Destination-store shapes (numeric ids assigned by the store)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One cell of a SPARQL binding row.
///
/// The triple store reports a `type` alongside each value (`uri`, `literal`,
/// ...); the gateway only ever consumes the `value` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    pub value: String,
}

impl BindingValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value_type: Some("literal".to_string()),
            value: value.into(),
        }
    }
}

/// One flat result row from a source query: variable name -> cell.
///
/// All fields are optional; a row may describe a team, a player, or both,
/// depending on which variables are bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Binding(pub HashMap<String, BindingValue>);

impl Binding {
    /// Scalar value of a bound variable, or `None` when the row leaves it unbound.
    pub fn value(&self, var: &str) -> Option<&str> {
        self.0.get(var).map(|cell| cell.value.as_str())
    }

    /// Bind a literal value (test and fixture helper).
    pub fn bind(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(var.into(), BindingValue::literal(value));
        self
    }
}

/// `head` section of a SPARQL JSON results envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

/// `results` section: the ordered binding rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlBindings {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// SPARQL JSON results envelope (`application/sparql-results+json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: SparqlHead,
    #[serde(default)]
    pub results: SparqlBindings,
}

/// Normalized team entity, keyed by `name`.
///
/// Absent optional fields are an explicit `None`, not an omission: the
/// normalizer records "no value seen" rather than dropping the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "foundingDate")]
    pub founding_date: Option<String>,
    pub sport: Option<String>,
    pub location: Option<String>,
    pub coach: Option<String>,
}

impl Team {
    /// Team with only the identity key set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            description: None,
            founding_date: None,
            sport: None,
            location: None,
            coach: None,
        }
    }
}

/// Normalized player entity, keyed by `name`, referencing its team by name.
///
/// The team reference stays a name until transfer time; only the transfer
/// pipeline resolves it to a destination-assigned numeric id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub nationality: Option<String>,
    #[serde(rename = "teamName")]
    pub team_name: Option<String>,
}

/// Player shape written to the destination store: the team-name reference is
/// replaced by the destination's numeric team id, and unset optional fields
/// are omitted from the body entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWrite {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    pub team_id: i64,
}

/// Team as stored by a destination store: numeric id plus whatever scalar
/// attributes the store kept. Unknown attributes are preserved as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredTeam {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

/// Player as stored by a destination store.
///
/// Only `id`, `name` and the `team_id` foreign key are assumed; every other
/// attribute is an arbitrary scalar carried in `attrs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredPlayer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(flatten)]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

/// Full destination-store contents as read back after a bulk write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub teams: Vec<StoredTeam>,
    #[serde(default)]
    pub players: Vec<StoredPlayer>,
}

/// Display-only projection flattening arbitrary entity attributes into one
/// table row regardless of source shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRow {
    pub team_name: String,
    pub player_name: String,
    pub property: String,
    pub value: String,
}

/// Outcome summary of a cross-store transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSummary {
    pub total_operations: usize,
    pub successful_operations: usize,
    pub failed_operations: usize,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sparql_results_envelope() {
        let json = r#"{
            "head": {"vars": ["teamName", "playerName"]},
            "results": {"bindings": [
                {"teamName": {"type": "literal", "value": "Lakers"},
                 "playerName": {"type": "literal", "value": "A"}}
            ]}
        }"#;

        let results: SparqlResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.head.vars, vec!["teamName", "playerName"]);
        assert_eq!(results.results.bindings.len(), 1);
        assert_eq!(results.results.bindings[0].value("teamName"), Some("Lakers"));
        assert_eq!(results.results.bindings[0].value("coach"), None);
    }

    #[test]
    fn stored_player_preserves_unknown_attributes() {
        let json = r#"{"id": 3, "name": "A", "team_id": 7, "nationality": "American"}"#;
        let player: StoredPlayer = serde_json::from_str(json).unwrap();

        assert_eq!(player.id, 3);
        assert_eq!(player.team_id, Some(7));
        assert_eq!(
            player.attrs.get("nationality").and_then(|v| v.as_str()),
            Some("American")
        );
    }

    #[test]
    fn player_write_omits_unset_fields() {
        let write = PlayerWrite {
            name: "A".to_string(),
            height: None,
            weight: None,
            nationality: Some("American".to_string()),
            team_id: 7,
        };

        let json = serde_json::to_value(&write).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("nationality"));
        assert!(!obj.contains_key("height"));
        assert_eq!(obj.get("team_id").and_then(|v| v.as_i64()), Some(7));
    }
}
