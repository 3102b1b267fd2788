//! Linked-data projection
//!
//! Builds a JSON-LD style graph from the same flat binding rows the
//! normalizer consumes: one typed node per distinct team and player, plus
//! membership edges from each team to its players.
//!
//! Unlike the normalizer, absent optional fields are omitted from the node
//! entirely rather than carried as explicit nulls. Two distinct names
//! deriving to the same identifier is an error, never a silent merge.

use rosterlink_common::model::Binding;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Identifier prefix for derived node ids
pub const ID_PREFIX: &str = "ex";

/// Vocabulary bound to `@vocab` in the document context
pub const VOCAB: &str = "http://schema.org/";

/// Namespace bound to the `ex` prefix
pub const EX_NAMESPACE: &str = "http://example.org/";

/// Projection failure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProjectionError {
    /// Two distinct source names derived to the same node identifier
    #[error("identifier collision: '{existing}' and '{incoming}' both derive to {id}")]
    IdCollision {
        id: String,
        existing: String,
        incoming: String,
    },
}

/// JSON-LD document: context plus one flat `@graph` node sequence
#[derive(Debug, Clone, Serialize)]
pub struct JsonLdDocument {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@graph")]
    pub graph: Vec<Value>,
}

/// Derive a node identifier from an entity name: `ex:` plus the name with
/// each whitespace run collapsed to a single underscore, case-folded to lower.
pub fn derive_id(name: &str) -> String {
    let mut id = String::with_capacity(ID_PREFIX.len() + 1 + name.len());
    id.push_str(ID_PREFIX);
    id.push(':');

    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                id.push('_');
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
            for lower in ch.to_lowercase() {
                id.push(lower);
            }
        }
    }
    id
}

/// Project binding rows into a linked-data graph.
///
/// Output ordering: team nodes in first-seen order, then player nodes in
/// first-seen order. Membership edges are deduplicated and order-preserving.
pub fn project_bindings(bindings: &[Binding]) -> Result<JsonLdDocument, ProjectionError> {
    // id -> source name, for collision detection across both node kinds.
    // A team and a player sharing the same source name legitimately share an
    // id; only distinct names colliding is an error.
    let mut derived: HashMap<String, String> = HashMap::new();

    let mut team_order: Vec<String> = Vec::new();
    let mut team_nodes: HashMap<String, Map<String, Value>> = HashMap::new();
    let mut team_members: HashMap<String, Vec<String>> = HashMap::new();

    let mut player_order: Vec<String> = Vec::new();
    let mut player_nodes: HashMap<String, Map<String, Value>> = HashMap::new();

    for row in bindings {
        let team_name = row.value("teamName");
        let player_name = row.value("playerName");

        if let Some(name) = team_name {
            if !team_nodes.contains_key(name) {
                let id = claim_id(&mut derived, name)?;
                team_order.push(name.to_string());
                team_nodes.insert(name.to_string(), team_node(&id, name, row));
                team_members.insert(name.to_string(), Vec::new());
            }
        }

        if let Some(name) = player_name {
            if !player_nodes.contains_key(name) {
                let id = claim_id(&mut derived, name)?;
                player_order.push(name.to_string());
                player_nodes.insert(name.to_string(), player_node(&id, name, row));
            }
        }

        if let (Some(team), Some(player)) = (team_name, player_name) {
            let player_id = derive_id(player);
            if let Some(members) = team_members.get_mut(team) {
                if !members.contains(&player_id) {
                    members.push(player_id);
                }
            }
        }
    }

    let mut graph = Vec::with_capacity(team_order.len() + player_order.len());
    for name in &team_order {
        let mut node = team_nodes.remove(name).unwrap_or_default();
        let members = team_members.remove(name).unwrap_or_default();
        node.insert(
            "member".to_string(),
            Value::Array(members.into_iter().map(Value::String).collect()),
        );
        graph.push(Value::Object(node));
    }
    for name in &player_order {
        if let Some(node) = player_nodes.remove(name) {
            graph.push(Value::Object(node));
        }
    }

    Ok(JsonLdDocument {
        context: json!({ "@vocab": VOCAB, "ex": EX_NAMESPACE }),
        graph,
    })
}

fn claim_id(derived: &mut HashMap<String, String>, name: &str) -> Result<String, ProjectionError> {
    let id = derive_id(name);
    match derived.get(&id) {
        Some(existing) if existing != name => Err(ProjectionError::IdCollision {
            id,
            existing: existing.clone(),
            incoming: name.to_string(),
        }),
        _ => {
            derived.insert(id.clone(), name.to_string());
            Ok(id)
        }
    }
}

fn team_node(id: &str, name: &str, row: &Binding) -> Map<String, Value> {
    let mut node = Map::new();
    node.insert("@type".to_string(), json!("SportsTeam"));
    node.insert("@id".to_string(), json!(id));
    node.insert("name".to_string(), json!(name));

    if let Some(url) = row.value("teamUrl") {
        node.insert("url".to_string(), json!(url));
    }
    if let Some(description) = row.value("teamDescription") {
        node.insert("description".to_string(), json!(description));
    }
    if let Some(founding_date) = row.value("teamFoundingDate") {
        node.insert("foundingDate".to_string(), json!(founding_date));
    }
    if let Some(sport) = row.value("teamSport") {
        node.insert("sport".to_string(), json!(sport));
    }
    if let Some(location) = row.value("teamLocation") {
        node.insert("location".to_string(), json!({ "name": location }));
    }
    if let Some(coach) = row.value("teamCoach") {
        node.insert("coach".to_string(), json!({ "name": coach }));
    }
    node
}

fn player_node(id: &str, name: &str, row: &Binding) -> Map<String, Value> {
    let mut node = Map::new();
    node.insert("@type".to_string(), json!("Person"));
    node.insert("@id".to_string(), json!(id));
    node.insert("name".to_string(), json!(name));

    if let Some(height) = row.value("playerHeight") {
        node.insert("height".to_string(), json!(height));
    }
    if let Some(weight) = row.value("playerWeight") {
        node.insert("weight".to_string(), json!(weight));
    }
    if let Some(nationality) = row.value("playerNationality") {
        node.insert("nationality".to_string(), json!(nationality));
    }
    node
}
