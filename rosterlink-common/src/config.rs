//! Gateway configuration loading
//!
//! Configuration resolution priority order:
//! 1. Explicit path (command-line argument or environment variable, highest)
//! 2. `rosterlink.toml` in the working directory
//! 3. Compiled defaults (fallback)
//!
//! Every field has a compiled default, so a missing config file is not an
//! error: the gateway starts against the conventional local server ports.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "rosterlink.toml";

/// How the normalizer merges repeated rows for the same entity name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// First occurrence's optional fields are authoritative; later rows for
    /// the same name never update already-created entities.
    #[default]
    FirstWins,
    /// Later rows overwrite optional fields they carry a value for.
    LastWins,
}

/// How the transfer pipeline treats the destination-store clear step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearMode {
    /// Attempt the clear; log failure at warn and continue. The destination
    /// may not support clearing at all.
    #[default]
    BestEffort,
    /// Clear failure aborts the pipeline.
    Required,
    /// Do not clear; append to whatever the destination already holds.
    Skip,
}

/// How the transfer pipeline treats a player whose team name has no
/// unambiguous destination id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Abort the pipeline before any player is written.
    #[default]
    Fail,
    /// Drop the affected players with a warning and write the rest.
    Skip,
}

/// Transfer pipeline behavior knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransferPolicy {
    pub merge_policy: MergePolicy,
    pub clear_mode: ClearMode,
    pub on_unresolved: UnresolvedPolicy,
}

/// Analysis (ranking) endpoint settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// OpenAI-style chat completions endpoint
    pub endpoint: String,
    /// API key; the `ROSTERLINK_ANALYSIS_API_KEY` environment variable takes
    /// priority over this field
    pub api_key: Option<String>,
    /// Model identifier sent with each completion request
    pub model: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

/// One health-probe target
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProbeTarget {
    pub name: String,
    pub url: String,
}

/// Top-level gateway configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listen address for the gateway HTTP API
    pub listen_addr: String,
    /// SPARQL endpoint of the triple store repository
    pub sparql_endpoint: String,
    /// Base URL of the REST destination store (json-server conventions)
    pub rest_endpoint: String,
    /// GraphQL endpoint of the second destination store
    pub graphql_endpoint: String,
    /// Analysis (ranking) endpoint settings
    pub analysis: AnalysisConfig,
    /// Targets for the concurrent reachability probe
    pub probe_targets: Vec<ProbeTarget>,
    /// Transfer pipeline behavior
    pub transfer: TransferPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8600".to_string(),
            sparql_endpoint: "http://localhost:8080/rdf4j-server/repositories/roster"
                .to_string(),
            rest_endpoint: "http://localhost:4000".to_string(),
            graphql_endpoint: "http://localhost:3000/graphql".to_string(),
            analysis: AnalysisConfig::default(),
            probe_targets: vec![
                ProbeTarget {
                    name: "triple-store".to_string(),
                    url: "http://localhost:8080/rdf4j-workbench".to_string(),
                },
                ProbeTarget {
                    name: "rest-store".to_string(),
                    url: "http://localhost:4000".to_string(),
                },
                ProbeTarget {
                    name: "graphql-store".to_string(),
                    url: "http://localhost:3000".to_string(),
                },
            ],
            transfer: TransferPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration following the resolution priority order.
    ///
    /// An explicitly requested path must exist and parse; the conventional
    /// path is only used when present; otherwise compiled defaults apply.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // Priority 1: explicit path (CLI argument or environment variable)
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // Priority 2: rosterlink.toml in the working directory
        let conventional = Path::new(DEFAULT_CONFIG_FILE);
        if conventional.exists() {
            return Self::from_file(conventional);
        }

        // Priority 3: compiled defaults
        tracing::info!("No config file found, using compiled defaults");
        Ok(Self::default())
    }

    /// Parse configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: GatewayConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
