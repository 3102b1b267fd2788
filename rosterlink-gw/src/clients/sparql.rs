//! Triple-store SPARQL client
//!
//! Sends SELECT queries to the configured repository endpoint and parses the
//! `application/sparql-results+json` envelope. The fixed roster and ranking
//! queries used by the gateway's own operations live here alongside the
//! client; the passthrough endpoint accepts arbitrary queries.

use reqwest::header::ACCEPT;
use rosterlink_common::model::SparqlResults;
use serde_json::Value;
use thiserror::Error;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Roster query: teams with their optional attributes joined to their
/// American players. One row per (team, player) pair.
pub const ROSTER_QUERY: &str = r#"
PREFIX schema: <http://schema.org/>
PREFIX ex: <http://example.org/>

SELECT ?teamName ?teamUrl ?teamDescription ?teamFoundingDate ?teamSport ?teamLocation ?teamCoach ?playerName ?playerHeight ?playerWeight ?playerNationality
WHERE {
    ?team a schema:SportsTeam ;
          schema:name ?teamName .
    OPTIONAL { ?team schema:url ?teamUrl . }
    OPTIONAL { ?team schema:description ?teamDescription . }
    OPTIONAL { ?team schema:foundingDate ?teamFoundingDate . }
    OPTIONAL { ?team schema:sport ?teamSport . }
    OPTIONAL { ?team schema:location/schema:name ?teamLocation . }
    OPTIONAL { ?team schema:coach/schema:name ?teamCoach . }

    ?team schema:member ?player .
    ?player schema:name ?playerName ;
            schema:nationality ?playerNationality .
    OPTIONAL { ?player schema:height ?playerHeight . }
    OPTIONAL { ?player schema:weight ?playerWeight . }
    FILTER(?playerNationality = "American")
}
ORDER BY ?teamName ?playerName
"#;

/// Ranking query: per-player statistics rows fed to the analysis endpoint
pub const RANKING_QUERY: &str = r#"
PREFIX schema: <http://schema.org/>
PREFIX ex: <http://example.org/>

SELECT ?teamName ?playerName ?playerHeight ?playerWeight ?playerNationality ?playerStats
WHERE {
    ?team a schema:SportsTeam ;
          schema:name ?teamName .

    ?team schema:member ?player .
    ?player schema:name ?playerName ;
            schema:nationality ?playerNationality .
    OPTIONAL { ?player schema:height ?playerHeight . }
    OPTIONAL { ?player schema:weight ?playerWeight . }
    OPTIONAL { ?player ex:stats ?playerStats . }

    FILTER(?playerNationality = "American")
}
ORDER BY ?teamName ?playerName
"#;

/// SPARQL client errors
#[derive(Debug, Error)]
pub enum SparqlError {
    /// Request exceeded the client timeout
    #[error("SPARQL endpoint timed out")]
    Timeout,

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint returned a non-success HTTP status
    #[error("SPARQL endpoint returned {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the results envelope
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SparqlError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SparqlError::Timeout
        } else {
            SparqlError::Network(e.to_string())
        }
    }
}

/// Triple-store SPARQL endpoint client
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SparqlClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Run a SELECT query, returning the results envelope as raw JSON.
    ///
    /// Used by the passthrough endpoint: whatever the store answered is
    /// forwarded verbatim, unknown envelope keys included.
    pub async fn select_raw(&self, query: &str) -> Result<Value, SparqlError> {
        tracing::debug!(endpoint = %self.endpoint, "Querying triple store");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("query", query)])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(SparqlError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SparqlError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| SparqlError::Parse(e.to_string()))
    }

    /// Run a SELECT query and parse the typed results envelope
    pub async fn select(&self, query: &str) -> Result<SparqlResults, SparqlError> {
        let raw = self.select_raw(query).await?;
        let results: SparqlResults =
            serde_json::from_value(raw).map_err(|e| SparqlError::Parse(e.to_string()))?;

        tracing::debug!(
            rows = results.results.bindings.len(),
            "Triple store query returned"
        );
        Ok(results)
    }
}
