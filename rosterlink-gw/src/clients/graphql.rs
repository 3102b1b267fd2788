//! GraphQL destination-store client
//!
//! json-graphql-server conventions: every request is a `POST` with a
//! `{query, variables?}` body, every response a `{data, errors?}` envelope.
//! GraphQL-level errors ride inside an HTTP 200 and are surfaced as data,
//! not as client failures.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Bounded wait for the reachability check
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema introspection probe used only to check reachability
const INTROSPECTION_QUERY: &str = "{ __schema { types { name } } }";

/// Full-contents query used by the unified view
pub const ALL_DATA_QUERY: &str = r#"
{
    allTeams {
        id
        name
        url
        description
        foundingDate
        sport
        location
        coach
    }
    allPlayers {
        id
        name
        height
        weight
        nationality
        team_id
    }
}
"#;

/// GraphQL client errors
#[derive(Debug, Error)]
pub enum GraphqlError {
    /// Request exceeded the client timeout
    #[error("GraphQL server timed out")]
    Timeout,

    /// Server refused the connection
    #[error("GraphQL server not reachable: {0}")]
    Unreachable(String),

    /// Other network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Server returned a non-success HTTP status
    #[error("GraphQL server returned {0}: {1}")]
    Api(u16, String),

    /// Failed to parse a response envelope
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GraphqlError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GraphqlError::Timeout
        } else if e.is_connect() {
            GraphqlError::Unreachable(e.to_string())
        } else {
            GraphqlError::Network(e.to_string())
        }
    }
}

/// GraphQL response envelope. A response carrying `errors` is still a
/// successful round trip at this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

impl GraphqlResponse {
    pub fn is_success(&self) -> bool {
        self.errors.is_none()
    }
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<&'a Value>,
}

/// GraphQL endpoint client
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphqlClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    /// Execute a query or mutation, optionally with variables
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<&Value>,
    ) -> Result<GraphqlResponse, GraphqlError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(GraphqlError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphqlError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| GraphqlError::Parse(e.to_string()))
    }

    /// Bounded-wait reachability check via a schema introspection probe.
    /// Only reachability is observed; the response body is ignored.
    pub async fn is_reachable(&self) -> bool {
        let request = self
            .http
            .post(&self.endpoint)
            .timeout(REACHABILITY_TIMEOUT)
            .json(&GraphqlRequest {
                query: INTROSPECTION_QUERY,
                variables: None,
            })
            .send();

        match request.await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, error = %e, "GraphQL reachability check failed");
                false
            }
        }
    }
}
