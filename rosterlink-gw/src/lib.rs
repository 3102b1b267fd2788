//! rosterlink-gw library - roster integration gateway
//!
//! HTTP gateway in front of three backing servers (SPARQL triple store,
//! REST destination store, GraphQL store) plus an analysis endpoint.
//! Reshapes flat query bindings into entities, linked-data graphs and
//! display rows, and drives the cross-store transfer pipelines.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use rosterlink_common::config::GatewayConfig;

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod jsonld;
pub mod normalize;
pub mod probe;
pub mod transfer;
pub mod unified;

pub use error::{ApiError, ApiResult};

use clients::{AnalysisClient, GraphqlClient, RestClient, SparqlClient};

const HTTP_USER_AGENT: &str = concat!("rosterlink/", env!("CARGO_PKG_VERSION"));
const HTTP_TIMEOUT_SECS: u64 = 10;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved gateway configuration
    pub config: Arc<GatewayConfig>,
    /// Shared HTTP client (probe requests go through this directly)
    pub http: reqwest::Client,
    /// Triple-store client
    pub sparql: SparqlClient,
    /// REST destination-store client
    pub rest: RestClient,
    /// GraphQL store client
    pub graphql: GraphqlClient,
    /// Analysis endpoint client
    pub analysis: AnalysisClient,
    /// Startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Build application state from resolved configuration
    pub fn new(config: GatewayConfig) -> Result<Self, rosterlink_common::Error> {
        let http = reqwest::Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                rosterlink_common::Error::Internal(format!("Failed to build HTTP client: {e}"))
            })?;

        let api_key = config::resolve_analysis_api_key(&config);

        let sparql = SparqlClient::new(http.clone(), config.sparql_endpoint.clone());
        let rest = RestClient::new(http.clone(), config.rest_endpoint.clone());
        let graphql = GraphqlClient::new(http.clone(), config.graphql_endpoint.clone());
        let analysis = AnalysisClient::new(
            http.clone(),
            config.analysis.endpoint.clone(),
            api_key,
            config.analysis.model.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            http,
            sparql,
            rest,
            graphql,
            analysis,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::sparql_routes())
        .merge(api::rest_routes())
        .merge(api::graphql_routes())
        .merge(api::ranking_routes())
        .merge(api::probe_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
