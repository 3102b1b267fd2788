//! HTTP API handlers for rosterlink-gw
//!
//! Route groups mirror the backing servers: `/sparql/*` for the triple
//! store, `/rest/*` for the REST destination store, `/graphql/*` for the
//! GraphQL store, plus `/ranking`, `/probe` and `/health`.

pub mod graphql;
pub mod health;
pub mod probe;
pub mod ranking;
pub mod rest;
pub mod sparql;

pub use graphql::graphql_routes;
pub use health::health_routes;
pub use probe::probe_routes;
pub use ranking::ranking_routes;
pub use rest::rest_routes;
pub use sparql::sparql_routes;
