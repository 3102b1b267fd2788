//! HTTP clients for the backing data servers
//!
//! One client per collaborator: the triple store (SPARQL), the REST
//! destination store, the GraphQL destination store, and the analysis
//! (ranking) endpoint. Each client owns its endpoint URL and carries its own
//! error enum; nothing here retries automatically.

pub mod analysis;
pub mod graphql;
pub mod rest;
pub mod sparql;

pub use analysis::{Analysis, AnalysisClient, AnalysisError};
pub use graphql::{GraphqlClient, GraphqlError, GraphqlResponse};
pub use rest::{RestClient, RestError};
pub use sparql::{SparqlClient, SparqlError};
