//! # Rosterlink Common Library
//!
//! Shared code for the rosterlink gateway:
//! - Entity and wire models (SPARQL bindings, teams, players, store snapshots)
//! - Gateway configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
