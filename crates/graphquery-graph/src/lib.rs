//! GraphQuery Graph — Neo4j access for the question pipeline.
//!
//! Every database round trip GraphQuery makes goes through this crate:
//! connection checks, schema introspection, EXPLAIN-based validation of
//! generated Cypher, arbitrary read queries returned as JSON records, and
//! the movie sample dataset.

pub mod client;
pub mod movies;
pub mod queries;
pub mod schema;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use schema::SchemaSnapshot;
