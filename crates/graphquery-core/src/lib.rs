//! graphquery-core: Shared types, configuration, and error handling for GraphQuery.
//!
//! This crate provides the foundational pieces used by every GraphQuery crate:
//! - Few-shot examples, query records, and pipeline outcomes
//! - Layered settings (environment, `.env`, `graphquery.toml`)
//! - The error taxonomy surfaced to users

pub mod config;
pub mod error;
pub mod types;

pub use config::{Credentials, Settings};
pub use error::{ExecutionStage, GraphQueryError};
pub use types::{DatabaseStats, Example, QueryOutcome, QueryRecord, SessionId};
