//! Core domain types for GraphQuery.
//!
//! These types describe the few-shot demonstrations fed to the model, the
//! outcome of one question, and the records kept in a session's history.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Session ───────────────────────────────────────────────────────

/// Identifies one interactive session for log correlation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Few-shot Examples ─────────────────────────────────────────────

/// A worked (question, query) pair shown to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Example {
    pub question: String,
    pub query: String,
}

impl Example {
    pub fn new(question: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            query: query.into(),
        }
    }
}

// ── Query Results ─────────────────────────────────────────────────

/// What one successful question produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryOutcome {
    /// Raw records returned by the database, as a JSON list of mappings.
    pub result: serde_json::Value,
    /// The Cypher statement that was executed.
    pub generated_query: String,
    /// Wall-clock time from the model call to the end of execution.
    pub execution_time: Duration,
}

/// One entry in a session's history. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRecord {
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub query: String,
    pub result: serde_json::Value,
    pub execution_time: Duration,
}

impl QueryRecord {
    pub fn from_outcome(question: &str, outcome: &QueryOutcome) -> Self {
        Self {
            timestamp: Utc::now(),
            question: question.to_string(),
            query: outcome.generated_query.clone(),
            result: outcome.result.clone(),
            execution_time: outcome.execution_time,
        }
    }
}

// ── Database Statistics ───────────────────────────────────────────

/// Node counts of the movie graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseStats {
    pub movies: i64,
    pub actors: i64,
    pub directors: i64,
    pub genres: i64,
}
