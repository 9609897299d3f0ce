//! Read operations: free-form Cypher execution, validation, and statistics.

use neo4rs::query;
use serde_json::{Map, Value};

use graphquery_core::DatabaseStats;

use crate::client::{column, GraphClient, GraphError};

/// One result record, keyed by the `RETURN` column names.
pub type Record = Map<String, Value>;

impl GraphClient {
    // ── Free-form Cypher ─────────────────────────────────────────

    /// Run an arbitrary Cypher statement and return its records as JSON.
    ///
    /// The statement is treated as opaque text; nothing here inspects it.
    pub async fn execute_cypher(&self, cypher: &str) -> Result<Vec<Record>, GraphError> {
        let rows = self.query_rows(query(cypher)).await?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record: Record = row.to().map_err(|e| {
                GraphError::Serialization(format!("Failed to convert record to JSON: {e}"))
            })?;
            records.push(record);
        }

        tracing::debug!(rows = records.len(), "Cypher executed");
        Ok(records)
    }

    /// Ask the database to plan the statement without running it.
    ///
    /// Syntax errors and unknown functions surface here as `GraphError::Query`.
    pub async fn validate_cypher(&self, cypher: &str) -> Result<(), GraphError> {
        self.run(query(&format!("EXPLAIN {cypher}"))).await
    }

    // ── Statistics ───────────────────────────────────────────────

    /// Count movies, actors, directors, and genres.
    pub async fn stats(&self) -> Result<DatabaseStats, GraphError> {
        Ok(DatabaseStats {
            movies: self
                .count("MATCH (m:Movie) RETURN count(m) AS count")
                .await?,
            actors: self
                .count("MATCH (p:Person)-[:ACTED_IN]->(:Movie) RETURN count(DISTINCT p) AS count")
                .await?,
            directors: self
                .count("MATCH (p:Person)-[:DIRECTED]->(:Movie) RETURN count(DISTINCT p) AS count")
                .await?,
            genres: self
                .count("MATCH (g:Genre) RETURN count(g) AS count")
                .await?,
        })
    }

    async fn count(&self, cypher: &str) -> Result<i64, GraphError> {
        match self.query_one(query(cypher)).await? {
            Some(row) => column(&row, "count"),
            None => Ok(0),
        }
    }
}
