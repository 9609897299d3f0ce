//! Seams between the pipeline and its two external collaborators.
//!
//! The session talks to the database and the model only through these
//! traits; `GraphClient` and `LlmClient` are the production implementations.

use async_trait::async_trait;
use serde_json::{Map, Value};

use graphquery_core::DatabaseStats;
use graphquery_graph::GraphClient;
use graphquery_llm::LlmClient;

/// The graph database as the pipeline sees it. Queries are opaque text.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Current schema rendered as prompt text.
    async fn schema(&self) -> anyhow::Result<String>;

    /// Syntax-check a query without running it.
    async fn validate(&self, query: &str) -> anyhow::Result<()>;

    /// Run a query and return its records.
    async fn execute(&self, query: &str) -> anyhow::Result<Vec<Map<String, Value>>>;

    /// Movie/actor/director/genre counts.
    async fn stats(&self) -> anyhow::Result<DatabaseStats>;
}

/// A text-completion oracle.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> anyhow::Result<String>;
}

#[async_trait]
impl GraphBackend for GraphClient {
    async fn schema(&self) -> anyhow::Result<String> {
        Ok(self.schema_text().await?)
    }

    async fn validate(&self, query: &str) -> anyhow::Result<()> {
        Ok(self.validate_cypher(query).await?)
    }

    async fn execute(&self, query: &str) -> anyhow::Result<Vec<Map<String, Value>>> {
        Ok(self.execute_cypher(query).await?)
    }

    async fn stats(&self) -> anyhow::Result<DatabaseStats> {
        Ok(GraphClient::stats(self).await?)
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &str, stop: &[&str]) -> anyhow::Result<String> {
        Ok(LlmClient::complete(self, prompt, stop).await?)
    }
}
