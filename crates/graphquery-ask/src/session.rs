//! Per-user session state.
//!
//! A `Session` owns its database and model clients (while connected), the
//! example bank used for prompts, and the history of successful questions.
//! Operations take `&mut self` and run one at a time.

use graphquery_core::{
    DatabaseStats, Example, ExecutionStage, GraphQueryError, QueryOutcome, QueryRecord, SessionId,
    Settings,
};
use graphquery_graph::{GraphClient, GraphConfig};
use graphquery_llm::LlmClient;

use crate::backend::{GraphBackend, LanguageModel};
use crate::examples::{add_examples, get_examples};
use crate::history::SessionHistory;
use crate::pipeline::{run_question, PipelineContext};

struct Connection {
    graph: Box<dyn GraphBackend>,
    model: Box<dyn LanguageModel>,
    schema: String,
}

pub struct Session {
    id: SessionId,
    examples: Vec<Example>,
    validate: bool,
    connection: Option<Connection>,
    history: SessionHistory,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A disconnected session using the built-in example bank.
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            examples: get_examples(),
            validate: true,
            connection: None,
            history: SessionHistory::new(),
        }
    }

    /// Append custom examples after the built-in ones.
    pub fn with_examples(mut self, extra: &[Example]) -> Self {
        self.examples = add_examples(extra);
        self
    }

    /// Enable or disable EXPLAIN validation of generated queries.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Up to `n` history records, most recent first.
    pub fn recent(&self, n: usize) -> Vec<&QueryRecord> {
        self.history.recent(n)
    }

    /// The schema snapshot taken at connect time, or `None` when disconnected.
    pub fn schema(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.schema.as_str())
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to Neo4j and the model endpoint using `settings`.
    ///
    /// On failure the session stays disconnected and may retry.
    pub async fn connect(&mut self, settings: &Settings) -> Result<(), GraphQueryError> {
        let creds = settings.require_credentials()?;

        let graph_config = GraphConfig::from_settings(&creds, &settings.neo4j);
        let graph = GraphClient::connect(&graph_config)
            .await
            .map_err(|e| GraphQueryError::Connection(e.to_string()))?;

        let model = LlmClient::from_settings(&creds.llm_api_key, &settings.llm)
            .map_err(|e| GraphQueryError::Connection(e.to_string()))?;
        model.verify().await.map_err(|e| {
            if e.is_auth() {
                GraphQueryError::Connection(format!("language model rejected the API key: {e}"))
            } else {
                GraphQueryError::Connection(format!("language model endpoint: {e}"))
            }
        })?;

        tracing::info!(
            session = %self.id,
            base_url = %model.base_url(),
            model = %model.model(),
            "Model endpoint verified"
        );
        self.attach(Box::new(graph), Box::new(model)).await
    }

    /// Take ownership of already-built clients and snapshot the schema.
    pub async fn attach(
        &mut self,
        graph: Box<dyn GraphBackend>,
        model: Box<dyn LanguageModel>,
    ) -> Result<(), GraphQueryError> {
        let schema = graph
            .schema()
            .await
            .map_err(|e| GraphQueryError::Connection(format!("schema introspection: {e}")))?;

        if self.connection.is_some() {
            tracing::info!(session = %self.id, "Replacing existing connection");
        }
        self.connection = Some(Connection {
            graph,
            model,
            schema,
        });
        tracing::info!(session = %self.id, "Session connected");
        Ok(())
    }

    /// Drop both clients. History is kept.
    pub fn disconnect(&mut self) {
        if self.connection.take().is_some() {
            tracing::info!(session = %self.id, "Session disconnected");
        }
    }

    /// Re-read the schema from the database.
    pub async fn refresh_schema(&mut self) -> Result<&str, GraphQueryError> {
        let conn = self.connection.as_mut().ok_or_else(not_connected)?;
        conn.schema = conn
            .graph
            .schema()
            .await
            .map_err(|e| GraphQueryError::Connection(format!("schema introspection: {e}")))?;
        Ok(conn.schema.as_str())
    }

    // ── Questions ────────────────────────────────────────────────

    /// Answer `question`: generate Cypher, run it, and record the outcome.
    ///
    /// Failed attempts leave the history untouched.
    pub async fn run(&mut self, question: &str) -> Result<QueryOutcome, GraphQueryError> {
        let conn = self.connection.as_ref().ok_or_else(not_connected)?;

        let ctx = PipelineContext {
            graph: conn.graph.as_ref(),
            model: conn.model.as_ref(),
            schema: &conn.schema,
            examples: &self.examples,
            validate: self.validate,
        };

        let outcome = match run_question(&ctx, question).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(session = %self.id, question = %question, error = %e, "Question failed");
                return Err(e);
            }
        };

        tracing::info!(
            session = %self.id,
            query = %outcome.generated_query,
            duration_ms = outcome.execution_time.as_millis() as u64,
            "Question answered"
        );

        self.history
            .append(QueryRecord::from_outcome(question, &outcome));
        Ok(outcome)
    }

    /// Movie/actor/director/genre counts from the connected database.
    pub async fn stats(&self) -> Result<DatabaseStats, GraphQueryError> {
        let conn = self.connection.as_ref().ok_or_else(not_connected)?;
        conn.graph
            .stats()
            .await
            .map_err(|e| GraphQueryError::execution(ExecutionStage::Database, e))
    }
}

fn not_connected() -> GraphQueryError {
    GraphQueryError::Connection("not connected to the database".to_string())
}
