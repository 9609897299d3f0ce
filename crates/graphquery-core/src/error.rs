use std::fmt;

use thiserror::Error;

/// Top-level error type surfaced to GraphQuery users.
///
/// Every variant is scoped to a single user interaction; none of them is
/// fatal to the process.
#[derive(Error, Debug)]
pub enum GraphQueryError {
    /// A required credential is missing at connect time.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database or model endpoint is unreachable, rejected the
    /// credentials, or the session is not connected.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query generation or execution failed for one question.
    #[error("Execution failed during {stage}: {source}")]
    Execution {
        stage: ExecutionStage,
        #[source]
        source: anyhow::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphQueryError {
    pub fn execution(stage: ExecutionStage, source: impl Into<anyhow::Error>) -> Self {
        Self::Execution {
            stage,
            source: source.into(),
        }
    }

    /// True for errors that leave the session disconnected.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Connection(_))
    }
}

/// Which step of the query pipeline an execution error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStage {
    /// The language model call that produces the query.
    Generation,
    /// The database's syntax check of the generated query.
    Validation,
    /// The single re-prompt after a failed validation.
    Repair,
    /// Running the query against the database.
    Database,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Generation => "query generation",
            Self::Validation => "query validation",
            Self::Repair => "query repair",
            Self::Database => "database execution",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_names_stage() {
        let err = GraphQueryError::execution(
            ExecutionStage::Database,
            anyhow::anyhow!("Neo.ClientError.Statement.SyntaxError"),
        );
        let msg = err.to_string();
        assert!(msg.starts_with("Execution failed during database execution"));
        assert!(msg.contains("SyntaxError"));
        assert!(!err.is_connection());
    }

    #[test]
    fn config_and_connection_are_connection_errors() {
        assert!(GraphQueryError::Config("missing NEO4J_URI".into()).is_connection());
        assert!(GraphQueryError::Connection("refused".into()).is_connection());
    }
}
