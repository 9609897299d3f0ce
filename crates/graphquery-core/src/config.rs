//! Configuration management for GraphQuery.
//!
//! Configuration is loaded from (in priority order):
//! 1. Conventional credential variables (`NEO4J_URI`, `NEO4J_USERNAME`,
//!    `NEO4J_PASSWORD`, `GROQ_API_KEY`)
//! 2. Environment variables (`GRAPHQUERY__` prefix, `__` separator)
//! 3. Config file (`graphquery.toml`)
//! 4. Defaults
//!
//! Credentials have no defaults. Their absence only surfaces when a session
//! tries to connect, via [`Settings::require_credentials`].

use std::fmt;

use serde::Deserialize;

use crate::error::GraphQueryError;

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// `[neo4j]` section.
#[derive(Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Bolt connection pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Records pulled per round trip.
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// `[llm]` section.
#[derive(Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API (without `/v1`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// Ask the database to EXPLAIN generated queries before running them.
    #[serde(default = "default_true")]
    pub validate_query: bool,

    /// How many history entries the shell shows by default.
    #[serde(default = "default_history_display")]
    pub history_display: usize,
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_base_url() -> String {
    "https://api.groq.com/openai".to_string()
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_history_display() -> usize {
    3
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: None,
            username: None,
            password: None,
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            validate_query: default_true(),
            history_display: default_history_display(),
        }
    }
}

impl fmt::Debug for Neo4jSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jSettings")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("max_connections", &self.max_connections)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Credential values read from their conventional environment names.
#[derive(Clone, Default)]
pub struct CredentialEnv {
    pub neo4j_uri: Option<String>,
    pub neo4j_username: Option<String>,
    pub neo4j_password: Option<String>,
    pub llm_api_key: Option<String>,
}

impl CredentialEnv {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            neo4j_uri: var("NEO4J_URI"),
            neo4j_username: var("NEO4J_USERNAME"),
            neo4j_password: var("NEO4J_PASSWORD"),
            llm_api_key: var("GROQ_API_KEY"),
        }
    }
}

/// The four values a session needs to connect.
#[derive(Clone)]
pub struct Credentials {
    pub neo4j_uri: String,
    pub neo4j_username: String,
    pub neo4j_password: String,
    pub llm_api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("neo4j_uri", &self.neo4j_uri)
            .field("neo4j_username", &self.neo4j_username)
            .field("neo4j_password", &"***")
            .field("llm_api_key", &"***")
            .finish()
    }
}

/// `GRAPHQUERY__*` variables. Values stay strings until deserialized, so
/// secrets such as `007` keep their leading zeros.
fn prefixed_env() -> config::Environment {
    config::Environment::with_prefix("GRAPHQUERY").separator("__")
}

impl Settings {
    /// Load settings from `{file_prefix}.toml`, `GRAPHQUERY__` variables and
    /// the conventional credential variables.
    pub fn load(file_prefix: &str) -> Result<Self, GraphQueryError> {
        Self::load_with(file_prefix, CredentialEnv::from_env())
    }

    /// Same as [`Settings::load`] with explicit credential overrides.
    pub fn load_with(file_prefix: &str, creds: CredentialEnv) -> Result<Self, GraphQueryError> {
        Self::from_sources(file_prefix, prefixed_env(), creds)
    }

    fn from_sources(
        file_prefix: &str,
        env: config::Environment,
        creds: CredentialEnv,
    ) -> Result<Self, GraphQueryError> {
        let to_config_err = |e: config::ConfigError| GraphQueryError::Config(e.to_string());

        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(env)
            .set_override_option("neo4j.uri", creds.neo4j_uri)
            .map_err(to_config_err)?
            .set_override_option("neo4j.username", creds.neo4j_username)
            .map_err(to_config_err)?
            .set_override_option("neo4j.password", creds.neo4j_password)
            .map_err(to_config_err)?
            .set_override_option("llm.api_key", creds.llm_api_key)
            .map_err(to_config_err)?
            .build()
            .map_err(to_config_err)?;

        let settings: Settings = cfg.try_deserialize().map_err(to_config_err)?;
        tracing::debug!(?settings, "Settings loaded");
        Ok(settings)
    }

    /// Collect the connection credentials, reporting every missing one.
    pub fn require_credentials(&self) -> Result<Credentials, GraphQueryError> {
        let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        let uri = present(&self.neo4j.uri);
        let username = present(&self.neo4j.username);
        let password = present(&self.neo4j.password);
        let api_key = present(&self.llm.api_key);

        let mut missing = Vec::new();
        if uri.is_none() {
            missing.push("NEO4J_URI");
        }
        if username.is_none() {
            missing.push("NEO4J_USERNAME");
        }
        if password.is_none() {
            missing.push("NEO4J_PASSWORD");
        }
        if api_key.is_none() {
            missing.push("GROQ_API_KEY");
        }

        match (uri, username, password, api_key) {
            (Some(neo4j_uri), Some(neo4j_username), Some(neo4j_password), Some(llm_api_key)) => {
                Ok(Credentials {
                    neo4j_uri,
                    neo4j_username,
                    neo4j_password,
                    llm_api_key,
                })
            }
            _ => Err(GraphQueryError::Config(format!(
                "missing credentials: {}",
                missing.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_creds() -> CredentialEnv {
        CredentialEnv {
            neo4j_uri: Some("neo4j+s://demo.databases.neo4j.io".to_string()),
            neo4j_username: Some("neo4j".to_string()),
            neo4j_password: Some("secret".to_string()),
            llm_api_key: Some("gsk_test".to_string()),
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "llama-3.1-8b-instant");
        assert_eq!(settings.llm.base_url, "https://api.groq.com/openai");
        assert!(settings.pipeline.validate_query);
        assert_eq!(settings.pipeline.history_display, 3);
        assert_eq!(settings.neo4j.max_connections, 16);
    }

    #[test]
    fn test_credentials_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("graphquery");
        std::fs::write(
            dir.path().join("graphquery.toml"),
            r#"
[neo4j]
uri = "bolt://file-host:7687"
fetch_size = 64

[llm]
model = "llama-3.3-70b-versatile"

[pipeline]
validate_query = false
"#,
        )
        .unwrap();

        let settings = Settings::load_with(prefix.to_str().unwrap(), full_creds()).unwrap();
        assert_eq!(
            settings.neo4j.uri.as_deref(),
            Some("neo4j+s://demo.databases.neo4j.io")
        );
        assert_eq!(settings.neo4j.fetch_size, 64);
        assert_eq!(settings.llm.model, "llama-3.3-70b-versatile");
        assert!(!settings.pipeline.validate_query);

        let creds = settings.require_credentials().unwrap();
        assert_eq!(creds.neo4j_username, "neo4j");
        assert_eq!(creds.llm_api_key, "gsk_test");
    }

    #[test]
    fn test_missing_credentials_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let creds = CredentialEnv {
            neo4j_uri: Some("bolt://localhost:7687".to_string()),
            neo4j_username: Some("  ".to_string()),
            ..Default::default()
        };

        let settings = Settings::load_with(prefix.to_str().unwrap(), creds).unwrap();
        let err = settings.require_credentials().unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, GraphQueryError::Config(_)));
        assert!(msg.contains("NEO4J_USERNAME"));
        assert!(msg.contains("NEO4J_PASSWORD"));
        assert!(msg.contains("GROQ_API_KEY"));
        assert!(!msg.contains("NEO4J_URI"));
    }

    fn env_vars(pairs: &[(&str, &str)]) -> config::Environment {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        prefixed_env().source(Some(vars))
    }

    #[test]
    fn test_prefixed_env_keeps_secrets_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let env = env_vars(&[
            ("GRAPHQUERY__NEO4J__PASSWORD", "007"),
            ("GRAPHQUERY__LLM__API_KEY", "0123"),
        ]);

        let settings =
            Settings::from_sources(prefix.to_str().unwrap(), env, CredentialEnv::default())
                .unwrap();
        assert_eq!(settings.neo4j.password.as_deref(), Some("007"));
        assert_eq!(settings.llm.api_key.as_deref(), Some("0123"));
    }

    #[test]
    fn test_prefixed_env_still_fills_typed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("absent");
        let env = env_vars(&[
            ("GRAPHQUERY__NEO4J__FETCH_SIZE", "64"),
            ("GRAPHQUERY__PIPELINE__VALIDATE_QUERY", "false"),
            ("GRAPHQUERY__PIPELINE__HISTORY_DISPLAY", "5"),
        ]);

        let settings =
            Settings::from_sources(prefix.to_str().unwrap(), env, CredentialEnv::default())
                .unwrap();
        assert_eq!(settings.neo4j.fetch_size, 64);
        assert!(!settings.pipeline.validate_query);
        assert_eq!(settings.pipeline.history_display, 5);
    }

    #[test]
    fn test_debug_masks_secrets() {
        let creds = Credentials {
            neo4j_uri: "bolt://localhost:7687".to_string(),
            neo4j_username: "neo4j".to_string(),
            neo4j_password: "hunter2".to_string(),
            llm_api_key: "gsk_live".to_string(),
        };
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(!dbg.contains("gsk_live"));
    }
}
