use std::time::Duration;

use graphquery_core::config::LlmSettings;

use crate::chat::{ChatRequest, ChatResponse, Message};
use crate::error::LlmError;

/// Client for an OpenAI-compatible chat-completions API (Groq by default).
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmClient {
    /// Creates a client for `base_url` (without the `/v1` suffix).
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            model: model.to_owned(),
            temperature: 0.0,
        })
    }

    /// Creates a client from the `[llm]` settings section.
    ///
    /// # Errors
    /// See [`LlmClient::new`].
    pub fn from_settings(api_key: &str, settings: &LlmSettings) -> Result<Self, LlmError> {
        Ok(Self::new(
            api_key,
            &settings.base_url,
            &settings.model,
            Duration::from_secs(settings.timeout_secs),
        )?
        .with_temperature(settings.temperature))
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the endpoint is reachable and accepts the API key.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    pub async fn verify(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        Err(LlmError::HttpStatus {
            code: status.as_u16(),
            body,
        })
    }

    /// Complete `prompt`, stopping at the first of `stop`.
    ///
    /// The prompt is sent as a single user message. The stop sequences are
    /// passed to the API and applied again to the returned text, since not
    /// every compatible server honours them.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails, the API returns a
    /// non-success status, the response body cannot be parsed, or the choices
    /// array is empty.
    pub async fn complete(&self, prompt: &str, stop: &[&str]) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            stop: stop.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::HttpStatus {
                code: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                context: format!("chat completion response (body: {})", truncate(&body, 200)),
                source: e,
            })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        tracing::debug!(model = %self.model, chars = content.len(), "Completion received");
        Ok(apply_stop(&content, stop).to_string())
    }
}

/// Cut `text` at the earliest occurrence of any stop sequence.
#[must_use]
pub fn apply_stop<'a>(text: &'a str, stop: &[&str]) -> &'a str {
    let cut = stop
        .iter()
        .filter(|s| !s.is_empty())
        .filter_map(|s| text.find(s))
        .min()
        .unwrap_or(text.len());
    &text[..cut]
}

/// Truncates a string to the given maximum length at a char boundary.
fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const STOP: [&str; 2] = ["\n\n", "```"];

    fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new("test-key", &server.uri(), "test-model", Duration::from_secs(5)).unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{
                "message": { "role": "assistant", "content": content }
            }]
        })
    }

    #[test]
    fn test_apply_stop_takes_earliest() {
        assert_eq!(
            apply_stop("MATCH (n) RETURN n\n\nExplanation", &STOP),
            "MATCH (n) RETURN n"
        );
        assert_eq!(apply_stop("MATCH (n) RETURN n```", &STOP), "MATCH (n) RETURN n");
        assert_eq!(apply_stop("no stop here", &STOP), "no stop here");
        assert_eq!(apply_stop("abc", &[""]), "abc");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("short", 200), "short");
    }

    #[tokio::test]
    async fn test_complete_sends_prompt_and_stop() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [{ "role": "user", "content": "User input: hi\nCypher query:" }],
                "stop": ["\n\n", "```"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                " MATCH (m:Movie) RETURN count(m) AS count",
            )))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let text = client
            .complete("User input: hi\nCypher query:", &STOP)
            .await
            .unwrap();
        assert_eq!(text, " MATCH (m:Movie) RETURN count(m) AS count");
    }

    #[tokio::test]
    async fn test_complete_applies_stop_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("MATCH (n) RETURN n\n\nThis query returns nodes.")),
            )
            .mount(&server)
            .await;

        let text = client_for(&server).complete("prompt", &STOP).await.unwrap();
        assert_eq!(text, "MATCH (n) RETURN n");
    }

    #[tokio::test]
    async fn test_complete_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API Key"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("prompt", &STOP).await.unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn test_complete_empty_choices() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).complete("prompt", &STOP).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("prompt", &STOP).await.unwrap_err();
        assert!(matches!(err, LlmError::JsonParse { .. }));
    }

    #[tokio::test]
    async fn test_verify_checks_models_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).verify().await.is_ok());

        let rejected = LlmClient::new("bad-key", &server.uri(), "m", Duration::from_secs(5)).unwrap();
        let err = rejected.verify().await.unwrap_err();
        assert!(matches!(err, LlmError::HttpStatus { code: 404, .. }));
    }
}
