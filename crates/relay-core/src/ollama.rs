//! Ollama API client for local LLM replies.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors from the Ollama client.
#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Ollama API error: {0}")]
    Api(String),
    #[error("Invalid Ollama URL: {0}")]
    InvalidUrl(String),
    #[error("Ollama server not running at {0}. Start it with: ollama serve")]
    ServerNotRunning(String),
    #[error("Model '{0}' not found. Pull it with: ollama pull {0}")]
    ModelNotFound(String),
}

/// Something that turns a system prompt and a user message into text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, OllamaError>;
}

/// Request to the Ollama generate API.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

/// Response from the Ollama generate API.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

/// Response from the tags API (list models).
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagsModel>,
}

#[derive(Debug, Deserialize)]
struct TagsModel {
    name: String,
}

/// Ollama API client.
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for a generate endpoint URL and model.
    pub fn new(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: url.into(),
            model: model.into(),
        }
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the generate endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if the Ollama server is running and the model is available.
    pub async fn check_availability(&self) -> Result<(), OllamaError> {
        let tags_url = reqwest::Url::parse(&self.url)
            .and_then(|u| u.join("/api/tags"))
            .map_err(|e| OllamaError::InvalidUrl(format!("{}: {}", self.url, e)))?;

        let response = self
            .client
            .get(tags_url)
            .send()
            .await
            .map_err(|_| OllamaError::ServerNotRunning(self.url.clone()))?;

        if !response.status().is_success() {
            return Err(OllamaError::ServerNotRunning(self.url.clone()));
        }

        let tags: TagsResponse = response.json().await?;
        let model_base = self.model.split(':').next().unwrap_or(&self.model);
        let found = tags
            .models
            .iter()
            .any(|m| m.name == self.model || m.name.starts_with(&format!("{}:", model_base)));

        if !found {
            return Err(OllamaError::ModelNotFound(self.model.clone()));
        }
        Ok(())
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(
            DEFAULT_OLLAMA_URL,
            DEFAULT_OLLAMA_MODEL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, OllamaError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        debug!(model = %self.model, url = %self.url, "Sending prompt to Ollama");
        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api(format!("{}: {}", status, text)));
        }

        let body: GenerateResponse = response.json().await?;
        if let Some(error) = body.error {
            return Err(OllamaError::Api(error));
        }
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str, model: &str) -> OllamaClient {
        OllamaClient::new(format!("{}/api/generate", base), model, Duration::from_secs(5))
    }

    #[test]
    fn test_default_client() {
        let client = OllamaClient::default();
        assert_eq!(client.url(), DEFAULT_OLLAMA_URL);
        assert_eq!(client.model(), DEFAULT_OLLAMA_MODEL);
    }

    #[tokio::test]
    async fn test_generate_sends_request_shape() {
        let app = Router::new().route(
            "/api/generate",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "tiny");
                assert_eq!(body["system"], "be brief");
                assert_eq!(body["stream"], false);
                Json(json!({ "response": format!("echo: {}", body["prompt"].as_str().unwrap()), "done": true }))
            }),
        );
        let base = spawn(app).await;

        let reply = client(&base, "tiny").generate("be brief", "hi").await.unwrap();
        assert_eq!(reply, "echo: hi");
    }

    #[tokio::test]
    async fn test_generate_error_field() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { Json(json!({ "error": "model not loaded" })) }),
        );
        let base = spawn(app).await;

        let err = client(&base, "tiny").generate("s", "p").await.unwrap_err();
        assert!(matches!(err, OllamaError::Api(msg) if msg == "model not loaded"));
    }

    #[tokio::test]
    async fn test_generate_non_success_status() {
        let app = Router::new().route(
            "/api/generate",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn(app).await;

        let err = client(&base, "tiny").generate("s", "p").await.unwrap_err();
        assert!(matches!(err, OllamaError::Api(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_generate_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr), "tiny")
            .generate("s", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, OllamaError::Http(_)));
    }

    #[tokio::test]
    async fn test_check_availability() {
        let app = Router::new().route(
            "/api/tags",
            get(|| async { Json(json!({ "models": [{ "name": "llama3.2:1b" }] })) }),
        );
        let base = spawn(app).await;

        assert!(client(&base, "llama3.2:1b").check_availability().await.is_ok());
        assert!(client(&base, "llama3.2:3b").check_availability().await.is_ok());
        let err = client(&base, "mistral").check_availability().await.unwrap_err();
        assert!(matches!(err, OllamaError::ModelNotFound(m) if m == "mistral"));
    }
}
