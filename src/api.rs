//! Generative-language API interaction.
//!
//! - [`AskAsync`]: core trait for sending one prompt and receiving text
//! - [`GeminiClient`]: implementation backed by the Gemini
//!   `generateContent` REST endpoint
//!
//! There is no retry or backoff at this layer. The summarizer decides what
//! to do when a call fails.

use crate::config::Config;
use crate::error::{NewsError, Result};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a language model and return its text
/// response. The summarizer is generic over this trait so tests can supply
/// a scripted model.
pub trait AskAsync {
    /// Send `prompt` to the model and return the generated text.
    async fn ask(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &Config, client: Client) -> Self {
        let url = format!(
            "{}/models/{}:generateContent",
            config.gemini_endpoint.trim_end_matches('/'),
            config.gemini_model
        );
        Self {
            client,
            url,
            api_key: config.google_api_key.clone(),
        }
    }
}

impl AskAsync for GeminiClient {
    #[instrument(level = "info", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<String> {
        let t0 = Instant::now();
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let dt = t0.elapsed();
        if !status.is_success() {
            warn!(elapsed_ms = dt.as_millis() as u64, status = status.as_u16(), "API call failed");
            return Err(NewsError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        debug!(elapsed_ms = dt.as_millis() as u64, bytes = body.len(), "API call succeeded");
        parsed.text().ok_or(NewsError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> GeminiClient {
        let mut config = Config::new("serp", "goog-key");
        config.gemini_endpoint = server.base_url();
        config.gemini_model = "test-model".to_string();
        GeminiClient::new(&config, Client::new())
    }

    #[tokio::test]
    async fn test_ask_returns_candidate_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/test-model:generateContent")
                .query_param("key", "goog-key")
                .json_body(json!({ "contents": [{ "parts": [{ "text": "hello" }] }] }));
            then.status(200).json_body(json!({
                "candidates": [{ "content": { "parts": [{ "text": "<p>Hi" }, { "text": "</p>" }] } }]
            }));
        });

        let text = client(&server).ask("hello").await.unwrap();

        mock.assert();
        assert_eq!(text, "<p>Hi</p>");
    }

    #[tokio::test]
    async fn test_ask_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(429).body("quota exceeded");
        });

        let err = client(&server).ask("hello").await.unwrap_err();
        assert!(matches!(err, NewsError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_ask_blocked_prompt_is_empty_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        });

        let err = client(&server).ask("hello").await.unwrap_err();
        assert!(matches!(err, NewsError::EmptyResponse));
    }
}
