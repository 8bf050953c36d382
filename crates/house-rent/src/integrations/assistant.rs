//! Generative text for description polishing and listing review.
//!
//! Three backends share one trait: a direct Gemini client (used when an API
//! key is configured), a client for an external proxy speaking
//! `{prompt, type}` -> `{result}` | `{error}`, and a stand-in that reports the
//! missing configuration.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::catalog;
use crate::config::AssistantConfig;
use crate::i18n::Language;
use crate::listings::domain::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistKind {
    ImproveDescription,
    AdminReview,
    #[default]
    #[serde(other)]
    General,
}

impl AssistKind {
    pub const fn system_instruction(self) -> &'static str {
        match self {
            AssistKind::ImproveDescription => "You are a professional real estate copywriter for Ethiopian rental properties. Rewrite the given property description to be clear, professional, and appealing. Keep the same language as the input (English, Amharic, or Afaan Oromo). Only return the improved description text, nothing else.",
            AssistKind::AdminReview => "You are an AI assistant helping an admin review a house rental listing. Analyze the listing and provide a brief quality assessment. Flag any issues like vague descriptions, missing details, or suspicious content. Rate the listing quality as Good, Fair, or Poor. Keep your response concise (3-5 bullet points). Respond in English.",
            AssistKind::General => "You are a helpful assistant for an Ethiopian house rental platform.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(rename = "type", default)]
    pub kind: AssistKind,
}

impl AssistRequest {
    pub fn new(prompt: impl Into<String>, kind: AssistKind) -> Self {
        Self {
            prompt: prompt.into(),
            kind,
        }
    }

    pub fn validate(&self) -> Result<(), AssistantError> {
        if self.prompt.trim().is_empty() {
            Err(AssistantError::EmptyPrompt)
        } else {
            Ok(())
        }
    }
}

/// Prompt sent when an admin asks for a second opinion on a listing.
pub fn review_prompt(listing: &Listing) -> String {
    format!(
        "Review this rental listing:\nTitle: {}\nCity: {}, {}\nPrice: {} ETB/month\nRooms: {}\nDescription: {}",
        listing.title,
        catalog::city_label(&listing.city, Language::En),
        listing.area,
        listing.price,
        listing.rooms,
        listing.description,
    )
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Prompt is required")]
    EmptyPrompt,
    #[error("GEMINI_API_KEY not configured")]
    NotConfigured,
    #[error("Gemini API error ({status}): {details}")]
    Upstream { status: u16, details: String },
    #[error("AI request failed: {0}")]
    Proxy(String),
    #[error("AI response was not understood: {0}")]
    MalformedResponse(String),
    #[error("AI transport failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AssistantError {
    pub fn status(&self) -> StatusCode {
        match self {
            AssistantError::EmptyPrompt => StatusCode::BAD_REQUEST,
            AssistantError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::Upstream { .. }
            | AssistantError::Proxy(_)
            | AssistantError::MalformedResponse(_)
            | AssistantError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[async_trait]
pub trait TextAssistant: Send + Sync {
    async fn complete(&self, request: &AssistRequest) -> Result<String, AssistantError>;
}

/// Picks the backend the configuration allows.
pub fn from_config(config: &AssistantConfig) -> Arc<dyn TextAssistant> {
    let client = reqwest::Client::new();
    if let Some(api_key) = &config.gemini_api_key {
        Arc::new(GeminiAssistant::new(
            client,
            &config.gemini_api_base,
            &config.gemini_model,
            api_key,
        ))
    } else if let Some(url) = &config.proxy_url {
        Arc::new(ProxyAssistant::new(client, url))
    } else {
        warn!("no AI backend configured; assist requests will fail");
        Arc::new(UnconfiguredAssistant)
    }
}

pub struct GeminiAssistant {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiAssistant {
    pub fn new(client: reqwest::Client, api_base: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

fn first_candidate_text(payload: &Value) -> String {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl TextAssistant for GeminiAssistant {
    async fn complete(&self, request: &AssistRequest) -> Result<String, AssistantError> {
        request.validate()?;

        let body = json!({
            "system_instruction": { "parts": [{ "text": request.kind.system_instruction() }] },
            "contents": [{ "parts": [{ "text": request.prompt }] }],
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generative API returned an error");
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let payload: Value = response.json().await?;
        debug!(kind = ?request.kind, "generative completion received");
        Ok(first_candidate_text(&payload))
    }
}

pub struct ProxyAssistant {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ProxyReply {
    result: Option<String>,
    error: Option<String>,
}

impl ProxyAssistant {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl TextAssistant for ProxyAssistant {
    async fn complete(&self, request: &AssistRequest) -> Result<String, AssistantError> {
        request.validate()?;

        let response = self.client.post(&self.url).json(request).send().await?;
        let ok = response.status().is_success();
        let reply: ProxyReply = response
            .json()
            .await
            .map_err(|err| AssistantError::MalformedResponse(err.to_string()))?;

        match (ok, reply.result, reply.error) {
            (true, Some(result), _) => Ok(result),
            (_, _, Some(error)) => Err(AssistantError::Proxy(error)),
            (true, None, None) => Err(AssistantError::MalformedResponse(
                "missing result".to_string(),
            )),
            (false, _, None) => Err(AssistantError::Proxy("AI request failed".to_string())),
        }
    }
}

pub struct UnconfiguredAssistant;

#[async_trait]
impl TextAssistant for UnconfiguredAssistant {
    async fn complete(&self, request: &AssistRequest) -> Result<String, AssistantError> {
        request.validate()?;
        Err(AssistantError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn unknown_request_type_falls_back_to_general() {
        let request: AssistRequest =
            serde_json::from_value(json!({ "prompt": "hi", "type": "poetry" })).expect("decodes");
        assert_eq!(request.kind, AssistKind::General);
        let request: AssistRequest =
            serde_json::from_value(json!({ "prompt": "hi" })).expect("decodes");
        assert_eq!(request.kind, AssistKind::General);
    }

    #[tokio::test]
    async fn blank_prompt_is_refused_before_any_call() {
        let err = UnconfiguredAssistant
            .complete(&AssistRequest::new("   ", AssistKind::General))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::EmptyPrompt));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = UnconfiguredAssistant
            .complete(&AssistRequest::new("hello", AssistKind::General))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn gemini_client_sends_system_instruction_and_reads_first_candidate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "system_instruction": {
                    "parts": [{ "text": AssistKind::AdminReview.system_instruction() }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "- Quality: Good" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let assistant = GeminiAssistant::new(
            reqwest::Client::new(),
            &server.uri(),
            "gemini-2.0-flash",
            "test-key",
        );
        let text = assistant
            .complete(&AssistRequest::new("Review this", AssistKind::AdminReview))
            .await
            .expect("completion");
        assert_eq!(text, "- Quality: Good");
    }

    #[tokio::test]
    async fn gemini_error_is_reported_as_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let assistant =
            GeminiAssistant::new(reqwest::Client::new(), &server.uri(), "gemini-2.0-flash", "k");
        let err = assistant
            .complete(&AssistRequest::new("x", AssistKind::General))
            .await
            .unwrap_err();
        match err {
            AssistantError::Upstream { status, details } => {
                assert_eq!(status, 429);
                assert_eq!(details, "quota exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn proxy_client_round_trips_result_and_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assist"))
            .and(body_partial_json(json!({ "type": "improve_description" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "Polished" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/broken"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({ "error": "GEMINI_API_KEY not configured" })),
            )
            .mount(&server)
            .await;

        let good = ProxyAssistant::new(reqwest::Client::new(), &format!("{}/assist", server.uri()));
        let text = good
            .complete(&AssistRequest::new("rough text", AssistKind::ImproveDescription))
            .await
            .expect("completion");
        assert_eq!(text, "Polished");

        let broken =
            ProxyAssistant::new(reqwest::Client::new(), &format!("{}/broken", server.uri()));
        let err = broken
            .complete(&AssistRequest::new("rough text", AssistKind::ImproveDescription))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Proxy(message) if message == "GEMINI_API_KEY not configured"
        ));
    }
}
