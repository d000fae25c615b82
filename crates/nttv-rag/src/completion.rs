//! OpenAI-compatible chat completion client.
//!
//! Never fails: transport, status and decoding errors become an empty
//! `Completion` whose `raw` field is a small JSON diagnostic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use nttv_core::config::LlmSettings;
use nttv_core::text::truncate_chars;
use nttv_core::traits::Completer;
use nttv_core::types::Completion;
use nttv_core::{Error, Result};

/// Cap on the raw response kept for diagnostics.
const RAW_LIMIT: usize = 4000;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct HttpCompleter {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl HttpCompleter {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| Error::upstream("completion", e))?;
        Ok(Self {
            client,
            url: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            api_key: settings.resolved_api_key(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    async fn request(&self, system: &str, user: &str) -> std::result::Result<(String, String), (&'static str, String)> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "system", content: system }, ChatMessage { role: "user", content: user }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let mut req = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| (error_kind(&e), e.to_string()))?;
        let raw = resp.text().await.map_err(|e| (error_kind(&e), e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&raw).map_err(|e| ("DecodeError", e.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        Ok((text, truncate_chars(&raw, RAW_LIMIT).to_string()))
    }
}

fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "ConnectionError"
    } else if e.is_status() {
        "HTTPError"
    } else if e.is_decode() {
        "DecodeError"
    } else {
        "RequestError"
    }
}

#[async_trait]
impl Completer for HttpCompleter {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str) -> Completion {
        match self.request(system, user).await {
            Ok((text, raw)) => Completion { text, raw },
            Err((kind, detail)) => {
                warn!(error = kind, %detail, url = %self.url, "completion failed");
                let raw = serde_json::json!({ "error": kind, "detail": detail }).to_string();
                Completion { text: String::new(), raw }
            }
        }
    }
}
