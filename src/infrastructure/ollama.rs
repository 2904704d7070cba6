//! Ollama client for chapter generation
//!
//! Talks to the native Ollama API (`/api/generate`, non-streaming). Every
//! failure is mapped onto `LlmError` and returned as is; retrying is left
//! to whoever triggered the generation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ports::outbound::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, TokenUsage,
};
use crate::infrastructure::config::OllamaConfig;

/// Nucleus sampling used when the request does not set its own
const TOP_P: f32 = 0.9;

/// Client for the Ollama API
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    request_timeout: Duration,
    health_check_timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self, reqwest::Error> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        Ok(Self {
            client: Client::builder().timeout(request_timeout).build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            request_timeout,
            health_check_timeout: Duration::from_secs(config.health_check_timeout_secs),
        })
    }

    fn map_error(&self, err: reqwest::Error, timeout: Duration) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(timeout.as_secs())
        } else if err.is_connect() {
            LlmError::Connection(err.to_string())
        } else if err.is_decode() || err.is_body() {
            LlmError::Protocol(err.to_string())
        } else {
            LlmError::Connection(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions<'a>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[async_trait]
impl LlmPort for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: request.system_prompt.as_deref(),
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                top_p: request.top_p.unwrap_or(TOP_P),
                num_predict: request.max_tokens,
                num_ctx: request.context_window,
                stop: &request.stop,
            },
        };

        debug!(
            model = %self.model,
            num_predict = ?request.max_tokens,
            num_ctx = ?request.context_window,
            "Sending generate request to Ollama"
        );

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_error(e, self.request_timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_error(e, self.request_timeout))?;

        if !status.is_success() {
            warn!(status = %status, "Ollama returned an error status");
            return Err(LlmError::Protocol(format!("HTTP {}: {}", status, text.trim())));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::Protocol(format!("Undecodable response body: {}", e)))?;
        let content = parsed
            .response
            .ok_or_else(|| LlmError::Protocol("Response body has no `response` field".into()))?;

        let finish_reason = match parsed.done_reason.as_deref() {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            _ => FinishReason::Unknown,
        };
        let usage = match (parsed.prompt_eval_count, parsed.eval_count) {
            (Some(prompt_tokens), Some(completion_tokens)) => Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens.saturating_add(completion_tokens),
            }),
            _ => None,
        };

        debug!(
            chars = content.len(),
            finish_reason = ?finish_reason,
            "Ollama generation finished"
        );

        Ok(LlmResponse {
            content,
            finish_reason,
            usage,
        })
    }

    async fn health_check(&self) -> Result<bool, LlmError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.health_check_timeout)
            .send()
            .await
            .map_err(|e| self.map_error(e, self.health_check_timeout))?;

        Ok(response.status().is_success())
    }
}
