//! LLM port - the completion endpoint as seen by the application

use async_trait::async_trait;

/// A single non-streaming completion request
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    /// Upper bound on generated tokens
    pub max_tokens: Option<u32>,
    /// Context window the endpoint should allocate for this request
    pub context_window: Option<u32>,
    pub stop: Vec<String>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            prompt: prompt.into(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            context_window: None,
            stop: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_context_window(mut self, tokens: u32) -> Self {
        self.context_window = Some(tokens);
        self
    }

    pub fn with_stop(mut self, sequence: impl Into<String>) -> Self {
        self.stop.push(sequence.into());
        self
    }
}

/// Response from the LLM
#[derive(Debug, Clone, PartialEq)]
pub struct LlmResponse {
    /// The generated text content
    pub content: String,
    pub finish_reason: FinishReason,
    /// Token usage, when the endpoint reports it
    pub usage: Option<TokenUsage>,
}

/// Reason the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Unknown,
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Failures at the network boundary. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("Cannot reach the completion endpoint: {0}")]
    Connection(String),
    #[error("Completion endpoint did not answer within {0} seconds")]
    Timeout(u64),
    #[error("Unexpected response from the completion endpoint: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait LlmPort: Send + Sync {
    /// Identifier of the model requests are sent to
    fn model_name(&self) -> &str;

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Whether the endpoint is up and answering
    async fn health_check(&self) -> Result<bool, LlmError>;
}
