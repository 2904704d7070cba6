//! Outbound ports - Interfaces that the application requires from external systems

mod llm_port;
mod repository_port;
mod settings_port;

pub use llm_port::{FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, TokenUsage};
pub use repository_port::StoryRepositoryPort;
pub use settings_port::{SettingsError, SettingsRepositoryPort};
