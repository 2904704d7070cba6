use async_trait::async_trait;

use crate::domain::value_objects::GenerationSettings;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

#[async_trait]
pub trait SettingsRepositoryPort: Send + Sync {
    async fn get(&self) -> Result<GenerationSettings, SettingsError>;
    async fn save(&self, settings: &GenerationSettings) -> Result<(), SettingsError>;
    async fn reset(&self) -> Result<GenerationSettings, SettingsError>;
}
