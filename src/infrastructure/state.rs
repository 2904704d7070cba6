//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::outbound::StoryRepositoryPort;
use crate::application::services::{
    ChapterGenerationService, SettingsService, StoryServiceImpl, WorldBuildingService,
};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::persistence::{self, SqliteSettingsRepository, SqliteStoryRepository};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub llm_client: Arc<OllamaClient>,
    // Application services
    pub story_service: StoryServiceImpl,
    pub settings_service: Arc<SettingsService>,
    pub generation_service: ChapterGenerationService,
    pub world_building_service: WorldBuildingService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = persistence::connect(&config.database_url).await?;

        let repository: Arc<dyn StoryRepositoryPort> =
            Arc::new(SqliteStoryRepository::new(pool.clone()));
        let settings_repository = SqliteSettingsRepository::new(pool)
            .await
            .context("Failed to prepare settings table")?;
        let settings_service = Arc::new(SettingsService::new(Arc::new(settings_repository)));

        let llm_client = Arc::new(
            OllamaClient::new(&config.ollama).context("Failed to build Ollama client")?,
        );

        let story_service = StoryServiceImpl::new(repository.clone());
        let world_building_service =
            WorldBuildingService::new(repository.clone(), llm_client.clone());
        let generation_service = ChapterGenerationService::new(
            repository,
            llm_client.clone(),
            settings_service.clone(),
        );

        Ok(Self {
            config,
            llm_client,
            story_service,
            settings_service,
            generation_service,
            world_building_service,
        })
    }
}
