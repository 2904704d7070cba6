use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::application::ports::outbound::{SettingsError, SettingsRepositoryPort};
use crate::domain::value_objects::GenerationSettings;

pub struct SettingsService {
    repository: Arc<dyn SettingsRepositoryPort>,
    cache: RwLock<Option<GenerationSettings>>,
}

impl SettingsService {
    pub fn new(repository: Arc<dyn SettingsRepositoryPort>) -> Self {
        Self {
            repository,
            cache: RwLock::new(None),
        }
    }

    /// Get current settings (cached)
    pub async fn get(&self) -> GenerationSettings {
        let cache = self.cache.read().await;
        if let Some(settings) = &*cache {
            return settings.clone();
        }
        drop(cache);

        // Load from DB
        match self.repository.get().await {
            Ok(settings) => {
                *self.cache.write().await = Some(settings.clone());
                settings
            }
            Err(e) => {
                warn!(error = %e, "Falling back to environment settings");
                GenerationSettings::from_env()
            }
        }
    }

    /// Validate, persist and cache new settings
    pub async fn update(&self, settings: GenerationSettings) -> Result<(), SettingsError> {
        settings.validate().map_err(SettingsError::Invalid)?;
        self.repository.save(&settings).await?;
        *self.cache.write().await = Some(settings);
        info!("Generation settings updated");
        Ok(())
    }

    /// Reset to env/defaults and clear DB values
    pub async fn reset(&self) -> Result<GenerationSettings, SettingsError> {
        let settings = self.repository.reset().await?;
        *self.cache.write().await = Some(settings.clone());
        Ok(settings)
    }
}
