use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::application::ports::outbound::{SettingsError, SettingsRepositoryPort};
use crate::domain::value_objects::GenerationSettings;

/// Generation settings stored one field per row, values as JSON text
pub struct SqliteSettingsRepository {
    pool: SqlitePool,
}

impl SqliteSettingsRepository {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn to_fields(settings: &GenerationSettings) -> Result<Map<String, Value>, SettingsError> {
    match serde_json::to_value(settings) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(SettingsError::Serialization(
            "settings did not serialize to an object".to_string(),
        )),
        Err(e) => Err(SettingsError::Serialization(e.to_string())),
    }
}

#[async_trait]
impl SettingsRepositoryPort for SqliteSettingsRepository {
    async fn get(&self) -> Result<GenerationSettings, SettingsError> {
        // Env defaults, overridden field by field with stored values
        let mut fields = to_fields(&GenerationSettings::from_env())?;

        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        for (key, value) in rows {
            if !fields.contains_key(&key) {
                continue;
            }
            if let Ok(value) = serde_json::from_str::<Value>(&value) {
                fields.insert(key, value);
            }
        }

        serde_json::from_value(Value::Object(fields))
            .map_err(|e| SettingsError::Serialization(e.to_string()))
    }

    async fn save(&self, settings: &GenerationSettings) -> Result<(), SettingsError> {
        for (key, value) in to_fields(settings)? {
            sqlx::query(
                "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
            )
            .bind(key)
            .bind(value.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| SettingsError::Database(e.to_string()))?;
        }

        Ok(())
    }

    async fn reset(&self) -> Result<GenerationSettings, SettingsError> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        Ok(GenerationSettings::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::memory_pool;

    #[tokio::test]
    async fn test_saved_settings_are_read_back() {
        let repo = SqliteSettingsRepository::new(memory_pool().await).await.unwrap();
        let settings = GenerationSettings {
            max_locations: 2,
            length_tolerance: 0.2,
            ..Default::default()
        };

        repo.save(&settings).await.unwrap();
        let loaded = repo.get().await.unwrap();

        assert_eq!(loaded.max_locations, 2);
        assert_eq!(loaded.length_tolerance, 0.2);
    }

    #[tokio::test]
    async fn test_reset_clears_stored_values() {
        let pool = memory_pool().await;
        let repo = SqliteSettingsRepository::new(pool.clone()).await.unwrap();
        repo.save(&GenerationSettings {
            max_creatures: 9,
            ..Default::default()
        })
        .await
        .unwrap();

        repo.reset().await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM settings")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
