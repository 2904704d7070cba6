//! SQLite persistence adapters
//!
//! Ids are stored in their hyphenated text form and timestamps as RFC 3339
//! text. List queries order by `rowid` so records come back in insertion
//! order.

mod settings_repository;
mod story_repository;

pub use settings_repository::SqliteSettingsRepository;
pub use story_repository::SqliteStoryRepository;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

const SCHEMA: [&str; 9] = [
    r#"
    CREATE TABLE IF NOT EXISTS stories (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        synopsis TEXT NOT NULL DEFAULT '',
        genre TEXT NOT NULL,
        themes TEXT NOT NULL DEFAULT '',
        tone TEXT NOT NULL DEFAULT '',
        writing_style TEXT NOT NULL DEFAULT '',
        target_length INTEGER,
        current_chapter INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        age INTEGER,
        gender TEXT NOT NULL DEFAULT '',
        appearance TEXT NOT NULL DEFAULT '',
        personality TEXT NOT NULL DEFAULT '',
        background TEXT NOT NULL DEFAULT '',
        abilities TEXT NOT NULL DEFAULT '',
        motivations TEXT NOT NULL DEFAULT '',
        relationships TEXT NOT NULL DEFAULT '',
        character_arc TEXT NOT NULL DEFAULT '',
        voice_style TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'alive'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        location_type TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        culture TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS creatures (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        creature_type TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        habitat TEXT NOT NULL DEFAULT '',
        abilities TEXT NOT NULL DEFAULT '',
        danger_level TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS power_systems (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        rules TEXT NOT NULL DEFAULT '',
        limitations TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lore (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        category TEXT NOT NULL DEFAULT '',
        title TEXT NOT NULL,
        content TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chapters (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        chapter_number INTEGER NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        word_count INTEGER NOT NULL,
        summary TEXT,
        pov_character_id TEXT,
        status TEXT NOT NULL DEFAULT 'draft',
        prompt_used TEXT NOT NULL DEFAULT '',
        generation_params TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (story_id, chapter_number)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS story_arcs (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        arc_number INTEGER NOT NULL,
        name TEXT NOT NULL,
        synopsis TEXT NOT NULL DEFAULT '',
        start_chapter INTEGER,
        end_chapter INTEGER,
        progression TEXT NOT NULL DEFAULT '{}',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (story_id, arc_number)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS world_generations (
        id TEXT PRIMARY KEY,
        story_id TEXT NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        subject TEXT NOT NULL DEFAULT '',
        prompt TEXT NOT NULL,
        result TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

/// Open the database and make sure every story table exists
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", database_url))?;

    initialize_schema(&pool).await?;
    info!("Connected to SQLite at {}", database_url);
    Ok(pool)
}

pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("Failed to create schema")?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    initialize_schema(&pool).await.unwrap();
    pool
}
