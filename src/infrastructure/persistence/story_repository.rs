//! SQLite repository for stories and everything that belongs to them

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::application::ports::outbound::StoryRepositoryPort;
use crate::domain::entities::{
    Chapter, ChapterStatus, Character, Creature, Location, LoreEntry, PowerSystem, Story,
    StoryArc, WorldGeneration, WorldGenerationKind,
};
use crate::domain::value_objects::{
    ArcId, ChapterId, CharacterId, CreatureId, LocationId, LoreId, PowerSystemId, RoleTier,
    StoryId, WorldGenerationId,
};

#[derive(Clone)]
pub struct SqliteStoryRepository {
    pool: SqlitePool,
}

impl SqliteStoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoryRepositoryPort for SqliteStoryRepository {
    async fn create_story(&self, story: &Story) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stories (id, title, synopsis, genre, themes, tone, writing_style,
                                 target_length, current_chapter, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(story.id.to_string())
        .bind(&story.title)
        .bind(&story.synopsis)
        .bind(&story.genre)
        .bind(&story.themes)
        .bind(&story.tone)
        .bind(&story.writing_style)
        .bind(story.target_length)
        .bind(story.current_chapter)
        .bind(story.created_at)
        .bind(story.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert story")?;
        Ok(())
    }

    async fn get_story(&self, id: StoryId) -> Result<Option<Story>> {
        let row = sqlx::query("SELECT * FROM stories WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query story")?;
        row.as_ref().map(story_from_row).transpose()
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        let rows = sqlx::query("SELECT * FROM stories ORDER BY updated_at DESC, rowid DESC")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list stories")?;
        rows.iter().map(story_from_row).collect()
    }

    async fn add_character(&self, character: &Character) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO characters (id, story_id, name, role, age, gender, appearance,
                                    personality, background, abilities, motivations,
                                    relationships, character_arc, voice_style, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(character.id.to_string())
        .bind(character.story_id.to_string())
        .bind(&character.name)
        .bind(character.role.as_str())
        .bind(character.age)
        .bind(&character.gender)
        .bind(&character.appearance)
        .bind(&character.personality)
        .bind(&character.background)
        .bind(&character.abilities)
        .bind(&character.motivations)
        .bind(&character.relationships)
        .bind(&character.character_arc)
        .bind(&character.voice_style)
        .bind(&character.status)
        .execute(&self.pool)
        .await
        .context("Failed to insert character")?;
        Ok(())
    }

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>> {
        let row = sqlx::query("SELECT * FROM characters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query character")?;
        row.as_ref().map(character_from_row).transpose()
    }

    async fn list_characters(&self, story_id: StoryId) -> Result<Vec<Character>> {
        let rows = sqlx::query("SELECT * FROM characters WHERE story_id = ? ORDER BY rowid")
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list characters")?;
        rows.iter().map(character_from_row).collect()
    }

    async fn add_location(&self, location: &Location) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO locations (id, story_id, name, location_type, description, culture)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(location.id.to_string())
        .bind(location.story_id.to_string())
        .bind(&location.name)
        .bind(&location.location_type)
        .bind(&location.description)
        .bind(&location.culture)
        .execute(&self.pool)
        .await
        .context("Failed to insert location")?;
        Ok(())
    }

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>> {
        let row = sqlx::query("SELECT * FROM locations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query location")?;
        row.as_ref().map(location_from_row).transpose()
    }

    async fn list_locations(&self, story_id: StoryId) -> Result<Vec<Location>> {
        let rows = sqlx::query("SELECT * FROM locations WHERE story_id = ? ORDER BY rowid")
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list locations")?;
        rows.iter().map(location_from_row).collect()
    }

    async fn add_creature(&self, creature: &Creature) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO creatures (id, story_id, name, creature_type, description, habitat,
                                   abilities, danger_level)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(creature.id.to_string())
        .bind(creature.story_id.to_string())
        .bind(&creature.name)
        .bind(&creature.creature_type)
        .bind(&creature.description)
        .bind(&creature.habitat)
        .bind(&creature.abilities)
        .bind(&creature.danger_level)
        .execute(&self.pool)
        .await
        .context("Failed to insert creature")?;
        Ok(())
    }

    async fn get_creature(&self, id: CreatureId) -> Result<Option<Creature>> {
        let row = sqlx::query("SELECT * FROM creatures WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query creature")?;
        row.as_ref().map(creature_from_row).transpose()
    }

    async fn list_creatures(&self, story_id: StoryId) -> Result<Vec<Creature>> {
        let rows = sqlx::query("SELECT * FROM creatures WHERE story_id = ? ORDER BY rowid")
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list creatures")?;
        rows.iter().map(creature_from_row).collect()
    }

    async fn add_power_system(&self, power_system: &PowerSystem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO power_systems (id, story_id, name, description, rules, limitations)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(power_system.id.to_string())
        .bind(power_system.story_id.to_string())
        .bind(&power_system.name)
        .bind(&power_system.description)
        .bind(&power_system.rules)
        .bind(&power_system.limitations)
        .execute(&self.pool)
        .await
        .context("Failed to insert power system")?;
        Ok(())
    }

    async fn list_power_systems(&self, story_id: StoryId) -> Result<Vec<PowerSystem>> {
        let rows = sqlx::query("SELECT * FROM power_systems WHERE story_id = ? ORDER BY rowid")
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list power systems")?;
        rows.iter()
            .map(|row| {
                Ok(PowerSystem {
                    id: PowerSystemId::parse(&row.try_get::<String, _>("id")?)?,
                    story_id: story_id_column(row)?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    rules: row.try_get("rules")?,
                    limitations: row.try_get("limitations")?,
                })
            })
            .collect()
    }

    async fn add_lore(&self, entry: &LoreEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO lore (id, story_id, category, title, content) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.story_id.to_string())
        .bind(&entry.category)
        .bind(&entry.title)
        .bind(&entry.content)
        .execute(&self.pool)
        .await
        .context("Failed to insert lore entry")?;
        Ok(())
    }

    async fn list_lore(&self, story_id: StoryId) -> Result<Vec<LoreEntry>> {
        let rows = sqlx::query("SELECT * FROM lore WHERE story_id = ? ORDER BY rowid")
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list lore")?;
        rows.iter()
            .map(|row| {
                Ok(LoreEntry {
                    id: LoreId::parse(&row.try_get::<String, _>("id")?)?,
                    story_id: story_id_column(row)?,
                    category: row.try_get("category")?,
                    title: row.try_get("title")?,
                    content: row.try_get("content")?,
                })
            })
            .collect()
    }

    async fn add_arc(&self, arc: &StoryArc) -> Result<()> {
        let progression =
            serde_json::to_string(&arc.progression).context("Failed to serialize progression")?;
        sqlx::query(
            r#"
            INSERT INTO story_arcs (id, story_id, arc_number, name, synopsis, start_chapter,
                                    end_chapter, progression, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(arc.id.to_string())
        .bind(arc.story_id.to_string())
        .bind(arc.arc_number)
        .bind(&arc.name)
        .bind(&arc.synopsis)
        .bind(arc.start_chapter)
        .bind(arc.end_chapter)
        .bind(progression)
        .bind(arc.created_at)
        .bind(arc.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert story arc")?;
        Ok(())
    }

    async fn get_arc(&self, id: ArcId) -> Result<Option<StoryArc>> {
        let row = sqlx::query("SELECT * FROM story_arcs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to query story arc")?;
        row.as_ref().map(arc_from_row).transpose()
    }

    async fn list_arcs(&self, story_id: StoryId) -> Result<Vec<StoryArc>> {
        let rows = sqlx::query("SELECT * FROM story_arcs WHERE story_id = ? ORDER BY arc_number")
            .bind(story_id.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list story arcs")?;
        rows.iter().map(arc_from_row).collect()
    }

    async fn update_arc_progression(&self, arc: &StoryArc) -> Result<bool> {
        let progression =
            serde_json::to_string(&arc.progression).context("Failed to serialize progression")?;
        let result = sqlx::query("UPDATE story_arcs SET progression = ?, updated_at = ? WHERE id = ?")
            .bind(progression)
            .bind(arc.updated_at)
            .bind(arc.id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update arc progression")?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_world_generation(&self, generation: &WorldGeneration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO world_generations (id, story_id, kind, subject, prompt, result, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(generation.id.to_string())
        .bind(generation.story_id.to_string())
        .bind(generation.kind.as_str())
        .bind(&generation.subject)
        .bind(&generation.prompt)
        .bind(&generation.result)
        .bind(generation.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert world generation")?;
        Ok(())
    }

    async fn list_world_generations(&self, story_id: StoryId) -> Result<Vec<WorldGeneration>> {
        let rows = sqlx::query(
            "SELECT * FROM world_generations WHERE story_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(story_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list world generations")?;
        rows.iter().map(world_generation_from_row).collect()
    }

    async fn save_chapter(&self, chapter: &Chapter) -> Result<()> {
        let generation_params = chapter
            .generation_params
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to serialize generation parameters")?;

        let mut tx = self.pool.begin().await.context("Failed to open transaction")?;

        // An existing chapter keeps its id and creation time
        sqlx::query(
            r#"
            INSERT INTO chapters (id, story_id, chapter_number, title, content, word_count,
                                  summary, pov_character_id, status, prompt_used,
                                  generation_params, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (story_id, chapter_number) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                word_count = excluded.word_count,
                summary = excluded.summary,
                pov_character_id = excluded.pov_character_id,
                status = excluded.status,
                prompt_used = excluded.prompt_used,
                generation_params = excluded.generation_params,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.story_id.to_string())
        .bind(chapter.chapter_number)
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(chapter.word_count as i64)
        .bind(&chapter.summary)
        .bind(chapter.pov_character_id.map(|id| id.to_string()))
        .bind(chapter.status.as_str())
        .bind(&chapter.prompt_used)
        .bind(generation_params)
        .bind(chapter.created_at)
        .bind(chapter.updated_at)
        .execute(&mut *tx)
        .await
        .context("Failed to upsert chapter")?;

        sqlx::query(
            r#"
            UPDATE stories
            SET current_chapter = MAX(current_chapter, ?), updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(chapter.chapter_number)
        .bind(chapter.updated_at)
        .bind(chapter.story_id.to_string())
        .execute(&mut *tx)
        .await
        .context("Failed to advance current chapter")?;

        tx.commit().await.context("Failed to commit chapter")?;
        Ok(())
    }

    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<Chapter>> {
        let rows = sqlx::query(
            "SELECT * FROM chapters WHERE story_id = ? ORDER BY chapter_number",
        )
        .bind(story_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list chapters")?;
        rows.iter().map(chapter_from_row).collect()
    }

    async fn latest_chapter(&self, story_id: StoryId) -> Result<Option<Chapter>> {
        let row = sqlx::query(
            "SELECT * FROM chapters WHERE story_id = ? ORDER BY chapter_number DESC LIMIT 1",
        )
        .bind(story_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to query latest chapter")?;
        row.as_ref().map(chapter_from_row).transpose()
    }
}

fn story_id_column(row: &SqliteRow) -> Result<StoryId> {
    Ok(StoryId::parse(&row.try_get::<String, _>("story_id")?)?)
}

fn story_from_row(row: &SqliteRow) -> Result<Story> {
    Ok(Story {
        id: StoryId::parse(&row.try_get::<String, _>("id")?)?,
        title: row.try_get("title")?,
        synopsis: row.try_get("synopsis")?,
        genre: row.try_get("genre")?,
        themes: row.try_get("themes")?,
        tone: row.try_get("tone")?,
        writing_style: row.try_get("writing_style")?,
        target_length: row.try_get("target_length")?,
        current_chapter: row.try_get("current_chapter")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn character_from_row(row: &SqliteRow) -> Result<Character> {
    let role: String = row.try_get("role")?;
    Ok(Character {
        id: CharacterId::parse(&row.try_get::<String, _>("id")?)?,
        story_id: story_id_column(row)?,
        name: row.try_get("name")?,
        role: role.parse::<RoleTier>()?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        appearance: row.try_get("appearance")?,
        personality: row.try_get("personality")?,
        background: row.try_get("background")?,
        abilities: row.try_get("abilities")?,
        motivations: row.try_get("motivations")?,
        relationships: row.try_get("relationships")?,
        character_arc: row.try_get("character_arc")?,
        voice_style: row.try_get("voice_style")?,
        status: row.try_get("status")?,
    })
}

fn location_from_row(row: &SqliteRow) -> Result<Location> {
    Ok(Location {
        id: LocationId::parse(&row.try_get::<String, _>("id")?)?,
        story_id: story_id_column(row)?,
        name: row.try_get("name")?,
        location_type: row.try_get("location_type")?,
        description: row.try_get("description")?,
        culture: row.try_get("culture")?,
    })
}

fn creature_from_row(row: &SqliteRow) -> Result<Creature> {
    Ok(Creature {
        id: CreatureId::parse(&row.try_get::<String, _>("id")?)?,
        story_id: story_id_column(row)?,
        name: row.try_get("name")?,
        creature_type: row.try_get("creature_type")?,
        description: row.try_get("description")?,
        habitat: row.try_get("habitat")?,
        abilities: row.try_get("abilities")?,
        danger_level: row.try_get("danger_level")?,
    })
}

fn arc_from_row(row: &SqliteRow) -> Result<StoryArc> {
    let progression: String = row.try_get("progression")?;
    Ok(StoryArc {
        id: ArcId::parse(&row.try_get::<String, _>("id")?)?,
        story_id: story_id_column(row)?,
        arc_number: row.try_get("arc_number")?,
        name: row.try_get("name")?,
        synopsis: row.try_get("synopsis")?,
        start_chapter: row.try_get("start_chapter")?,
        end_chapter: row.try_get("end_chapter")?,
        progression: serde_json::from_str(&progression)
            .context("Stored arc progression is not a JSON object of strings")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn world_generation_from_row(row: &SqliteRow) -> Result<WorldGeneration> {
    let kind: String = row.try_get("kind")?;
    Ok(WorldGeneration {
        id: WorldGenerationId::parse(&row.try_get::<String, _>("id")?)?,
        story_id: story_id_column(row)?,
        kind: WorldGenerationKind::parse(&kind)
            .with_context(|| format!("Unknown world generation kind '{}'", kind))?,
        subject: row.try_get("subject")?,
        prompt: row.try_get("prompt")?,
        result: row.try_get("result")?,
        created_at: row.try_get("created_at")?,
    })
}

fn chapter_from_row(row: &SqliteRow) -> Result<Chapter> {
    let pov: Option<String> = row.try_get("pov_character_id")?;
    let params: Option<String> = row.try_get("generation_params")?;
    let word_count: i64 = row.try_get("word_count")?;
    Ok(Chapter {
        id: ChapterId::parse(&row.try_get::<String, _>("id")?)?,
        story_id: story_id_column(row)?,
        chapter_number: row.try_get("chapter_number")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        word_count: usize::try_from(word_count).unwrap_or(0),
        summary: row.try_get("summary")?,
        pov_character_id: pov.as_deref().map(CharacterId::parse).transpose()?,
        status: ChapterStatus::parse(&row.try_get::<String, _>("status")?),
        prompt_used: row.try_get("prompt_used")?,
        generation_params: params
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Stored generation parameters are not valid JSON")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::memory_pool;

    async fn repo_with_story() -> (SqliteStoryRepository, Story) {
        let repo = SqliteStoryRepository::new(memory_pool().await);
        let story = Story::new("Crimson Spire")
            .with_genre("Isekai")
            .with_target_length(12);
        repo.create_story(&story).await.unwrap();
        (repo, story)
    }

    #[tokio::test]
    async fn test_story_round_trip() {
        let (repo, story) = repo_with_story().await;

        let loaded = repo.get_story(story.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Crimson Spire");
        assert_eq!(loaded.genre, "Isekai");
        assert_eq!(loaded.target_length, Some(12));
        assert_eq!(loaded.current_chapter, 0);

        assert!(repo.get_story(StoryId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_characters_come_back_in_insertion_order() {
        let (repo, story) = repo_with_story().await;
        for (name, role) in [
            ("Zed", RoleTier::Minor),
            ("Aria", RoleTier::Protagonist),
            ("Mio", RoleTier::LoveInterest),
        ] {
            repo.add_character(
                &Character::new(story.id, name, role)
                    .with_age(17)
                    .with_personality("Stubborn."),
            )
            .await
            .unwrap();
        }

        let characters = repo.list_characters(story.id).await.unwrap();
        let names: Vec<_> = characters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Zed", "Aria", "Mio"]);
        assert_eq!(characters[2].role, RoleTier::LoveInterest);
        assert_eq!(characters[0].age, Some(17));

        let aria = repo.get_character(characters[1].id).await.unwrap().unwrap();
        assert_eq!(aria.personality, "Stubborn.");
    }

    #[tokio::test]
    async fn test_world_elements_are_scoped_to_story() {
        let (repo, story) = repo_with_story().await;
        let other = Story::new("Other");
        repo.create_story(&other).await.unwrap();

        repo.add_location(&Location::new(story.id, "Spire", "Tower"))
            .await
            .unwrap();
        repo.add_location(&Location::new(other.id, "Harbor", "Town"))
            .await
            .unwrap();
        repo.add_creature(&Creature::new(story.id, "Ash Wyrm", "Dragon").with_danger_level("S"))
            .await
            .unwrap();
        repo.add_power_system(&PowerSystem::new(story.id, "Runecraft").with_rules("Costs blood."))
            .await
            .unwrap();
        repo.add_lore(&LoreEntry::new(story.id, "History", "The Fall", "The spire fell."))
            .await
            .unwrap();

        let locations = repo.list_locations(story.id).await.unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Spire");
        assert_eq!(repo.list_creatures(story.id).await.unwrap()[0].danger_level, "S");
        assert_eq!(repo.list_power_systems(story.id).await.unwrap()[0].rules, "Costs blood.");
        assert_eq!(repo.list_lore(story.id).await.unwrap()[0].title, "The Fall");
        assert!(repo.list_creatures(other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_chapter_upserts_and_advances_story() {
        let (repo, story) = repo_with_story().await;

        let first = Chapter::new(story.id, 2, "Old text.").with_summary("Old recap.");
        repo.save_chapter(&first).await.unwrap();
        repo.save_chapter(&Chapter::new(story.id, 1, "Opening.")).await.unwrap();
        let replacement = Chapter::new(story.id, 2, "New text here.").with_summary("New recap.");
        repo.save_chapter(&replacement).await.unwrap();

        let chapters = repo.list_chapters(story.id).await.unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].chapter_number, 1);
        assert_eq!(chapters[1].content, "New text here.");
        assert_eq!(chapters[1].word_count, 3);
        assert_eq!(chapters[1].id, first.id);

        let latest = repo.latest_chapter(story.id).await.unwrap().unwrap();
        assert_eq!(latest.summary.as_deref(), Some("New recap."));

        let story = repo.get_story(story.id).await.unwrap().unwrap();
        assert_eq!(story.current_chapter, 2);
    }

    #[tokio::test]
    async fn test_chapter_keeps_pov_and_status() {
        let (repo, story) = repo_with_story().await;
        let pov = CharacterId::new();
        let chapter = Chapter::new(story.id, 1, "Text.")
            .with_pov_character(pov)
            .with_status(ChapterStatus::Final);
        repo.save_chapter(&chapter).await.unwrap();

        let loaded = repo.latest_chapter(story.id).await.unwrap().unwrap();
        assert_eq!(loaded.pov_character_id, Some(pov));
        assert_eq!(loaded.status, ChapterStatus::Final);
        assert!(loaded.summary.is_none());
        assert!(loaded.generation_params.is_none());
    }

    #[tokio::test]
    async fn test_get_location_and_creature_by_id() {
        let (repo, story) = repo_with_story().await;
        let harbor = Location::new(story.id, "Harbor", "Town").with_culture("Salt-priests.");
        repo.add_location(&harbor).await.unwrap();
        let wyrm = Creature::new(story.id, "Ash Wyrm", "Dragon").with_habitat("Caldera");
        repo.add_creature(&wyrm).await.unwrap();

        let loaded = repo.get_location(harbor.id).await.unwrap().unwrap();
        assert_eq!(loaded.culture, "Salt-priests.");
        assert_eq!(repo.get_creature(wyrm.id).await.unwrap().unwrap().habitat, "Caldera");
        assert!(repo.get_location(LocationId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_arcs_order_and_progression_update() {
        let (repo, story) = repo_with_story().await;
        let second = StoryArc::new(story.id, 2, "The Fall").spanning(Some(5), Some(9));
        let first = StoryArc::new(story.id, 1, "Arrival")
            .with_synopsis("Aria wakes in the spire.")
            .spanning(Some(1), Some(4))
            .with_progress("main_conflict", "introduced");
        repo.add_arc(&second).await.unwrap();
        repo.add_arc(&first).await.unwrap();

        let arcs = repo.list_arcs(story.id).await.unwrap();
        let numbers: Vec<_> = arcs.iter().map(|a| a.arc_number).collect();
        assert_eq!(numbers, [1, 2]);
        assert_eq!(arcs[0].progression["main_conflict"], "introduced");
        assert_eq!(arcs[1].end_chapter, Some(9));

        let updated = second.with_progress("aria_trust", "broken");
        assert!(repo.update_arc_progression(&updated).await.unwrap());
        let loaded = repo.get_arc(updated.id).await.unwrap().unwrap();
        assert_eq!(loaded.progression["aria_trust"], "broken");

        let stray = StoryArc::new(story.id, 9, "Never saved");
        assert!(!repo.update_arc_progression(&stray).await.unwrap());

        // Arc numbers are unique per story
        assert!(repo.add_arc(&StoryArc::new(story.id, 1, "Duplicate")).await.is_err());
    }

    #[tokio::test]
    async fn test_world_generation_history_newest_first() {
        let (repo, story) = repo_with_story().await;
        let older = WorldGeneration::new(
            story.id,
            WorldGenerationKind::Lore,
            "The Fall",
            "lore prompt",
            "lore result",
        );
        let mut newer = WorldGeneration::new(
            story.id,
            WorldGenerationKind::PowerSystem,
            "Bellcraft",
            "power prompt",
            "power result",
        );
        newer.created_at = older.created_at + chrono::Duration::seconds(5);
        repo.add_world_generation(&older).await.unwrap();
        repo.add_world_generation(&newer).await.unwrap();

        let history = repo.list_world_generations(story.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, WorldGenerationKind::PowerSystem);
        assert_eq!(history[1].subject, "The Fall");
        assert!(repo
            .list_world_generations(StoryId::new())
            .await
            .unwrap()
            .is_empty());
    }
}
