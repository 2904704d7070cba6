//! Repository ports - Interfaces for data persistence
//!
//! These traits define the contracts that infrastructure repositories must implement.
//! Application services depend on these traits, not concrete implementations.
//! List accessors return records in insertion order unless noted otherwise.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::entities::{
    Chapter, Character, Creature, Location, LoreEntry, PowerSystem, Story, StoryArc,
    WorldGeneration,
};
use crate::domain::value_objects::{ArcId, CharacterId, CreatureId, LocationId, StoryId};

// =============================================================================
// Story Repository Port
// =============================================================================

/// Repository port for a story and everything that belongs to it
#[async_trait]
pub trait StoryRepositoryPort: Send + Sync {
    /// Create a new story
    async fn create_story(&self, story: &Story) -> Result<()>;

    /// Get a story by ID
    async fn get_story(&self, id: StoryId) -> Result<Option<Story>>;

    /// List all stories, most recently updated first
    async fn list_stories(&self) -> Result<Vec<Story>>;

    async fn add_character(&self, character: &Character) -> Result<()>;

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>>;

    async fn list_characters(&self, story_id: StoryId) -> Result<Vec<Character>>;

    async fn add_location(&self, location: &Location) -> Result<()>;

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>>;

    async fn list_locations(&self, story_id: StoryId) -> Result<Vec<Location>>;

    async fn add_creature(&self, creature: &Creature) -> Result<()>;

    async fn get_creature(&self, id: CreatureId) -> Result<Option<Creature>>;

    async fn list_creatures(&self, story_id: StoryId) -> Result<Vec<Creature>>;

    async fn add_power_system(&self, power_system: &PowerSystem) -> Result<()>;

    async fn list_power_systems(&self, story_id: StoryId) -> Result<Vec<PowerSystem>>;

    async fn add_lore(&self, entry: &LoreEntry) -> Result<()>;

    async fn list_lore(&self, story_id: StoryId) -> Result<Vec<LoreEntry>>;

    async fn add_arc(&self, arc: &StoryArc) -> Result<()>;

    async fn get_arc(&self, id: ArcId) -> Result<Option<StoryArc>>;

    /// Arcs ordered by arc number
    async fn list_arcs(&self, story_id: StoryId) -> Result<Vec<StoryArc>>;

    /// Replace an arc's progression notes; false when the arc does not exist
    async fn update_arc_progression(&self, arc: &StoryArc) -> Result<bool>;

    async fn add_world_generation(&self, generation: &WorldGeneration) -> Result<()>;

    /// World-building history, newest first
    async fn list_world_generations(&self, story_id: StoryId) -> Result<Vec<WorldGeneration>>;

    /// Insert or replace the chapter with the same story and number, and
    /// advance the story's current chapter
    async fn save_chapter(&self, chapter: &Chapter) -> Result<()>;

    /// Chapters ordered by chapter number
    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<Chapter>>;

    /// The chapter with the highest number, if any
    async fn latest_chapter(&self, story_id: StoryId) -> Result<Option<Chapter>>;
}
