//! Story Service - Application service for stories and their world data
//!
//! Creates stories and attaches cast, places, bestiary entries, power
//! systems, lore, story arcs and hand-saved chapters to them. Every write checks that
//! the owning story exists first.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::StoryRepositoryPort;
use crate::domain::entities::{
    Chapter, ChapterStatus, Character, Creature, Location, LoreEntry, PowerSystem, Story,
    StoryArc,
};
use crate::domain::value_objects::{ArcId, CharacterId, RoleTier, StoryId};

/// Request to create a new story
#[derive(Debug, Clone, Default)]
pub struct CreateStoryRequest {
    pub title: String,
    pub synopsis: Option<String>,
    pub genre: Option<String>,
    pub themes: Option<String>,
    pub tone: Option<String>,
    pub writing_style: Option<String>,
    pub target_length: Option<u32>,
}

/// Request to add a character to a story
#[derive(Debug, Clone)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub role: RoleTier,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub appearance: Option<String>,
    pub personality: Option<String>,
    pub background: Option<String>,
    pub abilities: Option<String>,
    pub motivations: Option<String>,
    pub relationships: Option<String>,
    pub character_arc: Option<String>,
    pub voice_style: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateLocationRequest {
    pub name: String,
    pub location_type: String,
    pub description: Option<String>,
    pub culture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateCreatureRequest {
    pub name: String,
    pub creature_type: String,
    pub description: Option<String>,
    pub habitat: Option<String>,
    pub abilities: Option<String>,
    pub danger_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePowerSystemRequest {
    pub name: String,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub limitations: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateLoreRequest {
    pub category: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct CreateArcRequest {
    pub arc_number: u32,
    pub name: String,
    pub synopsis: Option<String>,
    pub start_chapter: Option<u32>,
    pub end_chapter: Option<u32>,
    pub progression: BTreeMap<String, String>,
}

/// Request to save a chapter written or edited outside the generator
#[derive(Debug, Clone)]
pub struct SaveChapterRequest {
    pub chapter_number: u32,
    pub title: Option<String>,
    pub content: String,
    pub summary: Option<String>,
    pub pov_character_id: Option<CharacterId>,
    pub status: Option<ChapterStatus>,
}

/// Story service trait defining the application use cases
#[async_trait]
pub trait StoryService: Send + Sync {
    async fn create_story(&self, request: CreateStoryRequest) -> Result<Story>;

    async fn get_story(&self, id: StoryId) -> Result<Option<Story>>;

    async fn list_stories(&self) -> Result<Vec<Story>>;

    async fn add_character(&self, story_id: StoryId, request: CreateCharacterRequest)
        -> Result<Character>;

    async fn list_characters(&self, story_id: StoryId) -> Result<Vec<Character>>;

    async fn add_location(&self, story_id: StoryId, request: CreateLocationRequest)
        -> Result<Location>;

    async fn list_locations(&self, story_id: StoryId) -> Result<Vec<Location>>;

    async fn add_creature(&self, story_id: StoryId, request: CreateCreatureRequest)
        -> Result<Creature>;

    async fn list_creatures(&self, story_id: StoryId) -> Result<Vec<Creature>>;

    async fn add_power_system(
        &self,
        story_id: StoryId,
        request: CreatePowerSystemRequest,
    ) -> Result<PowerSystem>;

    async fn list_power_systems(&self, story_id: StoryId) -> Result<Vec<PowerSystem>>;

    async fn add_lore(&self, story_id: StoryId, request: CreateLoreRequest) -> Result<LoreEntry>;

    async fn list_lore(&self, story_id: StoryId) -> Result<Vec<LoreEntry>>;

    async fn add_arc(&self, story_id: StoryId, request: CreateArcRequest) -> Result<StoryArc>;

    async fn list_arcs(&self, story_id: StoryId) -> Result<Vec<StoryArc>>;

    /// Replace an arc's progression notes
    ///
    /// Returns `None` when the arc does not exist or belongs to another story.
    async fn update_arc_progression(
        &self,
        story_id: StoryId,
        arc_id: ArcId,
        progression: BTreeMap<String, String>,
    ) -> Result<Option<StoryArc>>;

    async fn save_chapter(&self, story_id: StoryId, request: SaveChapterRequest)
        -> Result<Chapter>;

    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<Chapter>>;
}

/// Default implementation of StoryService over a repository port
pub struct StoryServiceImpl {
    repository: Arc<dyn StoryRepositoryPort>,
}

impl StoryServiceImpl {
    pub fn new(repository: Arc<dyn StoryRepositoryPort>) -> Self {
        Self { repository }
    }

    fn validate_name(kind: &str, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            anyhow::bail!("{} name cannot be empty", kind);
        }
        if name.len() > 255 {
            anyhow::bail!("{} name cannot exceed 255 characters", kind);
        }
        Ok(())
    }

    async fn require_story(&self, story_id: StoryId) -> Result<Story> {
        self.repository
            .get_story(story_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Story not found: {}", story_id))
    }
}

#[async_trait]
impl StoryService for StoryServiceImpl {
    #[instrument(skip(self), fields(title = %request.title))]
    async fn create_story(&self, request: CreateStoryRequest) -> Result<Story> {
        Self::validate_name("Story", &request.title)?;

        let mut story = Story::new(request.title.trim());
        if let Some(synopsis) = request.synopsis {
            story = story.with_synopsis(synopsis);
        }
        if let Some(genre) = request.genre {
            story = story.with_genre(genre);
        }
        if let Some(themes) = request.themes {
            story = story.with_themes(themes);
        }
        if let Some(tone) = request.tone {
            story = story.with_tone(tone);
        }
        if let Some(style) = request.writing_style {
            story = story.with_writing_style(style);
        }
        if let Some(chapters) = request.target_length {
            story = story.with_target_length(chapters);
        }

        self.repository
            .create_story(&story)
            .await
            .context("Failed to create story in repository")?;

        info!(story_id = %story.id, "Created story: {}", story.title);
        Ok(story)
    }

    #[instrument(skip(self))]
    async fn get_story(&self, id: StoryId) -> Result<Option<Story>> {
        debug!(story_id = %id, "Fetching story");
        self.repository
            .get_story(id)
            .await
            .context("Failed to get story from repository")
    }

    #[instrument(skip(self))]
    async fn list_stories(&self) -> Result<Vec<Story>> {
        self.repository
            .list_stories()
            .await
            .context("Failed to list stories from repository")
    }

    #[instrument(skip(self, request), fields(name = %request.name, role = %request.role))]
    async fn add_character(
        &self,
        story_id: StoryId,
        request: CreateCharacterRequest,
    ) -> Result<Character> {
        Self::validate_name("Character", &request.name)?;
        self.require_story(story_id).await?;

        let mut character = Character::new(story_id, request.name.trim(), request.role);
        if let Some(age) = request.age {
            character = character.with_age(age);
        }
        if let Some(gender) = request.gender {
            character = character.with_gender(gender);
        }
        if let Some(appearance) = request.appearance {
            character = character.with_appearance(appearance);
        }
        if let Some(personality) = request.personality {
            character = character.with_personality(personality);
        }
        if let Some(background) = request.background {
            character = character.with_background(background);
        }
        if let Some(abilities) = request.abilities {
            character = character.with_abilities(abilities);
        }
        if let Some(motivations) = request.motivations {
            character = character.with_motivations(motivations);
        }
        if let Some(relationships) = request.relationships {
            character = character.with_relationships(relationships);
        }
        if let Some(arc) = request.character_arc {
            character = character.with_character_arc(arc);
        }
        if let Some(voice) = request.voice_style {
            character = character.with_voice_style(voice);
        }

        self.repository
            .add_character(&character)
            .await
            .context("Failed to create character in repository")?;

        info!(
            character_id = %character.id,
            story_id = %story_id,
            "Created character: {}",
            character.name
        );
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn list_characters(&self, story_id: StoryId) -> Result<Vec<Character>> {
        debug!(story_id = %story_id, "Listing characters");
        self.repository
            .list_characters(story_id)
            .await
            .context("Failed to list characters from repository")
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn add_location(
        &self,
        story_id: StoryId,
        request: CreateLocationRequest,
    ) -> Result<Location> {
        Self::validate_name("Location", &request.name)?;
        self.require_story(story_id).await?;

        let mut location = Location::new(story_id, request.name.trim(), request.location_type);
        if let Some(description) = request.description {
            location = location.with_description(description);
        }
        if let Some(culture) = request.culture {
            location = location.with_culture(culture);
        }

        self.repository
            .add_location(&location)
            .await
            .context("Failed to create location in repository")?;

        info!(location_id = %location.id, "Created location: {}", location.name);
        Ok(location)
    }

    async fn list_locations(&self, story_id: StoryId) -> Result<Vec<Location>> {
        self.repository
            .list_locations(story_id)
            .await
            .context("Failed to list locations from repository")
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn add_creature(
        &self,
        story_id: StoryId,
        request: CreateCreatureRequest,
    ) -> Result<Creature> {
        Self::validate_name("Creature", &request.name)?;
        self.require_story(story_id).await?;

        let mut creature = Creature::new(story_id, request.name.trim(), request.creature_type);
        if let Some(description) = request.description {
            creature = creature.with_description(description);
        }
        if let Some(habitat) = request.habitat {
            creature = creature.with_habitat(habitat);
        }
        if let Some(abilities) = request.abilities {
            creature = creature.with_abilities(abilities);
        }
        if let Some(danger) = request.danger_level {
            creature = creature.with_danger_level(danger);
        }

        self.repository
            .add_creature(&creature)
            .await
            .context("Failed to create creature in repository")?;

        info!(creature_id = %creature.id, "Created creature: {}", creature.name);
        Ok(creature)
    }

    async fn list_creatures(&self, story_id: StoryId) -> Result<Vec<Creature>> {
        self.repository
            .list_creatures(story_id)
            .await
            .context("Failed to list creatures from repository")
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn add_power_system(
        &self,
        story_id: StoryId,
        request: CreatePowerSystemRequest,
    ) -> Result<PowerSystem> {
        Self::validate_name("Power system", &request.name)?;
        self.require_story(story_id).await?;

        let mut system = PowerSystem::new(story_id, request.name.trim());
        if let Some(description) = request.description {
            system = system.with_description(description);
        }
        if let Some(rules) = request.rules {
            system = system.with_rules(rules);
        }
        if let Some(limitations) = request.limitations {
            system = system.with_limitations(limitations);
        }

        self.repository
            .add_power_system(&system)
            .await
            .context("Failed to create power system in repository")?;

        info!(power_system_id = %system.id, "Created power system: {}", system.name);
        Ok(system)
    }

    async fn list_power_systems(&self, story_id: StoryId) -> Result<Vec<PowerSystem>> {
        self.repository
            .list_power_systems(story_id)
            .await
            .context("Failed to list power systems from repository")
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    async fn add_lore(&self, story_id: StoryId, request: CreateLoreRequest) -> Result<LoreEntry> {
        Self::validate_name("Lore", &request.title)?;
        self.require_story(story_id).await?;

        let entry = LoreEntry::new(
            story_id,
            request.category,
            request.title.trim(),
            request.content,
        );

        self.repository
            .add_lore(&entry)
            .await
            .context("Failed to create lore entry in repository")?;

        info!(lore_id = %entry.id, "Created lore entry: {}", entry.title);
        Ok(entry)
    }

    async fn list_lore(&self, story_id: StoryId) -> Result<Vec<LoreEntry>> {
        self.repository
            .list_lore(story_id)
            .await
            .context("Failed to list lore from repository")
    }

    #[instrument(skip(self, request), fields(arc = request.arc_number, name = %request.name))]
    async fn add_arc(&self, story_id: StoryId, request: CreateArcRequest) -> Result<StoryArc> {
        Self::validate_name("Arc", &request.name)?;
        if request.arc_number == 0 {
            anyhow::bail!("Arc numbers start at 1");
        }
        if let (Some(start), Some(end)) = (request.start_chapter, request.end_chapter) {
            if start > end {
                anyhow::bail!("Arc cannot end (chapter {}) before it starts (chapter {})", end, start);
            }
        }
        self.require_story(story_id).await?;

        let mut arc = StoryArc::new(story_id, request.arc_number, request.name.trim())
            .spanning(request.start_chapter, request.end_chapter);
        if let Some(synopsis) = request.synopsis {
            arc = arc.with_synopsis(synopsis);
        }
        arc.progression = request.progression;

        self.repository
            .add_arc(&arc)
            .await
            .context("Failed to create story arc in repository")?;

        info!(arc_id = %arc.id, story_id = %story_id, "Created story arc: {}", arc.name);
        Ok(arc)
    }

    async fn list_arcs(&self, story_id: StoryId) -> Result<Vec<StoryArc>> {
        self.repository
            .list_arcs(story_id)
            .await
            .context("Failed to list story arcs from repository")
    }

    #[instrument(skip(self, progression), fields(threads = progression.len()))]
    async fn update_arc_progression(
        &self,
        story_id: StoryId,
        arc_id: ArcId,
        progression: BTreeMap<String, String>,
    ) -> Result<Option<StoryArc>> {
        let Some(mut arc) = self
            .repository
            .get_arc(arc_id)
            .await
            .context("Failed to get story arc from repository")?
            .filter(|arc| arc.story_id == story_id)
        else {
            return Ok(None);
        };

        arc.progression = progression;
        arc.updated_at = chrono::Utc::now();
        if !self
            .repository
            .update_arc_progression(&arc)
            .await
            .context("Failed to update arc progression in repository")?
        {
            return Ok(None);
        }

        debug!(arc_id = %arc_id, "Updated arc progression");
        Ok(Some(arc))
    }

    #[instrument(skip(self, request), fields(chapter = request.chapter_number))]
    async fn save_chapter(
        &self,
        story_id: StoryId,
        request: SaveChapterRequest,
    ) -> Result<Chapter> {
        if request.chapter_number == 0 {
            anyhow::bail!("Chapter numbers start at 1");
        }
        self.require_story(story_id).await?;

        let mut chapter = Chapter::new(story_id, request.chapter_number, request.content);
        if let Some(title) = request.title.filter(|t| !t.trim().is_empty()) {
            chapter = chapter.with_title(title);
        }
        if let Some(summary) = request.summary {
            chapter = chapter.with_summary(summary);
        }
        if let Some(pov) = request.pov_character_id {
            chapter = chapter.with_pov_character(pov);
        }
        if let Some(status) = request.status {
            chapter = chapter.with_status(status);
        }

        self.repository
            .save_chapter(&chapter)
            .await
            .context("Failed to save chapter in repository")?;

        info!(
            story_id = %story_id,
            chapter = chapter.chapter_number,
            words = chapter.word_count,
            "Saved chapter"
        );
        Ok(chapter)
    }

    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<Chapter>> {
        self.repository
            .list_chapters(story_id)
            .await
            .context("Failed to list chapters from repository")
    }
}
