//! Hand-written port doubles shared by service tests

use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::ports::outbound::{
    FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, SettingsError,
    SettingsRepositoryPort, StoryRepositoryPort, TokenUsage,
};
use crate::domain::entities::{
    Chapter, Character, Creature, Location, LoreEntry, PowerSystem, Story, StoryArc,
    WorldGeneration,
};
use crate::domain::value_objects::{
    ArcId, CharacterId, CreatureId, GenerationSettings, LocationId, StoryId,
};

#[derive(Default)]
struct Tables {
    stories: Vec<Story>,
    characters: Vec<Character>,
    locations: Vec<Location>,
    creatures: Vec<Creature>,
    power_systems: Vec<PowerSystem>,
    lore: Vec<LoreEntry>,
    chapters: Vec<Chapter>,
    arcs: Vec<StoryArc>,
    world_generations: Vec<WorldGeneration>,
}

#[derive(Default)]
pub struct InMemoryStoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryStoryRepository {
    pub fn chapter_count(&self) -> usize {
        self.tables.lock().unwrap().chapters.len()
    }
}

#[async_trait]
impl StoryRepositoryPort for InMemoryStoryRepository {
    async fn create_story(&self, story: &Story) -> Result<()> {
        self.tables.lock().unwrap().stories.push(story.clone());
        Ok(())
    }

    async fn get_story(&self, id: StoryId) -> Result<Option<Story>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.stories.iter().find(|s| s.id == id).cloned())
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        Ok(self.tables.lock().unwrap().stories.clone())
    }

    async fn add_character(&self, character: &Character) -> Result<()> {
        self.tables.lock().unwrap().characters.push(character.clone());
        Ok(())
    }

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.characters.iter().find(|c| c.id == id).cloned())
    }

    async fn list_characters(&self, story_id: StoryId) -> Result<Vec<Character>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .characters
            .iter()
            .filter(|c| c.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn add_location(&self, location: &Location) -> Result<()> {
        self.tables.lock().unwrap().locations.push(location.clone());
        Ok(())
    }

    async fn get_location(&self, id: LocationId) -> Result<Option<Location>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.locations.iter().find(|l| l.id == id).cloned())
    }

    async fn list_locations(&self, story_id: StoryId) -> Result<Vec<Location>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .locations
            .iter()
            .filter(|l| l.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn add_creature(&self, creature: &Creature) -> Result<()> {
        self.tables.lock().unwrap().creatures.push(creature.clone());
        Ok(())
    }

    async fn get_creature(&self, id: CreatureId) -> Result<Option<Creature>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.creatures.iter().find(|c| c.id == id).cloned())
    }

    async fn list_creatures(&self, story_id: StoryId) -> Result<Vec<Creature>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .creatures
            .iter()
            .filter(|c| c.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn add_power_system(&self, power_system: &PowerSystem) -> Result<()> {
        self.tables
            .lock()
            .unwrap()
            .power_systems
            .push(power_system.clone());
        Ok(())
    }

    async fn list_power_systems(&self, story_id: StoryId) -> Result<Vec<PowerSystem>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .power_systems
            .iter()
            .filter(|p| p.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn add_lore(&self, entry: &LoreEntry) -> Result<()> {
        self.tables.lock().unwrap().lore.push(entry.clone());
        Ok(())
    }

    async fn list_lore(&self, story_id: StoryId) -> Result<Vec<LoreEntry>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .lore
            .iter()
            .filter(|l| l.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn add_arc(&self, arc: &StoryArc) -> Result<()> {
        self.tables.lock().unwrap().arcs.push(arc.clone());
        Ok(())
    }

    async fn get_arc(&self, id: ArcId) -> Result<Option<StoryArc>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.arcs.iter().find(|a| a.id == id).cloned())
    }

    async fn list_arcs(&self, story_id: StoryId) -> Result<Vec<StoryArc>> {
        let tables = self.tables.lock().unwrap();
        let mut arcs: Vec<_> = tables
            .arcs
            .iter()
            .filter(|a| a.story_id == story_id)
            .cloned()
            .collect();
        arcs.sort_by_key(|a| a.arc_number);
        Ok(arcs)
    }

    async fn update_arc_progression(&self, arc: &StoryArc) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        match tables.arcs.iter_mut().find(|a| a.id == arc.id) {
            Some(stored) => {
                stored.progression = arc.progression.clone();
                stored.updated_at = arc.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_world_generation(&self, generation: &WorldGeneration) -> Result<()> {
        self.tables
            .lock()
            .unwrap()
            .world_generations
            .push(generation.clone());
        Ok(())
    }

    async fn list_world_generations(&self, story_id: StoryId) -> Result<Vec<WorldGeneration>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .world_generations
            .iter()
            .rev()
            .filter(|g| g.story_id == story_id)
            .cloned()
            .collect())
    }

    async fn save_chapter(&self, chapter: &Chapter) -> Result<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.chapters.retain(|c| {
            !(c.story_id == chapter.story_id && c.chapter_number == chapter.chapter_number)
        });
        tables.chapters.push(chapter.clone());
        if let Some(story) = tables.stories.iter_mut().find(|s| s.id == chapter.story_id) {
            story.current_chapter = story.current_chapter.max(chapter.chapter_number);
        }
        Ok(())
    }

    async fn list_chapters(&self, story_id: StoryId) -> Result<Vec<Chapter>> {
        let tables = self.tables.lock().unwrap();
        let mut chapters: Vec<_> = tables
            .chapters
            .iter()
            .filter(|c| c.story_id == story_id)
            .cloned()
            .collect();
        chapters.sort_by_key(|c| c.chapter_number);
        Ok(chapters)
    }

    async fn latest_chapter(&self, story_id: StoryId) -> Result<Option<Chapter>> {
        Ok(self.list_chapters(story_id).await?.pop())
    }
}

/// What the mock endpoint does with the next request
#[derive(Clone)]
pub enum MockReply {
    Text(String),
    Fail(LlmError),
    /// Waits before answering, long enough for a cancel to land
    Delayed(Duration, String),
    /// Text cut off by the response token cap
    Truncated(String),
}

pub struct MockLlm {
    reply: MockReply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockReply::Text(text.into()))
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn response(text: &str) -> LlmResponse {
    LlmResponse {
        content: text.to_string(),
        finish_reason: FinishReason::Stop,
        usage: Some(TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 200,
            total_tokens: 300,
        }),
    }
}

#[async_trait]
impl LlmPort for MockLlm {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            MockReply::Text(text) => Ok(response(text)),
            MockReply::Fail(err) => Err(err.clone()),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(response(text))
            }
            MockReply::Truncated(text) => Ok(LlmResponse {
                finish_reason: FinishReason::Length,
                ..response(text)
            }),
        }
    }

    async fn health_check(&self) -> Result<bool, LlmError> {
        Ok(true)
    }
}

/// Settings store holding a single value in memory
pub struct FixedSettingsRepository {
    settings: Mutex<GenerationSettings>,
}

impl FixedSettingsRepository {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl Default for FixedSettingsRepository {
    fn default() -> Self {
        Self::new(GenerationSettings::default())
    }
}

#[async_trait]
impl SettingsRepositoryPort for FixedSettingsRepository {
    async fn get(&self) -> Result<GenerationSettings, SettingsError> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn save(&self, settings: &GenerationSettings) -> Result<(), SettingsError> {
        *self.settings.lock().unwrap() = settings.clone();
        Ok(())
    }

    async fn reset(&self) -> Result<GenerationSettings, SettingsError> {
        let defaults = GenerationSettings::default();
        *self.settings.lock().unwrap() = defaults.clone();
        Ok(defaults)
    }
}
