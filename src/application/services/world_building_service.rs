//! World-building service - model-assisted expansion of a story's world
//!
//! Each operation renders a prompt from what the story already holds, makes
//! one completion call and records the exchange in the story's world
//! generation history. Nothing the model writes is merged into the story's
//! entities; callers pick what to keep from the parsed view.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use super::llm::{
    build_profile_prompt, build_structure_prompt, build_world_prompt, location_request,
    lore_request, power_system_request, CHARACTER_DEVELOPER_SYSTEM_PROMPT,
    DEFAULT_LOCATION_ASPECTS, WORLD_BUILDER_SYSTEM_PROMPT,
};
use crate::application::ports::outbound::{LlmError, LlmPort, LlmRequest, StoryRepositoryPort};
use crate::domain::entities::{Location, Story, WorldGeneration, WorldGenerationKind};
use crate::domain::value_objects::{
    CharacterId, CreatureId, LocationDetails, LocationId, PowerSystemDraft, ProfileSuggestions,
    StoryId, StructureSuggestions, WorldGenerationId,
};

const WORLD_TOP_P: f32 = 0.85;
const DEFAULT_LORE_CATEGORY: &str = "History";
const DEFAULT_CHARACTER_FOCUS: &str = "complete profile";
const DEFAULT_CREATURE_FOCUS: &str = "complete bestiary entry";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldBuildingError {
    #[error("Story not found: {0}")]
    StoryNotFound(StoryId),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid world-building request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("The model returned no text")]
    EmptyResult,
    #[error("Story store error: {0}")]
    Store(String),
}

fn store_error(err: anyhow::Error) -> WorldBuildingError {
    WorldBuildingError::Store(format!("{:#}", err))
}

/// Model output for one world-building call, raw and parsed
#[derive(Debug, Clone, Serialize)]
pub struct WorldBuildingResult<T> {
    /// History record the exchange was saved under
    pub generation_id: WorldGenerationId,
    pub raw_result: String,
    pub parsed: T,
}

/// Shape of one completion call
struct Call {
    kind: WorldGenerationKind,
    subject: String,
    system_prompt: &'static str,
    prompt: String,
    temperature: f32,
    max_tokens: u32,
}

pub struct WorldBuildingService {
    repository: Arc<dyn StoryRepositoryPort>,
    llm: Arc<dyn LlmPort>,
}

impl WorldBuildingService {
    pub fn new(repository: Arc<dyn StoryRepositoryPort>, llm: Arc<dyn LlmPort>) -> Self {
        Self { repository, llm }
    }

    /// Suggest the characters, places, systems, lore and arcs a synopsis needs
    ///
    /// Falls back to the story's own synopsis when none is given.
    #[instrument(skip(self, synopsis))]
    pub async fn generate_from_synopsis(
        &self,
        story_id: StoryId,
        synopsis: Option<String>,
    ) -> Result<WorldBuildingResult<StructureSuggestions>, WorldBuildingError> {
        let story = self.story(story_id).await?;
        let synopsis = synopsis
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| story.synopsis.clone());
        if synopsis.trim().is_empty() {
            return Err(WorldBuildingError::InvalidRequest(
                "No synopsis given and the story has none".to_string(),
            ));
        }

        let call = Call {
            kind: WorldGenerationKind::SynopsisAnalysis,
            subject: story.title.clone(),
            system_prompt: WORLD_BUILDER_SYSTEM_PROMPT,
            prompt: build_structure_prompt(&synopsis, &story.genre),
            temperature: 0.7,
            max_tokens: 3000,
        };
        self.run(story_id, call, StructureSuggestions::parse).await
    }

    /// Flesh out one location; `aspects` defaults to the usual five
    #[instrument(skip(self))]
    pub async fn expand_location(
        &self,
        story_id: StoryId,
        location_id: LocationId,
        aspects: Vec<String>,
    ) -> Result<WorldBuildingResult<LocationDetails>, WorldBuildingError> {
        let story = self.story(story_id).await?;
        let location = self
            .repository
            .get_location(location_id)
            .await
            .map_err(store_error)?
            .filter(|l| l.story_id == story_id)
            .ok_or_else(|| WorldBuildingError::NotFound(format!("Location {}", location_id)))?;
        let others: Vec<_> = self
            .locations(story_id)
            .await?
            .into_iter()
            .filter(|l| l.id != location_id)
            .collect();

        let aspects = if aspects.iter().all(|a| a.trim().is_empty()) {
            DEFAULT_LOCATION_ASPECTS.iter().map(|a| a.to_string()).collect()
        } else {
            aspects
        };
        let request = location_request(&location, &aspects);

        let call = Call {
            kind: WorldGenerationKind::LocationExpansion,
            subject: location.name.clone(),
            system_prompt: WORLD_BUILDER_SYSTEM_PROMPT,
            prompt: build_world_prompt(&story, &others, "Location Expansion", &request),
            temperature: 0.7,
            max_tokens: 2500,
        };
        self.run(story_id, call, LocationDetails::parse).await
    }

    /// Design a power system around `concept`, aware of the existing ones
    #[instrument(skip(self))]
    pub async fn generate_power_system(
        &self,
        story_id: StoryId,
        concept: &str,
    ) -> Result<WorldBuildingResult<PowerSystemDraft>, WorldBuildingError> {
        let concept = required(concept, "concept")?;
        let story = self.story(story_id).await?;
        let existing = self
            .repository
            .list_power_systems(story_id)
            .await
            .map_err(store_error)?;
        let locations = self.locations(story_id).await?;

        let call = Call {
            kind: WorldGenerationKind::PowerSystem,
            subject: concept.to_string(),
            system_prompt: WORLD_BUILDER_SYSTEM_PROMPT,
            prompt: build_world_prompt(
                &story,
                &locations,
                "Power System",
                &power_system_request(concept, &existing),
            ),
            temperature: 0.75,
            max_tokens: 2500,
        };
        self.run(story_id, call, PowerSystemDraft::parse).await
    }

    /// Write lore about `topic`; the category defaults to History
    #[instrument(skip(self))]
    pub async fn generate_lore(
        &self,
        story_id: StoryId,
        topic: &str,
        category: Option<String>,
    ) -> Result<WorldBuildingResult<String>, WorldBuildingError> {
        let topic = required(topic, "topic")?;
        let story = self.story(story_id).await?;
        let existing = self.repository.list_lore(story_id).await.map_err(store_error)?;
        let locations = self.locations(story_id).await?;
        let category = category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LORE_CATEGORY.to_string());

        let call = Call {
            kind: WorldGenerationKind::Lore,
            subject: topic.to_string(),
            system_prompt: WORLD_BUILDER_SYSTEM_PROMPT,
            prompt: build_world_prompt(
                &story,
                &locations,
                &format!("Lore - {}", category),
                &lore_request(topic, &category, &existing),
            ),
            temperature: 0.7,
            max_tokens: 2000,
        };
        self.run(story_id, call, |text| text.trim().to_string()).await
    }

    #[instrument(skip(self))]
    pub async fn expand_character_details(
        &self,
        story_id: StoryId,
        character_id: CharacterId,
        focus: Option<String>,
    ) -> Result<WorldBuildingResult<ProfileSuggestions>, WorldBuildingError> {
        let story = self.story(story_id).await?;
        let character = self
            .repository
            .get_character(character_id)
            .await
            .map_err(store_error)?
            .filter(|c| c.story_id == story_id)
            .ok_or_else(|| WorldBuildingError::NotFound(format!("Character {}", character_id)))?;

        let known = [
            ("Age", character.age.map(|a| a.to_string()).unwrap_or_default()),
            ("Gender", character.gender.clone()),
            ("Appearance", character.appearance.clone()),
            ("Personality", character.personality.clone()),
            ("Background", character.background.clone()),
            ("Abilities", character.abilities.clone()),
            ("Motivations", character.motivations.clone()),
            ("Relationships", character.relationships.clone()),
            ("Voice", character.voice_style.clone()),
        ];
        let focus = focus_or(focus, DEFAULT_CHARACTER_FOCUS);

        let call = Call {
            kind: WorldGenerationKind::CharacterExpansion,
            subject: character.name.clone(),
            system_prompt: CHARACTER_DEVELOPER_SYSTEM_PROMPT,
            prompt: build_profile_prompt(
                &character.name,
                character.role.as_str(),
                &story,
                &known,
                &focus,
            ),
            temperature: 0.75,
            max_tokens: 2000,
        };
        self.run(story_id, call, ProfileSuggestions::parse).await
    }

    #[instrument(skip(self))]
    pub async fn expand_creature_details(
        &self,
        story_id: StoryId,
        creature_id: CreatureId,
        focus: Option<String>,
    ) -> Result<WorldBuildingResult<ProfileSuggestions>, WorldBuildingError> {
        let story = self.story(story_id).await?;
        let creature = self
            .repository
            .get_creature(creature_id)
            .await
            .map_err(store_error)?
            .filter(|c| c.story_id == story_id)
            .ok_or_else(|| WorldBuildingError::NotFound(format!("Creature {}", creature_id)))?;

        let known = [
            ("Type", creature.creature_type.clone()),
            ("Description", creature.description.clone()),
            ("Habitat", creature.habitat.clone()),
            ("Abilities", creature.abilities.clone()),
            ("Danger Level", creature.danger_level.clone()),
        ];
        let focus = focus_or(focus, DEFAULT_CREATURE_FOCUS);
        let role = format!("creature ({})", creature.creature_type);

        let call = Call {
            kind: WorldGenerationKind::CreatureExpansion,
            subject: creature.name.clone(),
            system_prompt: CHARACTER_DEVELOPER_SYSTEM_PROMPT,
            prompt: build_profile_prompt(&creature.name, &role, &story, &known, &focus),
            temperature: 0.75,
            max_tokens: 2000,
        };
        self.run(story_id, call, ProfileSuggestions::parse).await
    }

    /// Past world-building calls for a story, newest first
    pub async fn list_generations(
        &self,
        story_id: StoryId,
    ) -> Result<Vec<WorldGeneration>, WorldBuildingError> {
        self.story(story_id).await?;
        self.repository
            .list_world_generations(story_id)
            .await
            .map_err(store_error)
    }

    async fn story(&self, story_id: StoryId) -> Result<Story, WorldBuildingError> {
        self.repository
            .get_story(story_id)
            .await
            .map_err(store_error)?
            .ok_or(WorldBuildingError::StoryNotFound(story_id))
    }

    async fn locations(&self, story_id: StoryId) -> Result<Vec<Location>, WorldBuildingError> {
        self.repository
            .list_locations(story_id)
            .await
            .map_err(store_error)
    }

    async fn run<T>(
        &self,
        story_id: StoryId,
        call: Call,
        parse: impl FnOnce(&str) -> T,
    ) -> Result<WorldBuildingResult<T>, WorldBuildingError> {
        let request = LlmRequest::new(call.prompt.clone())
            .with_system_prompt(call.system_prompt)
            .with_temperature(call.temperature)
            .with_top_p(WORLD_TOP_P)
            .with_max_tokens(Some(call.max_tokens));

        let response = self.llm.generate(request).await?;
        let raw_result = response.content.trim().to_string();
        if raw_result.is_empty() {
            return Err(WorldBuildingError::EmptyResult);
        }

        let record = WorldGeneration::new(
            story_id,
            call.kind,
            call.subject,
            call.prompt,
            raw_result.clone(),
        );
        self.repository
            .add_world_generation(&record)
            .await
            .map_err(store_error)?;

        info!(
            story_id = %story_id,
            kind = call.kind.as_str(),
            chars = raw_result.len(),
            "World-building result recorded"
        );

        Ok(WorldBuildingResult {
            generation_id: record.id,
            parsed: parse(&raw_result),
            raw_result,
        })
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, WorldBuildingError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorldBuildingError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(value)
}

fn focus_or(focus: Option<String>, default: &str) -> String {
    focus
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{InMemoryStoryRepository, MockLlm, MockReply};
    use crate::domain::entities::{Character, Creature, PowerSystem};
    use crate::domain::value_objects::RoleTier;

    type Fixture = (WorldBuildingService, Arc<InMemoryStoryRepository>, Arc<MockLlm>, Story);

    async fn setup(reply: MockReply) -> Fixture {
        let repo = Arc::new(InMemoryStoryRepository::default());
        let story = Story::new("The Bell Tower")
            .with_genre("Dark Fantasy")
            .with_synopsis("A bell-ringer hears the drowned city answer.");
        repo.create_story(&story).await.unwrap();
        let llm = Arc::new(MockLlm::new(reply));
        let service = WorldBuildingService::new(repo.clone(), llm.clone());
        (service, repo, llm, story)
    }

    #[tokio::test]
    async fn test_synopsis_analysis_uses_story_synopsis_and_records_history() {
        let reply = "KEY CHARACTERS:\nIlse, the ringer.\n\nSTORY ARCS:\n1. The First Toll";
        let (service, repo, llm, story) = setup(MockReply::Text(reply.into())).await;

        let result = service.generate_from_synopsis(story.id, None).await.unwrap();

        assert_eq!(result.parsed.characters, "Ilse, the ringer.");
        assert_eq!(result.parsed.arcs, "1. The First Toll");

        let request = &llm.requests()[0];
        assert!(request.prompt.contains("A bell-ringer hears the drowned city answer."));
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.top_p, Some(0.85));
        assert_eq!(request.max_tokens, Some(3000));

        let history = repo.list_world_generations(story.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, result.generation_id);
        assert_eq!(history[0].kind, WorldGenerationKind::SynopsisAnalysis);
        assert_eq!(history[0].result, reply);
    }

    #[tokio::test]
    async fn test_blank_synopsis_everywhere_is_rejected() {
        let repo = Arc::new(InMemoryStoryRepository::default());
        let story = Story::new("Untitled");
        repo.create_story(&story).await.unwrap();
        let llm = Arc::new(MockLlm::replying("unused"));
        let service = WorldBuildingService::new(repo, llm.clone());

        let err = service
            .generate_from_synopsis(story.id, Some("   ".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, WorldBuildingError::InvalidRequest(_)));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_expand_location_defaults_aspects_and_lists_other_places() {
        let (service, repo, llm, story) =
            setup(MockReply::Text("GEOGRAPHY:\nCliffs over a grey sea.".into())).await;
        let harbor = Location::new(story.id, "Harbor", "Town").with_description("Salt and rope.");
        let tower = Location::new(story.id, "Bell Tower", "Landmark");
        repo.add_location(&harbor).await.unwrap();
        repo.add_location(&tower).await.unwrap();

        let result = service
            .expand_location(story.id, tower.id, Vec::new())
            .await
            .unwrap();

        assert_eq!(result.parsed.geography, "Cliffs over a grey sea.");
        let prompt = &llm.requests()[0].prompt;
        assert!(prompt.contains("Focus on these aspects: geography, culture, history, politics, economy"));
        assert!(prompt.contains("• Harbor (Town): Salt and rope."));
        assert!(!prompt.contains("• Bell Tower"));
    }

    #[tokio::test]
    async fn test_elements_of_another_story_are_not_found() {
        let (service, repo, llm, story) = setup(MockReply::Text("unused".into())).await;
        let elsewhere = StoryId::new();
        let location = Location::new(elsewhere, "Elsewhere", "Town");
        let character = Character::new(elsewhere, "Stranger", RoleTier::Minor);
        repo.add_location(&location).await.unwrap();
        repo.add_character(&character).await.unwrap();

        let err = service
            .expand_location(story.id, location.id, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WorldBuildingError::NotFound(_)));

        let err = service
            .expand_character_details(story.id, character.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorldBuildingError::NotFound(_)));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_power_system_lists_existing_systems() {
        let (service, repo, llm, story) =
            setup(MockReply::Text("System Name: Knellcraft\n\nRules:\nOne toll per breath.".into()))
                .await;
        repo.add_power_system(&PowerSystem::new(story.id, "Tidecall").with_description("Sea magic."))
            .await
            .unwrap();

        let result = service
            .generate_power_system(story.id, "Magic drawn from bell tones")
            .await
            .unwrap();

        assert_eq!(result.parsed.name, "Knellcraft");
        assert_eq!(result.parsed.rules, "One toll per breath.");
        let request = &llm.requests()[0];
        assert!(request.prompt.contains("• Tidecall: Sea magic."));
        assert_eq!(request.temperature, Some(0.75));
        assert_eq!(request.max_tokens, Some(2500));
    }

    #[tokio::test]
    async fn test_lore_defaults_to_history() {
        let (service, _repo, llm, story) =
            setup(MockReply::Text("  The city sank in a single night.  ".into())).await;

        let result = service
            .generate_lore(story.id, "The Drowning", None)
            .await
            .unwrap();

        assert_eq!(result.parsed, "The city sank in a single night.");
        let prompt = &llm.requests()[0].prompt;
        assert!(prompt.contains("GENERATION FOCUS: Lore - History"));
        assert!(prompt.contains("Category: History"));
    }

    #[tokio::test]
    async fn test_blank_topic_is_rejected() {
        let (service, _repo, llm, story) = setup(MockReply::Text("unused".into())).await;
        let err = service.generate_lore(story.id, " ", None).await.unwrap_err();
        assert!(matches!(err, WorldBuildingError::InvalidRequest(_)));
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn test_character_and_creature_expansion_use_profile_prompt() {
        let (service, repo, llm, story) =
            setup(MockReply::Text("Personality:\nStubborn and kind.".into())).await;
        let ilse = Character::new(story.id, "Ilse", RoleTier::Protagonist).with_age(19);
        let wyrm = Creature::new(story.id, "Bog Wyrm", "Beast").with_habitat("Marsh");
        repo.add_character(&ilse).await.unwrap();
        repo.add_creature(&wyrm).await.unwrap();

        let character = service
            .expand_character_details(story.id, ilse.id, Some("voice".into()))
            .await
            .unwrap();
        let creature = service
            .expand_creature_details(story.id, wyrm.id, None)
            .await
            .unwrap();

        assert_eq!(character.parsed.personality, "Stubborn and kind.");
        assert_eq!(creature.parsed.personality, "Stubborn and kind.");

        let requests = llm.requests();
        assert_eq!(requests[0].system_prompt.as_deref(), Some(CHARACTER_DEVELOPER_SYSTEM_PROMPT));
        assert!(requests[0].prompt.contains("Age: 19\n"));
        assert!(requests[0].prompt.contains("EXPANSION FOCUS: voice"));
        assert!(requests[1].prompt.contains("Habitat: Marsh\n"));
        assert!(requests[1].prompt.contains("EXPANSION FOCUS: complete bestiary entry"));

        let history = service.list_generations(story.id).await.unwrap();
        let kinds: Vec<_> = history.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            [WorldGenerationKind::CreatureExpansion, WorldGenerationKind::CharacterExpansion]
        );
    }

    #[tokio::test]
    async fn test_empty_reply_is_not_recorded() {
        let (service, repo, _llm, story) = setup(MockReply::Text("  \n ".into())).await;

        let err = service
            .generate_lore(story.id, "The Drowning", None)
            .await
            .unwrap_err();

        assert_eq!(err, WorldBuildingError::EmptyResult);
        assert!(repo.list_world_generations(story.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_endpoint_failure_passes_through() {
        let (service, _repo, _llm, story) =
            setup(MockReply::Fail(LlmError::Connection("refused".into()))).await;

        let err = service
            .generate_power_system(story.id, "Bells")
            .await
            .unwrap_err();

        assert_eq!(err, WorldBuildingError::Llm(LlmError::Connection("refused".into())));
    }

    #[tokio::test]
    async fn test_unknown_story() {
        let (service, _repo, _llm, _story) = setup(MockReply::Text("unused".into())).await;
        let err = service.list_generations(StoryId::new()).await.unwrap_err();
        assert!(matches!(err, WorldBuildingError::StoryNotFound(_)));
    }
}
