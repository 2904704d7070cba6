//! Application services - Use case implementations
//!
//! Each service follows hexagonal architecture principles, accepting port
//! dependencies and returning domain entities or value objects.

pub mod chapter_generation_service;
pub mod llm;
pub mod settings_service;
pub mod story_context_service;
pub mod story_service;
pub mod world_building_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use chapter_generation_service::{
    ChapterGenerationService, GeneratedChapter, GenerationError,
};
pub use settings_service::SettingsService;
pub use story_context_service::StoryContextService;
pub use story_service::{
    CreateArcRequest, CreateCharacterRequest, CreateCreatureRequest, CreateLocationRequest,
    CreateLoreRequest, CreatePowerSystemRequest, CreateStoryRequest, SaveChapterRequest,
    StoryService, StoryServiceImpl,
};
pub use world_building_service::{WorldBuildingError, WorldBuildingResult, WorldBuildingService};
