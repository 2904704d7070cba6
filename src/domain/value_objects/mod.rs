//! Value objects - Immutable objects defined by their attributes

mod generation;
mod ids;
mod packed_context;
mod role_tier;
mod settings;
mod story_context;
mod world_building;

pub use generation::{
    ChapterParams, GenerationMetadata, GenerationOutcome, GenerationRequest, GenerationStatus,
    StylePreset, ValidationDecision,
};
pub use ids::*;
pub use packed_context::{ContextBlock, ContextBudget, ContextTier, PackedContext, SkippedBlock};
pub use role_tier::{RoleTier, UnknownRoleError};
pub use settings::GenerationSettings;
pub use story_context::{
    ArcRef, CharacterRef, CreatureRef, EntityKey, LocationRef, LoreRef, PowerSystemRef, StoryMetadata,
    StorySnapshot, WorldElementRef,
};
pub use world_building::{
    LocationDetails, PowerSystemDraft, ProfileSuggestions, StructureSuggestions,
};
