//! Domain entities - Core business objects with identity

mod chapter;
mod character;
mod creature;
mod location;
mod lore;
mod power_system;
mod story;
mod story_arc;
mod world_generation;

pub use chapter::{Chapter, ChapterStatus};
pub use character::Character;
pub use creature::Creature;
pub use location::Location;
pub use lore::LoreEntry;
pub use power_system::PowerSystem;
pub use story::Story;
pub use story_arc::StoryArc;
pub use world_generation::{WorldGeneration, WorldGenerationKind};
