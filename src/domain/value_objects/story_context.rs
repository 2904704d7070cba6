//! Story context types - the immutable snapshot a chapter is generated from
//!
//! A `StorySnapshot` is assembled once per generation request from the
//! story store, handed to the context packer by shared reference and dropped
//! when the request completes. Every entity carries its detail text already
//! rendered, so packing never has to look back at the store.

use serde::{Deserialize, Serialize};

use super::{
    ArcId, CharacterId, CreatureId, LocationId, LoreId, PowerSystemId, RoleTier, StoryId,
};

/// Story-level metadata that shapes the system instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMetadata {
    pub story_id: StoryId,
    pub title: String,
    pub genre: String,
    pub tone: String,
    pub writing_style: String,
    pub themes: String,
}

/// A character as seen by the packer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub id: CharacterId,
    pub name: String,
    pub role: RoleTier,
    /// Complete profile, used for the viewpoint character and lead/major roles
    pub full_detail: String,
    /// One or two sentences, used for supporting roles
    pub condensed_detail: String,
}

/// A rendered world element (location, creature, power system, lore entry or arc)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldElementRef<Id> {
    pub id: Id,
    pub name: String,
    pub detail: String,
}

pub type LocationRef = WorldElementRef<LocationId>;
pub type CreatureRef = WorldElementRef<CreatureId>;
pub type PowerSystemRef = WorldElementRef<PowerSystemId>;
pub type LoreRef = WorldElementRef<LoreId>;
pub type ArcRef = WorldElementRef<ArcId>;

/// Everything the engine knows about a story at the moment generation starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySnapshot {
    pub metadata: StoryMetadata,
    /// Number of the chapter about to be written
    pub chapter_number: u32,
    pub characters: Vec<CharacterRef>,
    pub locations: Vec<LocationRef>,
    pub creatures: Vec<CreatureRef>,
    pub power_systems: Vec<PowerSystemRef>,
    pub lore: Vec<LoreRef>,
    /// Arcs spanning the chapter about to be written, in arc order
    #[serde(default)]
    pub arcs: Vec<ArcRef>,
    pub previous_chapter_summary: Option<String>,
}

impl StorySnapshot {
    pub fn character(&self, id: CharacterId) -> Option<&CharacterRef> {
        self.characters.iter().find(|c| c.id == id)
    }
}

/// Identity of a packed block
///
/// The previous chapter summary has no entity behind it, hence the
/// dedicated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityKey {
    Character(CharacterId),
    PreviousChapter,
    Location(LocationId),
    PowerSystem(PowerSystemId),
    Lore(LoreId),
    Creature(CreatureId),
    Arc(ArcId),
}
