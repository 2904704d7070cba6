//! World generation record - one world-building call and what came back

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{StoryId, WorldGenerationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldGenerationKind {
    SynopsisAnalysis,
    LocationExpansion,
    PowerSystem,
    Lore,
    CharacterExpansion,
    CreatureExpansion,
}

impl WorldGenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SynopsisAnalysis => "synopsis_analysis",
            Self::LocationExpansion => "location_expansion",
            Self::PowerSystem => "power_system",
            Self::Lore => "lore",
            Self::CharacterExpansion => "character_expansion",
            Self::CreatureExpansion => "creature_expansion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "synopsis_analysis" => Some(Self::SynopsisAnalysis),
            "location_expansion" => Some(Self::LocationExpansion),
            "power_system" => Some(Self::PowerSystem),
            "lore" => Some(Self::Lore),
            "character_expansion" => Some(Self::CharacterExpansion),
            "creature_expansion" => Some(Self::CreatureExpansion),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGeneration {
    pub id: WorldGenerationId,
    pub story_id: StoryId,
    pub kind: WorldGenerationKind,
    /// What the call was about: a location name, a topic, a concept
    pub subject: String,
    pub prompt: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl WorldGeneration {
    pub fn new(
        story_id: StoryId,
        kind: WorldGenerationKind,
        subject: impl Into<String>,
        prompt: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            id: WorldGenerationId::new(),
            story_id,
            kind,
            subject: subject.into(),
            prompt: prompt.into(),
            result: result.into(),
            created_at: Utc::now(),
        }
    }
}
