//! Chapter generation request and outcome types
//!
//! These types intentionally derive serde: outcomes are returned verbatim by
//! the HTTP API and generation metadata is stored as JSON next to each
//! chapter.

use serde::{Deserialize, Serialize};

use super::{CharacterId, StoryId};

/// Writing style presets carried over from the desktop application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    Rezero,
    Fate,
    Isekai,
    DarkFantasy,
}

impl StylePreset {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rezero => "ReZero Style",
            Self::Fate => "Fate Style",
            Self::Isekai => "Classic Isekai",
            Self::DarkFantasy => "Dark Fantasy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Rezero => {
                "Deep psychological exploration, time loop tension, emotional intensity"
            }
            Self::Fate => "Epic battles, heroic ideals, complex magic systems",
            Self::Isekai => "Power fantasy, game mechanics, adventure focus",
            Self::DarkFantasy => {
                "Gritty realism, moral ambiguity, high stakes, tactical/intense combat"
            }
        }
    }

    pub fn style_notes(&self) -> &'static str {
        match self {
            Self::Rezero => {
                "Focus on internal monologue, suffering and growth, detailed emotional reactions"
            }
            Self::Fate => {
                "Noble phantasms, servant dynamics, philosophical conflict, grand scale"
            }
            Self::Isekai => {
                "World building, skill acquisition, world exploration, lighter tone"
            }
            Self::DarkFantasy => "Consequences matter, complex villains, mature themes",
        }
    }

    pub fn default_temperature(&self) -> f32 {
        match self {
            Self::Rezero => 0.85,
            Self::Fate | Self::Isekai | Self::DarkFantasy => 0.8,
        }
    }
}

/// What the caller asks for when generating a chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterParams {
    pub directive: String,
    pub target_word_count: u32,
    pub pov_character_id: CharacterId,
    pub temperature: f32,
    #[serde(default)]
    pub style_preset: Option<StylePreset>,
}

/// A fully sized request, created once per "generate chapter" action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub story_id: StoryId,
    pub chapter_number: u32,
    pub directive: String,
    pub target_word_count: u32,
    pub pov_character_id: CharacterId,
    pub temperature: f32,
    pub style_preset: Option<StylePreset>,
    pub max_response_tokens: usize,
}

impl GenerationRequest {
    pub fn new(
        story_id: StoryId,
        chapter_number: u32,
        params: ChapterParams,
        max_response_tokens: usize,
    ) -> Self {
        Self {
            story_id,
            chapter_number,
            directive: params.directive,
            target_word_count: params.target_word_count,
            pov_character_id: params.pov_character_id,
            temperature: params.temperature.clamp(0.0, 2.0),
            style_preset: params.style_preset,
            max_response_tokens,
        }
    }
}

/// Classification of a generated draft against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    /// Within tolerance of the target, or longer
    Complete,
    /// Usable but below the tolerance band
    Short,
    /// Nothing usable came back
    Empty,
    /// Text came back but is not narrative prose
    Malformed,
}

/// What the caller should do with a classified draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationDecision {
    Accept,
    OfferContinuation,
    SurfaceWarning,
}

impl GenerationStatus {
    pub fn decision(&self) -> ValidationDecision {
        match self {
            Self::Complete => ValidationDecision::Accept,
            Self::Short => ValidationDecision::OfferContinuation,
            Self::Empty | Self::Malformed => ValidationDecision::SurfaceWarning,
        }
    }
}

/// How a draft was produced, stored alongside the chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub model: String,
    pub temperature: f32,
    pub target_word_count: u32,
    pub max_response_tokens: usize,
    pub context_tokens: usize,
    pub context_blocks: usize,
    pub skipped_blocks: usize,
    pub pov_override: bool,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    /// The endpoint stopped because `max_response_tokens` ran out
    #[serde(default)]
    pub hit_token_cap: bool,
}

/// Validated result of one generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub story_id: StoryId,
    pub chapter_number: u32,
    pub pov_character_id: CharacterId,
    pub text: String,
    pub word_count: usize,
    pub status: GenerationStatus,
    pub decision: ValidationDecision,
    pub detail: Option<String>,
    /// The user instruction that was sent, kept for the chapter record
    pub prompt_used: String,
    pub metadata: GenerationMetadata,
}
