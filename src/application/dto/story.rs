//! Story, chapter and generation DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::{CreateStoryRequest, SaveChapterRequest};
use crate::domain::entities::{Chapter, ChapterStatus, Story};
use crate::domain::value_objects::{
    ChapterParams, CharacterId, GenerationMetadata, GenerationSettings, StylePreset,
};

#[derive(Debug, Deserialize)]
pub struct CreateStoryRequestDto {
    pub title: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub themes: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub writing_style: Option<String>,
    #[serde(default)]
    pub target_length: Option<u32>,
}

impl From<CreateStoryRequestDto> for CreateStoryRequest {
    fn from(dto: CreateStoryRequestDto) -> Self {
        Self {
            title: dto.title,
            synopsis: dto.synopsis,
            genre: dto.genre,
            themes: dto.themes,
            tone: dto.tone,
            writing_style: dto.writing_style,
            target_length: dto.target_length,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoryResponseDto {
    pub id: String,
    pub title: String,
    pub synopsis: String,
    pub genre: String,
    pub themes: String,
    pub tone: String,
    pub writing_style: String,
    pub target_length: Option<u32>,
    pub current_chapter: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Story> for StoryResponseDto {
    fn from(s: Story) -> Self {
        Self {
            id: s.id.to_string(),
            title: s.title,
            synopsis: s.synopsis,
            genre: s.genre,
            themes: s.themes,
            tone: s.tone,
            writing_style: s.writing_style,
            target_length: s.target_length,
            current_chapter: s.current_chapter,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveChapterRequestDto {
    pub chapter_number: u32,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub pov_character_id: Option<CharacterId>,
    #[serde(default)]
    pub status: Option<ChapterStatus>,
}

impl From<SaveChapterRequestDto> for SaveChapterRequest {
    fn from(dto: SaveChapterRequestDto) -> Self {
        Self {
            chapter_number: dto.chapter_number,
            title: dto.title,
            content: dto.content,
            summary: dto.summary,
            pov_character_id: dto.pov_character_id,
            status: dto.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterResponseDto {
    pub id: String,
    pub story_id: String,
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub summary: Option<String>,
    pub pov_character_id: Option<String>,
    pub status: ChapterStatus,
    pub generation_params: Option<GenerationMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Chapter> for ChapterResponseDto {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id.to_string(),
            story_id: c.story_id.to_string(),
            chapter_number: c.chapter_number,
            title: c.title,
            content: c.content,
            word_count: c.word_count,
            summary: c.summary,
            pov_character_id: c.pov_character_id.map(|id| id.to_string()),
            status: c.status,
            generation_params: c.generation_params,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Body of a generate request; omitted knobs come from the current settings
#[derive(Debug, Deserialize)]
pub struct GenerateChapterRequestDto {
    pub directive: String,
    pub pov_character_id: CharacterId,
    #[serde(default)]
    pub target_word_count: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub style_preset: Option<StylePreset>,
}

impl GenerateChapterRequestDto {
    pub fn into_params(self, settings: &GenerationSettings) -> ChapterParams {
        let temperature = self.temperature.unwrap_or_else(|| {
            self.style_preset
                .map(|p| p.default_temperature())
                .unwrap_or(settings.default_temperature)
        });
        ChapterParams {
            directive: self.directive,
            target_word_count: self
                .target_word_count
                .unwrap_or(settings.default_target_word_count),
            pov_character_id: self.pov_character_id,
            temperature,
            style_preset: self.style_preset,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationStatusDto {
    pub story_id: String,
    pub generating: bool,
}

#[derive(Debug, Serialize)]
pub struct CancelGenerationResponseDto {
    pub story_id: String,
    pub cancelled: bool,
}
