//! Story arc and world-building request DTOs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::services::CreateArcRequest;
use crate::domain::entities::{StoryArc, WorldGeneration, WorldGenerationKind};

#[derive(Debug, Deserialize)]
pub struct CreateArcRequestDto {
    pub arc_number: u32,
    pub name: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub start_chapter: Option<u32>,
    #[serde(default)]
    pub end_chapter: Option<u32>,
    #[serde(default)]
    pub progression: BTreeMap<String, String>,
}

impl From<CreateArcRequestDto> for CreateArcRequest {
    fn from(dto: CreateArcRequestDto) -> Self {
        Self {
            arc_number: dto.arc_number,
            name: dto.name,
            synopsis: dto.synopsis,
            start_chapter: dto.start_chapter,
            end_chapter: dto.end_chapter,
            progression: dto.progression,
        }
    }
}

/// Replaces the whole progression map
#[derive(Debug, Deserialize)]
pub struct UpdateArcProgressionRequestDto {
    pub progression: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ArcResponseDto {
    pub id: String,
    pub story_id: String,
    pub arc_number: u32,
    pub name: String,
    pub synopsis: String,
    pub start_chapter: Option<u32>,
    pub end_chapter: Option<u32>,
    pub progression: BTreeMap<String, String>,
    pub updated_at: String,
}

impl From<StoryArc> for ArcResponseDto {
    fn from(a: StoryArc) -> Self {
        Self {
            id: a.id.to_string(),
            story_id: a.story_id.to_string(),
            arc_number: a.arc_number,
            name: a.name,
            synopsis: a.synopsis,
            start_chapter: a.start_chapter,
            end_chapter: a.end_chapter,
            progression: a.progression,
            updated_at: a.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SynopsisAnalysisRequestDto {
    /// Defaults to the story's synopsis
    #[serde(default)]
    pub synopsis: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpandLocationRequestDto {
    #[serde(default)]
    pub aspects: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePowerSystemRequestDto {
    pub concept: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateLoreRequestDto {
    pub topic: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpandProfileRequestDto {
    #[serde(default)]
    pub focus: Option<String>,
}

/// One entry of a story's world-building history
#[derive(Debug, Serialize)]
pub struct WorldGenerationResponseDto {
    pub id: String,
    pub kind: WorldGenerationKind,
    pub subject: String,
    pub result: String,
    pub created_at: String,
}

impl From<WorldGeneration> for WorldGenerationResponseDto {
    fn from(g: WorldGeneration) -> Self {
        Self {
            id: g.id.to_string(),
            kind: g.kind,
            subject: g.subject,
            result: g.result,
            created_at: g.created_at.to_rfc3339(),
        }
    }
}
