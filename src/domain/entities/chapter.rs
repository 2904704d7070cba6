//! Chapter entity - a saved draft of one chapter of a story

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::word_count;
use crate::domain::value_objects::{
    ChapterId, CharacterId, GenerationMetadata, GenerationOutcome, StoryId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    Draft,
    Revised,
    Final,
}

impl ChapterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Revised => "revised",
            Self::Final => "final",
        }
    }

    /// Unknown stored values read back as drafts
    pub fn parse(s: &str) -> Self {
        match s {
            "revised" => Self::Revised,
            "final" => Self::Final,
            _ => Self::Draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub story_id: StoryId,
    pub chapter_number: u32,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    /// Author-written recap, fed to the next chapter's context. Without one
    /// the next chapter sees the closing sentences instead.
    pub summary: Option<String>,
    pub pov_character_id: Option<CharacterId>,
    pub status: ChapterStatus,
    pub prompt_used: String,
    /// Present when the chapter came out of the generator
    pub generation_params: Option<GenerationMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(story_id: StoryId, chapter_number: u32, content: impl Into<String>) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: ChapterId::new(),
            story_id,
            chapter_number,
            title: format!("Chapter {}", chapter_number),
            word_count: word_count(&content),
            content,
            summary: None,
            pov_character_id: None,
            status: ChapterStatus::Draft,
            prompt_used: String::new(),
            generation_params: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Draft chapter built from a validated generation outcome
    pub fn from_outcome(outcome: &GenerationOutcome) -> Self {
        let mut chapter = Self::new(outcome.story_id, outcome.chapter_number, outcome.text.clone());
        chapter.pov_character_id = Some(outcome.pov_character_id);
        chapter.prompt_used = outcome.prompt_used.clone();
        chapter.generation_params = Some(outcome.metadata.clone());
        chapter
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Blank summaries are stored as none
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        let summary = summary.into();
        self.summary = Some(summary).filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_pov_character(mut self, character_id: CharacterId) -> Self {
        self.pov_character_id = Some(character_id);
        self
    }

    pub fn with_status(mut self, status: ChapterStatus) -> Self {
        self.status = status;
        self
    }
}
