//! Story entity - the root every other record hangs off

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{StoryId, StoryMetadata};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    pub synopsis: String,
    pub genre: String,
    pub themes: String,
    pub tone: String,
    pub writing_style: String,
    /// Planned number of chapters, if the author set one
    pub target_length: Option<u32>,
    /// Highest chapter number saved so far
    pub current_chapter: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Story {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: StoryId::new(),
            title: title.into(),
            synopsis: String::new(),
            genre: "Light Novel".to_string(),
            themes: String::new(),
            tone: String::new(),
            writing_style: String::new(),
            target_length: None,
            current_chapter: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = synopsis.into();
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_themes(mut self, themes: impl Into<String>) -> Self {
        self.themes = themes.into();
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn with_writing_style(mut self, writing_style: impl Into<String>) -> Self {
        self.writing_style = writing_style.into();
        self
    }

    pub fn with_target_length(mut self, chapters: u32) -> Self {
        self.target_length = Some(chapters);
        self
    }

    pub fn metadata(&self) -> StoryMetadata {
        StoryMetadata {
            story_id: self.id,
            title: self.title.clone(),
            genre: self.genre.clone(),
            tone: self.tone.clone(),
            writing_style: self.writing_style.clone(),
            themes: self.themes.clone(),
        }
    }
}
