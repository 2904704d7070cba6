//! Location entity - a place in the story world

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{LocationId, LocationRef, StoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub story_id: StoryId,
    pub name: String,
    /// Free text such as "Kingdom", "City" or "Dungeon"
    pub location_type: String,
    pub description: String,
    pub culture: String,
}

impl Location {
    pub fn new(story_id: StoryId, name: impl Into<String>, location_type: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            story_id,
            name: name.into(),
            location_type: location_type.into(),
            description: String::new(),
            culture: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_culture(mut self, culture: impl Into<String>) -> Self {
        self.culture = culture.into();
        self
    }

    pub fn to_context_ref(&self) -> LocationRef {
        let mut detail = format!("• {} ({})\n", self.name, self.location_type);
        if !self.description.trim().is_empty() {
            detail.push_str(&format!("  {}\n", self.description.trim()));
        }
        if !self.culture.trim().is_empty() {
            detail.push_str(&format!("  Culture: {}\n", self.culture.trim()));
        }
        LocationRef {
            id: self.id,
            name: self.name.clone(),
            detail: detail.trim_end().to_string(),
        }
    }
}
