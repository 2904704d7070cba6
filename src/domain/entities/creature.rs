//! Creature entity - bestiary entries

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{CreatureId, CreatureRef, StoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub story_id: StoryId,
    pub name: String,
    pub creature_type: String,
    pub description: String,
    pub habitat: String,
    pub abilities: String,
    pub danger_level: String,
}

impl Creature {
    pub fn new(story_id: StoryId, name: impl Into<String>, creature_type: impl Into<String>) -> Self {
        Self {
            id: CreatureId::new(),
            story_id,
            name: name.into(),
            creature_type: creature_type.into(),
            description: String::new(),
            habitat: String::new(),
            abilities: String::new(),
            danger_level: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_habitat(mut self, habitat: impl Into<String>) -> Self {
        self.habitat = habitat.into();
        self
    }

    pub fn with_abilities(mut self, abilities: impl Into<String>) -> Self {
        self.abilities = abilities.into();
        self
    }

    pub fn with_danger_level(mut self, danger_level: impl Into<String>) -> Self {
        self.danger_level = danger_level.into();
        self
    }

    pub fn to_context_ref(&self) -> CreatureRef {
        let mut detail = format!("• {} ({})", self.name, self.creature_type);
        if !self.danger_level.trim().is_empty() {
            detail.push_str(&format!(" - Danger: {}", self.danger_level.trim()));
        }
        detail.push('\n');
        for (label, value) in [
            ("", &self.description),
            ("Habitat: ", &self.habitat),
            ("Abilities: ", &self.abilities),
        ] {
            if !value.trim().is_empty() {
                detail.push_str(&format!("  {}{}\n", label, value.trim()));
            }
        }
        CreatureRef {
            id: self.id,
            name: self.name.clone(),
            detail: detail.trim_end().to_string(),
        }
    }
}
