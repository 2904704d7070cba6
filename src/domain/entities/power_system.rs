//! Power system entity - magic, skills and the rules that bound them

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{PowerSystemId, PowerSystemRef, StoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSystem {
    pub id: PowerSystemId,
    pub story_id: StoryId,
    pub name: String,
    pub description: String,
    pub rules: String,
    pub limitations: String,
}

impl PowerSystem {
    pub fn new(story_id: StoryId, name: impl Into<String>) -> Self {
        Self {
            id: PowerSystemId::new(),
            story_id,
            name: name.into(),
            description: String::new(),
            rules: String::new(),
            limitations: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = rules.into();
        self
    }

    pub fn with_limitations(mut self, limitations: impl Into<String>) -> Self {
        self.limitations = limitations.into();
        self
    }

    pub fn to_context_ref(&self) -> PowerSystemRef {
        let mut detail = format!("• {}\n", self.name);
        for (label, value) in [
            ("", &self.description),
            ("Rules: ", &self.rules),
            ("Limitations: ", &self.limitations),
        ] {
            if !value.trim().is_empty() {
                detail.push_str(&format!("  {}{}\n", label, value.trim()));
            }
        }
        PowerSystemRef {
            id: self.id,
            name: self.name.clone(),
            detail: detail.trim_end().to_string(),
        }
    }
}
