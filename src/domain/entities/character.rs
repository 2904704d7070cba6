//! Character entity - a member of a story's cast

use serde::{Deserialize, Serialize};

use crate::domain::services::leading_sentences;
use crate::domain::value_objects::{CharacterId, CharacterRef, RoleTier, StoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub story_id: StoryId,
    pub name: String,
    pub role: RoleTier,
    pub age: Option<u32>,
    pub gender: String,
    pub appearance: String,
    pub personality: String,
    pub background: String,
    pub abilities: String,
    pub motivations: String,
    pub relationships: String,
    pub character_arc: String,
    /// How the character speaks, used to keep dialogue in voice
    pub voice_style: String,
    /// Free text such as "alive", "missing" or "deceased"
    pub status: String,
}

impl Character {
    pub fn new(story_id: StoryId, name: impl Into<String>, role: RoleTier) -> Self {
        Self {
            id: CharacterId::new(),
            story_id,
            name: name.into(),
            role,
            age: None,
            gender: String::new(),
            appearance: String::new(),
            personality: String::new(),
            background: String::new(),
            abilities: String::new(),
            motivations: String::new(),
            relationships: String::new(),
            character_arc: String::new(),
            voice_style: String::new(),
            status: "alive".to_string(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = appearance.into();
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    pub fn with_abilities(mut self, abilities: impl Into<String>) -> Self {
        self.abilities = abilities.into();
        self
    }

    pub fn with_motivations(mut self, motivations: impl Into<String>) -> Self {
        self.motivations = motivations.into();
        self
    }

    pub fn with_relationships(mut self, relationships: impl Into<String>) -> Self {
        self.relationships = relationships.into();
        self
    }

    pub fn with_character_arc(mut self, arc: impl Into<String>) -> Self {
        self.character_arc = arc.into();
        self
    }

    pub fn with_voice_style(mut self, voice_style: impl Into<String>) -> Self {
        self.voice_style = voice_style.into();
        self
    }

    /// Complete profile block, one attribute per line, empty fields omitted
    pub fn full_profile(&self) -> String {
        let mut profile = format!("• {}", self.name);

        let vitals: Vec<String> = self
            .age
            .map(|age| age.to_string())
            .into_iter()
            .chain(Some(self.gender.trim().to_string()).filter(|g| !g.is_empty()))
            .collect();
        if !vitals.is_empty() {
            profile.push_str(&format!(" ({})", vitals.join(", ")));
        }
        profile.push_str(&format!(" - {}\n", self.role.display_name()));

        let fields = [
            ("Appearance", &self.appearance),
            ("Personality", &self.personality),
            ("Abilities", &self.abilities),
            ("Background", &self.background),
            ("Motivations", &self.motivations),
            ("Relationships", &self.relationships),
            ("Speech Style", &self.voice_style),
            ("Character Arc", &self.character_arc),
        ];
        for (label, value) in fields {
            let value = value.trim();
            if !value.is_empty() {
                profile.push_str(&format!("  {}: {}\n", label, value));
            }
        }
        if !self.status.trim().is_empty() && self.status != "alive" {
            profile.push_str(&format!("  Status: {}\n", self.status.trim()));
        }

        profile.trim_end().to_string()
    }

    /// One-line summary built from whole leading sentences
    ///
    /// Personality is preferred; background is used when no personality
    /// has been written yet.
    pub fn condensed_profile(&self, max_words: usize) -> String {
        let source = if self.personality.trim().is_empty() {
            &self.background
        } else {
            &self.personality
        };
        let summary = leading_sentences(source, max_words);
        if summary.is_empty() {
            format!("• {} - {}", self.name, self.role.display_name())
        } else {
            format!("• {} - {}: {}", self.name, self.role.display_name(), summary)
        }
    }

    pub fn to_context_ref(&self, condensed_words: usize) -> CharacterRef {
        CharacterRef {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
            full_detail: self.full_profile(),
            condensed_detail: self.condensed_profile(condensed_words),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subaru() -> Character {
        Character::new(StoryId::new(), "Natsuki Subaru", RoleTier::Protagonist)
            .with_age(17)
            .with_gender("male")
            .with_personality("Loud and stubborn. Hides deep insecurity behind jokes. Refuses to abandon anyone.")
            .with_abilities("Return by Death")
            .with_voice_style("Casual, full of otaku references")
    }

    #[test]
    fn test_full_profile_lists_filled_fields_only() {
        let profile = subaru().full_profile();
        assert!(profile.starts_with("• Natsuki Subaru (17, male) - Protagonist\n"));
        assert!(profile.contains("  Abilities: Return by Death"));
        assert!(profile.contains("  Speech Style: Casual, full of otaku references"));
        assert!(!profile.contains("Background"));
        assert!(!profile.contains("Status"));
    }

    #[test]
    fn test_condensed_profile_keeps_whole_sentences() {
        let condensed = subaru().condensed_profile(8);
        assert_eq!(
            condensed,
            "• Natsuki Subaru - Protagonist: Loud and stubborn. Hides deep insecurity behind jokes."
        );
    }

    #[test]
    fn test_condensed_profile_without_text() {
        let extra = Character::new(StoryId::new(), "Guard", RoleTier::Minor);
        assert_eq!(extra.condensed_profile(40), "• Guard - Minor Character");
    }

    #[test]
    fn test_context_ref_carries_both_blocks() {
        let character = subaru();
        let context = character.to_context_ref(40);
        assert_eq!(context.id, character.id);
        assert_eq!(context.role, RoleTier::Protagonist);
        assert_eq!(context.full_detail, character.full_profile());
        assert!(context.condensed_detail.len() < context.full_detail.len());
    }
}
