//! Structured views of world-building text returned by the model
//!
//! Every field is best effort: a section the model did not write comes back
//! empty, and the raw text is always kept next to the parsed view.

use serde::{Deserialize, Serialize};

use crate::domain::services::{extract_field, extract_section};

/// What a synopsis needs, as suggested by the model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureSuggestions {
    pub characters: String,
    pub locations: String,
    pub power_systems: String,
    pub lore: String,
    pub arcs: String,
}

impl StructureSuggestions {
    pub fn parse(text: &str) -> Self {
        Self {
            characters: extract_section(text, &["CHARACTERS"]),
            locations: extract_section(text, &["LOCATIONS"]),
            power_systems: extract_section(text, &["POWER"]),
            lore: extract_section(text, &["LORE"]),
            arcs: extract_section(text, &["ARCS"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetails {
    pub geography: String,
    pub culture: String,
    pub history: String,
    pub economy: String,
    pub politics: String,
    pub notable_locations: String,
}

impl LocationDetails {
    pub fn parse(text: &str) -> Self {
        Self {
            geography: extract_section(text, &["GEOGRAPHY"]),
            culture: extract_section(text, &["CULTURE"]),
            history: extract_section(text, &["HISTORY"]),
            economy: extract_section(text, &["ECONOMY"]),
            politics: extract_section(text, &["POLITICS"]),
            notable_locations: extract_section(text, &["NOTABLE"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSystemDraft {
    pub name: String,
    pub description: String,
    pub rules: String,
    pub limitations: String,
    pub acquisition: String,
    pub examples: String,
}

impl PowerSystemDraft {
    pub fn parse(text: &str) -> Self {
        Self {
            name: extract_field(text, &["name", "System Name"]),
            description: extract_section(text, &["CONCEPT", "DESCRIPTION"]),
            rules: extract_section(text, &["RULES", "MECHANICS"]),
            limitations: extract_section(text, &["LIMITATIONS", "WEAKNESSES"]),
            acquisition: extract_section(text, &["ACQUISITION", "LEARN"]),
            examples: extract_section(text, &["EXAMPLES", "ABILITIES"]),
        }
    }
}

/// Suggested profile fields for a character or a creature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSuggestions {
    pub personality: String,
    pub background: String,
    pub motivations: String,
    pub relationships: String,
    pub voice: String,
    pub development: String,
}

impl ProfileSuggestions {
    pub fn parse(text: &str) -> Self {
        Self {
            personality: extract_section(text, &["PERSONALITY"]),
            background: extract_section(text, &["BACKGROUND"]),
            motivations: extract_section(text, &["MOTIVATIONS"]),
            relationships: extract_section(text, &["RELATIONSHIPS"]),
            voice: extract_section(text, &["VOICE", "SPEECH"]),
            development: extract_section(text, &["DEVELOPMENT", "GROWTH"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_system_falls_back_to_alternate_headings() {
        let text = "System Name: Bellcraft\n\nMechanics: A struck bell binds a spirit.\n\nWeaknesses: Cracked bells backfire.\n\nAbilities: Toll of Silence.";
        let draft = PowerSystemDraft::parse(text);

        assert_eq!(draft.name, "Bellcraft");
        assert_eq!(draft.rules, "A struck bell binds a spirit.");
        assert_eq!(draft.limitations, "Cracked bells backfire.");
        assert_eq!(draft.examples, "Toll of Silence.");
        assert_eq!(draft.acquisition, "");
    }

    #[test]
    fn test_structure_sections() {
        let text = "KEY CHARACTERS:\nIlse, a bell-ringer.\n\nWORLD LOCATIONS:\nThe drowned city.\n\nSTORY ARCS:\n1. The Silence";
        let suggestions = StructureSuggestions::parse(text);

        assert_eq!(suggestions.characters, "Ilse, a bell-ringer.");
        assert_eq!(suggestions.locations, "The drowned city.");
        assert_eq!(suggestions.arcs, "1. The Silence");
        assert_eq!(suggestions.power_systems, "");
    }
}
