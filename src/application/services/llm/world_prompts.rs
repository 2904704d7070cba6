//! Prompts for world-building, profile expansion and synopsis analysis
//!
//! Same rules as the chapter prompts: plain functions, no I/O, identical
//! inputs render identical text.

use crate::domain::entities::{Location, LoreEntry, PowerSystem, Story};
use crate::domain::services::section_header;

pub const WORLD_BUILDER_SYSTEM_PROMPT: &str = "You are a world-building expert for light novel settings.
Generate detailed, internally consistent world elements that feel authentic and immersive.
Focus on practicality, cultural depth, and how elements interconnect.
Avoid generic fantasy tropes unless specifically requested.
Format your response clearly with headers and organized sections.";

pub const CHARACTER_DEVELOPER_SYSTEM_PROMPT: &str = "You are a character development specialist for light novels.
Create deep, multi-dimensional characters with realistic motivations, flaws, and growth potential.
Consider their role in the story, relationships, and how they'll evolve.
Write in a detailed but organized format.";

/// Aspects a location expansion covers when the caller names none
pub const DEFAULT_LOCATION_ASPECTS: [&str; 5] =
    ["geography", "culture", "history", "politics", "economy"];

/// How much of an existing element's description is quoted back
const EXCERPT_CHARS: usize = 150;
const REFERENCE_CHARS: usize = 100;
const REFERENCED_LORE: usize = 5;

/// Wrap a specific request with the story and the places already established
pub fn build_world_prompt(story: &Story, existing: &[Location], focus: &str, request: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&section_header("WORLD BUILDING TASK"));
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Story: {}\n", story.title));
    prompt.push_str(&format!("Genre: {}\n", story.genre));
    prompt.push_str(&format!("Themes: {}\n", story.themes.trim()));

    if !existing.is_empty() {
        prompt.push('\n');
        prompt.push_str(&section_header("EXISTING WORLD ELEMENTS"));
        prompt.push_str("\n\n");
        for location in existing {
            prompt.push_str(&format!(
                "• {} ({}): {}\n",
                location.name,
                location.location_type,
                excerpt(&location.description, EXCERPT_CHARS)
            ));
        }
    }

    prompt.push_str(&format!("\nGENERATION FOCUS: {}\n\n", focus));
    prompt.push_str("SPECIFIC REQUEST:\n");
    prompt.push_str(request.trim());
    prompt.push_str("\n\n");

    prompt.push_str("INSTRUCTIONS:\n");
    prompt.push_str("Generate detailed world-building information that:\n");
    prompt.push_str("1. Fits seamlessly with the existing world elements\n");
    prompt.push_str("2. Feels authentic and internally consistent\n");
    prompt.push_str("3. Has depth and interesting details\n");
    prompt.push_str("4. Considers practical implications (economy, society, culture)\n");
    prompt.push_str("5. Avoids generic fantasy clichés\n");
    prompt.push_str("6. Provides hooks for story potential\n");
    prompt.push_str("7. Is organized clearly with headers\n\n");
    prompt.push_str("Format your response with clear sections for each element you create.\n");
    prompt.push_str("Include practical details that make the world feel real and lived-in.\n\n");
    prompt.push_str("Generate the requested world details now:\n");

    prompt
}

pub fn location_request(location: &Location, aspects: &[String]) -> String {
    format!(
        "Create comprehensive details for: {} ({})\nBasic Description: {}\n\nFocus on these aspects: {}\n\nProvide rich, specific details that make this location feel real and unique.\nConsider how it fits into the broader world and story.",
        location.name,
        location.location_type,
        location.description.trim(),
        aspects.join(", ")
    )
}

pub fn power_system_request(concept: &str, existing: &[PowerSystem]) -> String {
    let mut request = format!("Create a detailed power/magic system based on: {}\n\n", concept.trim());
    if !existing.is_empty() {
        request.push_str("Existing Power Systems:\n");
        for system in existing {
            request.push_str(&format!(
                "• {}: {}\n",
                system.name,
                excerpt(&system.description, REFERENCE_CHARS)
            ));
        }
        request.push('\n');
    }
    request.push_str("Include:\n");
    request.push_str("1. System Name and Core Concept\n");
    request.push_str("2. How it works (mechanics)\n");
    request.push_str("3. Rules and limitations (very important!)\n");
    request.push_str("4. How people acquire/learn this power\n");
    request.push_str("5. Power levels or progression\n");
    request.push_str("6. Examples of abilities/techniques\n");
    request.push_str("7. Weaknesses and costs\n");
    request.push_str("8. How it affects society/culture\n\n");
    request.push_str("Make it unique, balanced, and story-appropriate.\n");
    request.push_str("Ensure it has clear limitations to prevent it from solving all problems easily.");
    request
}

pub fn lore_request(topic: &str, category: &str, existing: &[LoreEntry]) -> String {
    let mut request = format!(
        "Create detailed lore about: {}\nCategory: {}\n\n",
        topic.trim(),
        category
    );
    if !existing.is_empty() {
        request.push_str("Existing Lore:\n");
        for entry in existing.iter().take(REFERENCED_LORE) {
            request.push_str(&format!(
                "• {}: {}\n",
                entry.title,
                excerpt(&entry.content, REFERENCE_CHARS)
            ));
        }
        request.push('\n');
    }
    request.push_str("Provide:\n");
    request.push_str("1. The core information/event\n");
    request.push_str("2. Historical context and timeline\n");
    request.push_str("3. Key figures involved\n");
    request.push_str("4. Impact on the world/society\n");
    request.push_str("5. Modern-day relevance\n");
    request.push_str("6. Connections to other lore elements\n");
    request.push_str("7. Story hooks this creates\n\n");
    request.push_str("Make it compelling and useful for storytelling.");
    request
}

/// Profile expansion for a character or a creature
///
/// `known` lists the fields already filled in, as label and value. Blank
/// values are left out.
pub fn build_profile_prompt(
    name: &str,
    role: &str,
    story: &Story,
    known: &[(&str, String)],
    focus: &str,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&section_header("CHARACTER DEVELOPMENT TASK"));
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Character: {}\n", name));
    prompt.push_str(&format!("Role: {}\n", role));
    prompt.push_str(&format!("Story: {}\n\n", story.title));

    prompt.push_str("EXISTING INFORMATION:\n");
    for (label, value) in known.iter().filter(|(_, v)| !v.trim().is_empty()) {
        prompt.push_str(&format!("{}: {}\n", label, value.trim()));
    }

    prompt.push_str(&format!("\nEXPANSION FOCUS: {}\n\n", focus));
    prompt.push_str("INSTRUCTIONS:\n");
    prompt.push_str("Expand this character's details with depth and nuance:\n");
    prompt.push_str("1. Create realistic motivations and conflicts\n");
    prompt.push_str("2. Develop their voice and mannerisms\n");
    prompt.push_str("3. Establish meaningful relationships\n");
    prompt.push_str("4. Plan character growth potential\n");
    prompt.push_str("5. Consider their role in the story\n");
    prompt.push_str("6. Add unique quirks and traits\n");
    prompt.push_str("7. Ensure they feel like a real person\n\n");
    prompt.push_str("Provide detailed character information now:\n");

    prompt
}

pub fn build_structure_prompt(synopsis: &str, genre: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&section_header("STORY STRUCTURE ANALYSIS"));
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Genre: {}\n\n", genre));
    prompt.push_str("Synopsis:\n");
    prompt.push_str(synopsis.trim());
    prompt.push_str("\n\n");

    prompt.push_str("TASK:\nAnalyze this synopsis and suggest:\n\n");
    prompt.push_str("1. KEY CHARACTERS needed:\n");
    prompt.push_str("   - Protagonist(s) with brief descriptions\n");
    prompt.push_str("   - Major supporting characters\n");
    prompt.push_str("   - Potential antagonists\n\n");
    prompt.push_str("2. WORLD LOCATIONS required:\n");
    prompt.push_str("   - Primary setting(s)\n");
    prompt.push_str("   - Important secondary locations\n");
    prompt.push_str("   - Brief description of each\n\n");
    prompt.push_str("3. POWER SYSTEMS (if applicable):\n");
    prompt.push_str("   - Magic/ability systems needed\n");
    prompt.push_str("   - Rules and limitations\n");
    prompt.push_str("   - How they serve the story\n\n");
    prompt.push_str("4. KEY LORE ELEMENTS:\n");
    prompt.push_str("   - Historical events that matter\n");
    prompt.push_str("   - Cultural/social structures\n");
    prompt.push_str("   - Important background information\n\n");
    prompt.push_str("5. STORY ARCS suggested:\n");
    prompt.push_str("   - Major plot arcs (3-5)\n");
    prompt.push_str("   - Character development arcs\n");
    prompt.push_str("   - Potential chapter breakdown\n\n");
    prompt.push_str("Format your response clearly with headers for each section.\n");
    prompt.push_str("Focus on what's essential for this story to work well.\n\n");
    prompt.push_str("Provide your analysis:\n");

    prompt
}

/// The first `max_chars` characters, on a char boundary
fn excerpt(text: &str, max_chars: usize) -> &str {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::StoryId;

    fn story() -> Story {
        Story::new("The Bell Tower")
            .with_genre("Dark Fantasy")
            .with_themes("Memory, duty")
    }

    #[test]
    fn test_world_prompt_lists_existing_places() {
        let story = story();
        let harbor = Location::new(story.id, "Harbor", "Town").with_description("é".repeat(400));
        let prompt = build_world_prompt(&story, &[harbor], "Lore", "Tell me about the bells.");

        assert!(prompt.starts_with("=== WORLD BUILDING TASK ===\n\nStory: The Bell Tower\n"));
        assert!(prompt.contains("=== EXISTING WORLD ELEMENTS ==="));
        assert!(prompt.contains(&format!("• Harbor (Town): {}\n", "é".repeat(150))));
        assert!(prompt.contains("GENERATION FOCUS: Lore\n"));
        assert!(prompt.ends_with("Generate the requested world details now:\n"));
    }

    #[test]
    fn test_world_prompt_without_places_has_no_existing_section() {
        let prompt = build_world_prompt(&story(), &[], "Power System", "Bellcraft");
        assert!(!prompt.contains("EXISTING WORLD ELEMENTS"));
    }

    #[test]
    fn test_lore_request_quotes_at_most_five_entries() {
        let story_id = StoryId::new();
        let entries: Vec<_> = (0..7)
            .map(|i| LoreEntry::new(story_id, "History", format!("Entry {}", i), "Text."))
            .collect();
        let request = lore_request("The Drowning", "History", &entries);

        assert!(request.contains("• Entry 4: Text.\n"));
        assert!(!request.contains("Entry 5"));
    }

    #[test]
    fn test_profile_prompt_skips_blank_fields() {
        let prompt = build_profile_prompt(
            "Ilse",
            "protagonist",
            &story(),
            &[("Age", "19".to_string()), ("Background", "  ".to_string())],
            "voice",
        );

        assert!(prompt.contains("EXISTING INFORMATION:\nAge: 19\n\nEXPANSION FOCUS: voice\n"));
        assert!(!prompt.contains("Background:"));
    }
}
