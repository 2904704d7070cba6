//! Prompt building functions for chapter generation requests
//!
//! Both functions are pure: the same inputs always render byte-identical
//! text, which keeps requests reproducible and lets the rendered prompt be
//! stored next to the chapter it produced.

use crate::domain::services::{section_header, TASK_SECTION};
use crate::domain::value_objects::{
    ContextTier, GenerationRequest, PackedContext, StoryMetadata, StylePreset,
};

/// Build the system prompt that establishes the author persona and house style
pub fn build_system_prompt(story: &StoryMetadata, preset: Option<StylePreset>) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a talented light novel author specializing in the style of the ReZero and Fate series.\n",
    );
    prompt.push_str("Your writing features:\n");
    prompt.push_str("- Deep internal monologues and character psychology\n");
    prompt.push_str("- Detailed sensory descriptions\n");
    prompt.push_str("- Natural, character-driven dialogue\n");
    prompt.push_str("- Strategic pacing with tension and release\n");
    prompt.push_str("- Vivid action sequences when needed\n");
    prompt.push_str("- Emotional depth and complexity\n");
    prompt.push_str("- Proper light novel formatting with scene breaks\n\n");

    prompt.push_str("STORY STYLE:\n");
    prompt.push_str(&format!("Genre: {}\n", or_default(&story.genre, "Light Novel")));
    prompt.push_str(&format!("Tone: {}\n", or_default(&story.tone, "Varied based on scene")));
    prompt.push_str(&format!(
        "Style: {}\n",
        or_default(&story.writing_style, "ReZero/Fate-inspired")
    ));
    if !story.themes.trim().is_empty() {
        prompt.push_str(&format!("Themes: {}\n", story.themes.trim()));
    }
    prompt.push('\n');

    if let Some(preset) = preset {
        prompt.push_str(&format!("STYLE PRESET: {}\n", preset.name()));
        prompt.push_str(&format!("{}\n", preset.description()));
        prompt.push_str(&format!("Notes: {}\n\n", preset.style_notes()));
    }

    prompt.push_str("FORMATTING RULES:\n");
    prompt.push_str("- Write only the chapter prose, no headings, notes or commentary\n");
    prompt.push_str("- Use first-person or close third-person perspective for deep interiority\n");
    prompt.push_str("- Mark scene transitions with \"◇◇◇\"\n");
    prompt.push_str("- Give each character a voice consistent with their profile\n");
    prompt.push_str("- Stay consistent with every established character, place and rule\n");
    prompt.push_str("- End with a hook or emotional beat that compels reading the next chapter\n");

    prompt
}

/// Build the user prompt: packed context grouped by tier, then the task
pub fn build_user_prompt(
    story: &StoryMetadata,
    context: &PackedContext,
    request: &GenerationRequest,
    pov_name: Option<&str>,
) -> String {
    let mut prompt = String::new();

    for tier in ContextTier::all_by_priority() {
        let mut blocks = context.blocks_in(tier).peekable();
        if blocks.peek().is_none() {
            continue;
        }
        prompt.push_str(&section_header(tier.heading()));
        prompt.push_str("\n\n");
        for block in blocks {
            prompt.push_str(block.text.trim());
            prompt.push_str("\n\n");
        }
    }

    prompt.push_str(&section_header(TASK_SECTION));
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Title: {}\n", or_default(&story.title, "Untitled")));
    prompt.push_str(&format!("Chapter: {}\n", request.chapter_number));
    if let Some(name) = pov_name {
        prompt.push_str(&format!("Point of view: {}\n", name));
    }
    prompt.push('\n');

    prompt.push_str("PLOT DIRECTIVE FOR THIS CHAPTER:\n");
    prompt.push_str(request.directive.trim());
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "Write a complete Chapter {} that:\n",
        request.chapter_number
    ));
    prompt.push_str("1. Follows the plot directive naturally\n");
    prompt.push_str("2. Stays true to all established characters, world rules and lore\n");
    prompt.push_str("3. Maintains consistency with previous events\n");
    prompt.push_str("4. Develops characters and relationships meaningfully\n");
    prompt.push_str(&format!(
        "5. Runs approximately {} words\n",
        request.target_word_count
    ));
    prompt.push_str("6. Includes proper scene breaks and pacing\n\n");
    prompt.push_str(&format!(
        "Begin writing Chapter {} now:\n",
        request.chapter_number
    ));

    prompt
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed
    }
}
