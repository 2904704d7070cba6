//! Story context service - assembles the snapshot a chapter is generated from
//!
//! Reads every entity list for a story once, renders each record into its
//! context form and freezes the result into a `StorySnapshot`. The snapshot
//! is the only thing the packer and prompt builder ever see.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::application::ports::outbound::StoryRepositoryPort;
use crate::domain::entities::Chapter;
use crate::domain::services::closing_sentences;
use crate::domain::value_objects::{StoryId, StorySnapshot};

/// Length of the excerpt standing in for a chapter that has no summary
const CLOSING_EXCERPT_WORDS: usize = 120;

pub struct StoryContextService {
    repository: Arc<dyn StoryRepositoryPort>,
}

impl StoryContextService {
    pub fn new(repository: Arc<dyn StoryRepositoryPort>) -> Self {
        Self { repository }
    }

    /// Snapshot for writing the chapter after the latest saved one
    ///
    /// Returns `None` when the story does not exist. `condensed_words`
    /// bounds condensed character blocks and lore excerpts.
    #[instrument(skip(self))]
    pub async fn build_snapshot(
        &self,
        story_id: StoryId,
        condensed_words: usize,
    ) -> Result<Option<StorySnapshot>> {
        let Some(story) = self
            .repository
            .get_story(story_id)
            .await
            .context("Failed to load story")?
        else {
            return Ok(None);
        };

        let characters = self
            .repository
            .list_characters(story_id)
            .await
            .context("Failed to load characters")?;
        let locations = self
            .repository
            .list_locations(story_id)
            .await
            .context("Failed to load locations")?;
        let creatures = self
            .repository
            .list_creatures(story_id)
            .await
            .context("Failed to load creatures")?;
        let power_systems = self
            .repository
            .list_power_systems(story_id)
            .await
            .context("Failed to load power systems")?;
        let lore = self
            .repository
            .list_lore(story_id)
            .await
            .context("Failed to load lore")?;
        let arcs = self
            .repository
            .list_arcs(story_id)
            .await
            .context("Failed to load story arcs")?;
        let latest = self
            .repository
            .latest_chapter(story_id)
            .await
            .context("Failed to load latest chapter")?;

        let chapter_number = latest
            .as_ref()
            .map(|c| c.chapter_number)
            .unwrap_or(0)
            .max(story.current_chapter)
            + 1;
        let previous_chapter_summary = latest.as_ref().and_then(previous_chapter_context);
        let arcs: Vec<_> = arcs
            .iter()
            .filter(|a| a.covers(chapter_number))
            .map(|a| a.to_context_ref())
            .collect();

        debug!(
            characters = characters.len(),
            locations = locations.len(),
            creatures = creatures.len(),
            power_systems = power_systems.len(),
            lore = lore.len(),
            arcs = arcs.len(),
            chapter_number,
            has_summary = previous_chapter_summary.is_some(),
            "Assembled story snapshot"
        );

        Ok(Some(StorySnapshot {
            metadata: story.metadata(),
            chapter_number,
            characters: characters
                .iter()
                .map(|c| c.to_context_ref(condensed_words))
                .collect(),
            locations: locations.iter().map(|l| l.to_context_ref()).collect(),
            creatures: creatures.iter().map(|c| c.to_context_ref()).collect(),
            power_systems: power_systems.iter().map(|p| p.to_context_ref()).collect(),
            lore: lore.iter().map(|l| l.to_context_ref(condensed_words)).collect(),
            arcs,
            previous_chapter_summary,
        }))
    }
}

/// The chapter's summary, or how it ended when nobody summarized it
fn previous_chapter_context(chapter: &Chapter) -> Option<String> {
    if let Some(summary) = chapter.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        return Some(summary.to_string());
    }
    let ending = closing_sentences(&chapter.content, CLOSING_EXCERPT_WORDS);
    if ending.is_empty() {
        return None;
    }
    Some(format!("Chapter {} ended: {}", chapter.chapter_number, ending))
}
