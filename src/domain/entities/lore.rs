//! Lore entity - history, legends and world facts

use serde::{Deserialize, Serialize};

use crate::domain::services::leading_sentences;
use crate::domain::value_objects::{LoreId, LoreRef, StoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoreEntry {
    pub id: LoreId,
    pub story_id: StoryId,
    pub category: String,
    pub title: String,
    pub content: String,
}

impl LoreEntry {
    pub fn new(
        story_id: StoryId,
        category: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: LoreId::new(),
            story_id,
            category: category.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Lore is excerpted to its leading sentences, entries tend to be long
    pub fn to_context_ref(&self, excerpt_words: usize) -> LoreRef {
        let mut detail = format!("• {} ({})", self.title, self.category);
        let excerpt = leading_sentences(&self.content, excerpt_words);
        if !excerpt.is_empty() {
            detail.push_str(&format!("\n  {}", excerpt));
        }
        LoreRef {
            id: self.id,
            name: self.title.clone(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_stops_at_sentence() {
        let entry = LoreEntry::new(
            StoryId::new(),
            "History",
            "The Great Witch War",
            "Four hundred years ago the Witch of Envy swallowed half the world. \
             The Sword Saint sealed her away. Nobody speaks her name.",
        );
        let context = entry.to_context_ref(20);
        assert_eq!(
            context.detail,
            "• The Great Witch War (History)\n  Four hundred years ago the Witch of Envy swallowed half the world. The Sword Saint sealed her away."
        );
    }
}
