//! Story arc entity - a span of chapters and where its threads stand

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ArcId, ArcRef, StoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryArc {
    pub id: ArcId,
    pub story_id: StoryId,
    pub arc_number: u32,
    pub name: String,
    pub synopsis: String,
    /// First chapter of the arc; open when unset
    pub start_chapter: Option<u32>,
    /// Last chapter of the arc; open when unset
    pub end_chapter: Option<u32>,
    /// Thread name to where it stands, e.g. "main_conflict" -> "escalating"
    pub progression: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoryArc {
    pub fn new(story_id: StoryId, arc_number: u32, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ArcId::new(),
            story_id,
            arc_number,
            name: name.into(),
            synopsis: String::new(),
            start_chapter: None,
            end_chapter: None,
            progression: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = synopsis.into();
        self
    }

    pub fn spanning(mut self, start_chapter: Option<u32>, end_chapter: Option<u32>) -> Self {
        self.start_chapter = start_chapter;
        self.end_chapter = end_chapter;
        self
    }

    pub fn with_progress(mut self, thread: impl Into<String>, state: impl Into<String>) -> Self {
        self.progression.insert(thread.into(), state.into());
        self
    }

    /// Whether `chapter_number` falls inside the arc's chapter span
    pub fn covers(&self, chapter_number: u32) -> bool {
        self.start_chapter.map_or(true, |start| start <= chapter_number)
            && self.end_chapter.map_or(true, |end| chapter_number <= end)
    }

    pub fn to_context_ref(&self) -> ArcRef {
        let mut detail = format!("• Arc {}: {}", self.arc_number, self.name);
        match (self.start_chapter, self.end_chapter) {
            (Some(start), Some(end)) => detail.push_str(&format!(" (chapters {}-{})", start, end)),
            (Some(start), None) => detail.push_str(&format!(" (from chapter {})", start)),
            (None, Some(end)) => detail.push_str(&format!(" (until chapter {})", end)),
            (None, None) => {}
        }
        detail.push('\n');
        if !self.synopsis.trim().is_empty() {
            detail.push_str(&format!("  {}\n", self.synopsis.trim()));
        }
        let threads: Vec<_> = self
            .progression
            .iter()
            .filter(|(_, state)| !state.trim().is_empty())
            .collect();
        if !threads.is_empty() {
            detail.push_str("  Current Arc Progression:\n");
            for (thread, state) in threads {
                detail.push_str(&format!("  - {}: {}\n", thread.trim(), state.trim()));
            }
        }
        ArcRef {
            id: self.id,
            name: self.name.clone(),
            detail: detail.trim_end().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_ended_spans() {
        let story_id = StoryId::new();
        let bounded = StoryArc::new(story_id, 2, "The Fall").spanning(Some(5), Some(9));
        assert!(!bounded.covers(4));
        assert!(bounded.covers(5));
        assert!(bounded.covers(9));
        assert!(!bounded.covers(10));

        let open = StoryArc::new(story_id, 3, "Ashes").spanning(Some(10), None);
        assert!(open.covers(400));
        assert!(StoryArc::new(story_id, 1, "Prologue").covers(1));
    }

    #[test]
    fn test_context_ref_lists_progression() {
        let arc = StoryArc::new(StoryId::new(), 2, "The Fall")
            .with_synopsis("The capital burns and the order splits.")
            .spanning(Some(5), Some(9))
            .with_progress("main_conflict", "escalating")
            .with_progress("aria_trust", "broken")
            .with_progress("blank", "  ");

        let detail = arc.to_context_ref().detail;

        assert_eq!(
            detail,
            "• Arc 2: The Fall (chapters 5-9)\n  The capital burns and the order splits.\n  Current Arc Progression:\n  - aria_trust: broken\n  - main_conflict: escalating"
        );
    }
}
