//! Token budget and packed context types

use serde::{Deserialize, Serialize};

use super::EntityKey;

/// Priority class of a packed block, highest priority first
///
/// The declaration order is the packing order and the order in which the
/// prompt builder renders sections, so `Ord` is derived on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextTier {
    PointOfView,
    PreviousChapter,
    Protagonist,
    Major,
    Supporting,
    Location,
    PowerSystem,
    Lore,
    Creature,
    StoryProgression,
}

impl ContextTier {
    pub fn all_by_priority() -> [Self; 10] {
        [
            Self::PointOfView,
            Self::PreviousChapter,
            Self::Protagonist,
            Self::Major,
            Self::Supporting,
            Self::Location,
            Self::PowerSystem,
            Self::Lore,
            Self::Creature,
            Self::StoryProgression,
        ]
    }

    /// Section heading used in the rendered prompt
    pub fn heading(&self) -> &'static str {
        match self {
            Self::PointOfView => "POINT-OF-VIEW CHARACTER",
            Self::PreviousChapter => "PREVIOUS CHAPTER SUMMARY",
            Self::Protagonist => "PROTAGONISTS",
            Self::Major => "MAJOR CHARACTERS",
            Self::Supporting => "SUPPORTING CHARACTERS",
            Self::Location => "WORLD SETTING",
            Self::PowerSystem => "POWER SYSTEMS",
            Self::Lore => "RELEVANT LORE",
            Self::Creature => "CREATURES",
            Self::StoryProgression => "STORY PROGRESSION",
        }
    }
}

/// Token accounting for one generation request
///
/// `model_context_tokens` is the configured ceiling for the model (kept well
/// under its real window). The scaffolding reserve covers the fixed parts of
/// the prompt, the response reserve covers what the model is asked to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBudget {
    pub model_context_tokens: usize,
    pub scaffolding_reserve_tokens: usize,
    pub response_reserve_tokens: usize,
}

impl ContextBudget {
    pub fn new(
        model_context_tokens: usize,
        scaffolding_reserve_tokens: usize,
        response_reserve_tokens: usize,
    ) -> Self {
        Self {
            model_context_tokens,
            scaffolding_reserve_tokens,
            response_reserve_tokens,
        }
    }

    /// A budget where every token goes to story context
    pub fn context_only(tokens: usize) -> Self {
        Self::new(tokens, 0, 0)
    }

    /// Tokens left for packed story context after both reservations
    pub fn available_for_context(&self) -> usize {
        self.model_context_tokens
            .saturating_sub(self.scaffolding_reserve_tokens)
            .saturating_sub(self.response_reserve_tokens)
    }

    /// Response cap once `packed_tokens` of context are actually in place
    ///
    /// Equals the response reserve whenever packing stayed inside its budget.
    /// Shrinks only when the viewpoint override pushed the context past it.
    pub fn response_cap(&self, packed_tokens: usize) -> usize {
        let room = self
            .model_context_tokens
            .saturating_sub(self.scaffolding_reserve_tokens)
            .saturating_sub(packed_tokens);
        self.response_reserve_tokens.min(room)
    }
}

/// One rendered block chosen by the packer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub entity: EntityKey,
    pub tier: ContextTier,
    pub text: String,
    pub tokens: usize,
}

/// A candidate that was left out because it did not fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBlock {
    pub entity: EntityKey,
    pub tier: ContextTier,
    pub tokens: usize,
}

/// Result of packing a snapshot into a token budget
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackedContext {
    pub blocks: Vec<ContextBlock>,
    pub available_tokens: usize,
    /// Set when the viewpoint character alone did not fit and was packed anyway
    pub pov_override: bool,
    pub skipped: Vec<SkippedBlock>,
}

impl PackedContext {
    pub fn total_tokens(&self) -> usize {
        self.blocks.iter().map(|b| b.tokens).sum()
    }

    pub fn within_budget(&self) -> bool {
        self.total_tokens() <= self.available_tokens
    }

    pub fn contains(&self, entity: EntityKey) -> bool {
        self.blocks.iter().any(|b| b.entity == entity)
    }

    pub fn blocks_in(&self, tier: ContextTier) -> impl Iterator<Item = &ContextBlock> {
        self.blocks.iter().filter(move |b| b.tier == tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_for_context_subtracts_reserves() {
        let budget = ContextBudget::new(16_384, 1_024, 4_500);
        assert_eq!(budget.available_for_context(), 10_860);
    }

    #[test]
    fn test_available_for_context_saturates() {
        let budget = ContextBudget::new(2_000, 1_024, 4_500);
        assert_eq!(budget.available_for_context(), 0);
    }

    #[test]
    fn test_response_cap_keeps_reserve_when_context_fits() {
        let budget = ContextBudget::new(8_192, 512, 3_000);
        assert_eq!(budget.response_cap(4_000), 3_000);
    }

    #[test]
    fn test_response_cap_shrinks_after_override() {
        let budget = ContextBudget::new(8_192, 512, 3_000);
        // 8192 - 512 - 6000 = 1680 left for the response
        assert_eq!(budget.response_cap(6_000), 1_680);
        assert!(512 + 6_000 + budget.response_cap(6_000) <= 8_192);
    }

    #[test]
    fn test_tier_order_matches_priority() {
        let tiers = ContextTier::all_by_priority();
        assert!(tiers.windows(2).all(|w| w[0] < w[1]));
    }
}
