//! Context packer - fits story state into a token budget
//!
//! Candidates are offered tier by tier, highest priority first. A candidate
//! is appended when the running total stays within the available budget and
//! skipped otherwise; the walk then continues, so smaller blocks in lower
//! tiers can still use the remaining room. Blocks are never truncated: the
//! only size reduction is the choice between a character's full and
//! condensed detail, which is fixed by role.
//!
//! The viewpoint character is the single exception to the budget. It is
//! always packed at full detail and `PackedContext::pov_override` records
//! when that pushed the total past the available budget.

use crate::domain::value_objects::{
    CharacterId, CharacterRef, ContextBlock, ContextBudget, ContextTier, EntityKey,
    GenerationSettings, PackedContext, RoleTier, SkippedBlock, StorySnapshot, WorldElementRef,
};

use super::token_estimator::TokenEstimator;

/// Per-tier candidate limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierCaps {
    pub max_protagonists: usize,
    pub max_major_characters: usize,
    pub max_locations: usize,
    pub max_power_systems: usize,
    pub max_lore_entries: usize,
    pub max_creatures: usize,
    pub max_story_arcs: usize,
}

impl Default for TierCaps {
    fn default() -> Self {
        Self::from(&GenerationSettings::default())
    }
}

impl From<&GenerationSettings> for TierCaps {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            max_protagonists: settings.max_protagonists,
            max_major_characters: settings.max_major_characters,
            max_locations: settings.max_locations,
            max_power_systems: settings.max_power_systems,
            max_lore_entries: settings.max_lore_entries,
            max_creatures: settings.max_creatures,
            max_story_arcs: settings.max_story_arcs,
        }
    }
}

pub struct ContextPacker<'a> {
    estimator: &'a dyn TokenEstimator,
    caps: TierCaps,
}

impl<'a> ContextPacker<'a> {
    pub fn new(estimator: &'a dyn TokenEstimator, caps: TierCaps) -> Self {
        Self { estimator, caps }
    }

    pub fn pack(
        &self,
        snapshot: &StorySnapshot,
        budget: &ContextBudget,
        pov_character_id: CharacterId,
    ) -> PackedContext {
        let mut fill = Fill::new(self.estimator, budget.available_for_context());

        if let Some(pov) = snapshot.character(pov_character_id) {
            fill.force(
                EntityKey::Character(pov.id),
                ContextTier::PointOfView,
                &pov.full_detail,
            );
        }

        if let Some(summary) = snapshot
            .previous_chapter_summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            fill.offer(EntityKey::PreviousChapter, ContextTier::PreviousChapter, summary);
        }

        let others = || {
            snapshot
                .characters
                .iter()
                .filter(move |c| c.id != pov_character_id)
        };

        for character in others()
            .filter(|c| c.role.is_lead())
            .take(self.caps.max_protagonists)
        {
            fill.offer_character(character, ContextTier::Protagonist, &character.full_detail);
        }

        for character in others()
            .filter(|c| c.role == RoleTier::Major)
            .take(self.caps.max_major_characters)
        {
            fill.offer_character(character, ContextTier::Major, &character.full_detail);
        }

        for character in others().filter(|c| is_supporting(c.role)) {
            fill.offer_character(
                character,
                ContextTier::Supporting,
                &character.condensed_detail,
            );
        }

        fill.offer_elements(
            &snapshot.locations,
            self.caps.max_locations,
            ContextTier::Location,
            EntityKey::Location,
        );
        fill.offer_elements(
            &snapshot.power_systems,
            self.caps.max_power_systems,
            ContextTier::PowerSystem,
            EntityKey::PowerSystem,
        );
        fill.offer_elements(
            &snapshot.lore,
            self.caps.max_lore_entries,
            ContextTier::Lore,
            EntityKey::Lore,
        );
        fill.offer_elements(
            &snapshot.creatures,
            self.caps.max_creatures,
            ContextTier::Creature,
            EntityKey::Creature,
        );
        fill.offer_elements(
            &snapshot.arcs,
            self.caps.max_story_arcs,
            ContextTier::StoryProgression,
            EntityKey::Arc,
        );

        fill.packed
    }
}

/// Roles packed in condensed form. Leads and majors beyond their caps are
/// dropped rather than demoted, and minor characters are never packed
/// unless they hold the viewpoint.
fn is_supporting(role: RoleTier) -> bool {
    matches!(
        role,
        RoleTier::Supporting
            | RoleTier::Antagonist
            | RoleTier::LoveInterest
            | RoleTier::Mentor
            | RoleTier::Rival
    )
}

struct Fill<'e> {
    estimator: &'e dyn TokenEstimator,
    packed: PackedContext,
    used: usize,
}

impl<'e> Fill<'e> {
    fn new(estimator: &'e dyn TokenEstimator, available_tokens: usize) -> Self {
        Self {
            estimator,
            packed: PackedContext {
                available_tokens,
                ..Default::default()
            },
            used: 0,
        }
    }

    fn force(&mut self, entity: EntityKey, tier: ContextTier, text: &str) {
        let tokens = self.estimator.estimate(text);
        if self.used + tokens > self.packed.available_tokens {
            self.packed.pov_override = true;
        }
        self.push(entity, tier, text, tokens);
    }

    fn offer(&mut self, entity: EntityKey, tier: ContextTier, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let tokens = self.estimator.estimate(text);
        if self.used + tokens <= self.packed.available_tokens {
            self.push(entity, tier, text, tokens);
        } else {
            self.packed.skipped.push(SkippedBlock {
                entity,
                tier,
                tokens,
            });
        }
    }

    fn offer_character(&mut self, character: &CharacterRef, tier: ContextTier, text: &str) {
        self.offer(EntityKey::Character(character.id), tier, text);
    }

    fn offer_elements<Id: Copy>(
        &mut self,
        elements: &[WorldElementRef<Id>],
        cap: usize,
        tier: ContextTier,
        key: fn(Id) -> EntityKey,
    ) {
        for element in elements.iter().take(cap) {
            self.offer(key(element.id), tier, &element.detail);
        }
    }

    fn push(&mut self, entity: EntityKey, tier: ContextTier, text: &str, tokens: usize) {
        self.used += tokens;
        self.packed.blocks.push(ContextBlock {
            entity,
            tier,
            text: text.to_string(),
            tokens,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::token_estimator::WordRatioEstimator;
    use crate::domain::value_objects::{
        ArcId, ArcRef, LocationId, LocationRef, LoreId, LoreRef, PowerSystemId, PowerSystemRef,
        StoryId, StoryMetadata,
    };

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn character(name: &str, role: RoleTier, full_words: usize, condensed_words: usize) -> CharacterRef {
        CharacterRef {
            id: CharacterId::new(),
            name: name.to_string(),
            role,
            full_detail: words(full_words),
            condensed_detail: words(condensed_words),
        }
    }

    fn snapshot(characters: Vec<CharacterRef>) -> StorySnapshot {
        StorySnapshot {
            metadata: StoryMetadata {
                story_id: StoryId::new(),
                title: "Ashes of the Ninth Loop".to_string(),
                genre: "Dark Fantasy".to_string(),
                tone: "Tense".to_string(),
                writing_style: "Close third person".to_string(),
                themes: "Sacrifice".to_string(),
            },
            chapter_number: 2,
            characters,
            locations: vec![],
            creatures: vec![],
            power_systems: vec![],
            lore: vec![],
            arcs: vec![],
            previous_chapter_summary: Some(words(100)),
        }
    }

    fn location(n: usize) -> LocationRef {
        LocationRef {
            id: LocationId::new(),
            name: format!("Location {}", n),
            detail: words(20),
        }
    }

    fn pack(snapshot: &StorySnapshot, available: usize, pov: CharacterId) -> PackedContext {
        let estimator = WordRatioEstimator::default();
        ContextPacker::new(&estimator, TierCaps::default()).pack(
            snapshot,
            &ContextBudget::context_only(available),
            pov,
        )
    }

    #[test]
    fn test_protagonist_and_summary_packed_minors_excluded() {
        // ~800 tokens of protagonist detail, six minor characters
        let protagonist = character("Kaito", RoleTier::Protagonist, 534, 20);
        let pov = protagonist.id;
        let mut characters = vec![protagonist];
        for i in 0..6 {
            characters.push(character(&format!("Villager {}", i), RoleTier::Minor, 200, 20));
        }
        let snapshot = snapshot(characters);

        let packed = pack(&snapshot, 4096, pov);

        assert!(packed.contains(EntityKey::Character(pov)));
        assert!(packed.contains(EntityKey::PreviousChapter));
        assert_eq!(packed.blocks.len(), 2);
        for minor in snapshot.characters.iter().skip(1) {
            assert!(!packed.contains(EntityKey::Character(minor.id)));
        }
        assert!(packed.total_tokens() <= 4096);
        assert!(!packed.pov_override);
    }

    #[test]
    fn test_protagonist_cap_uses_insertion_order() {
        let pov = character("Narrator", RoleTier::Supporting, 10, 5);
        let pov_id = pov.id;
        let mut characters = vec![pov];
        for i in 0..5 {
            let role = if i % 2 == 0 {
                RoleTier::Protagonist
            } else {
                RoleTier::Deuteragonist
            };
            characters.push(character(&format!("Lead {}", i), role, 10, 5));
        }
        let snapshot = snapshot(characters);

        let packed = pack(&snapshot, 100_000, pov_id);

        let leads: Vec<_> = packed.blocks_in(ContextTier::Protagonist).collect();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].entity, EntityKey::Character(snapshot.characters[1].id));
        assert_eq!(leads[1].entity, EntityKey::Character(snapshot.characters[2].id));
        // Leads beyond the cap are not demoted to the condensed tier
        assert!(!packed.contains(EntityKey::Character(snapshot.characters[3].id)));
    }

    #[test]
    fn test_major_cap_and_supporting_condensed() {
        let pov = character("Rem", RoleTier::Protagonist, 10, 5);
        let pov_id = pov.id;
        let mut characters = vec![pov];
        for i in 0..6 {
            characters.push(character(&format!("Major {}", i), RoleTier::Major, 30, 5));
        }
        let mentor = character("Roswaal", RoleTier::Mentor, 300, 7);
        characters.push(mentor.clone());
        let snapshot = snapshot(characters);

        let packed = pack(&snapshot, 100_000, pov_id);

        assert_eq!(packed.blocks_in(ContextTier::Major).count(), 4);
        let supporting: Vec<_> = packed.blocks_in(ContextTier::Supporting).collect();
        assert_eq!(supporting.len(), 1);
        assert_eq!(supporting[0].text, mentor.condensed_detail);
    }

    #[test]
    fn test_pov_appears_once_even_when_minor() {
        let pov = character("Stable Boy", RoleTier::Minor, 40, 5);
        let pov_id = pov.id;
        let snapshot = snapshot(vec![pov]);

        let packed = pack(&snapshot, 10_000, pov_id);

        let pov_blocks: Vec<_> = packed
            .blocks
            .iter()
            .filter(|b| b.entity == EntityKey::Character(pov_id))
            .collect();
        assert_eq!(pov_blocks.len(), 1);
        assert_eq!(pov_blocks[0].tier, ContextTier::PointOfView);
    }

    #[test]
    fn test_pov_override_is_the_only_budget_violation() {
        let pov = character("Emilia", RoleTier::Protagonist, 1000, 5);
        let pov_id = pov.id;
        let snapshot = snapshot(vec![pov, character("Puck", RoleTier::Major, 10, 5)]);

        let packed = pack(&snapshot, 100, pov_id);

        assert!(packed.pov_override);
        assert!(!packed.within_budget());
        assert_eq!(packed.blocks.len(), 1);
        assert_eq!(packed.blocks[0].tier, ContextTier::PointOfView);
        assert_eq!(packed.skipped.len(), 2);
    }

    #[test]
    fn test_greedy_fill_continues_past_skipped_candidate() {
        let pov = character("Subaru", RoleTier::Protagonist, 10, 5);
        let pov_id = pov.id;
        // 10 words pov = 15 tokens, summary 100 words = 150 tokens
        let big_major = character("Reinhard", RoleTier::Major, 400, 5);
        let small_major = character("Felix", RoleTier::Major, 10, 5);
        let mut snapshot = snapshot(vec![pov, big_major.clone(), small_major.clone()]);
        snapshot.locations = vec![location(1)];

        let packed = pack(&snapshot, 250, pov_id);

        assert!(!packed.contains(EntityKey::Character(big_major.id)));
        assert!(packed.contains(EntityKey::Character(small_major.id)));
        assert!(packed.contains(EntityKey::Location(snapshot.locations[0].id)));
        assert_eq!(packed.skipped.len(), 1);
        assert_eq!(packed.skipped[0].entity, EntityKey::Character(big_major.id));
        assert!(packed.within_budget());
    }

    #[test]
    fn test_world_element_caps() {
        let pov = character("Shirou", RoleTier::Protagonist, 10, 5);
        let pov_id = pov.id;
        let mut snapshot = snapshot(vec![pov]);
        snapshot.locations = (0..8).map(location).collect();
        snapshot.power_systems = (0..5)
            .map(|i| PowerSystemRef {
                id: PowerSystemId::new(),
                name: format!("System {}", i),
                detail: words(10),
            })
            .collect();
        snapshot.lore = (0..5)
            .map(|i| LoreRef {
                id: LoreId::new(),
                name: format!("Lore {}", i),
                detail: words(10),
            })
            .collect();

        let packed = pack(&snapshot, 100_000, pov_id);

        assert_eq!(packed.blocks_in(ContextTier::Location).count(), 5);
        assert_eq!(packed.blocks_in(ContextTier::PowerSystem).count(), 3);
        assert_eq!(packed.blocks_in(ContextTier::Lore).count(), 3);
        let first_five: Vec<_> = snapshot.locations[..5]
            .iter()
            .map(|l| EntityKey::Location(l.id))
            .collect();
        let packed_locations: Vec<_> = packed
            .blocks_in(ContextTier::Location)
            .map(|b| b.entity)
            .collect();
        assert_eq!(packed_locations, first_five);
    }

    #[test]
    fn test_packing_is_deterministic() {
        let pov = character("Saber", RoleTier::Deuteragonist, 120, 5);
        let pov_id = pov.id;
        let mut characters = vec![pov];
        for i in 0..10 {
            characters.push(character(&format!("C{}", i), RoleTier::Rival, 50, 12));
        }
        let mut snapshot = snapshot(characters);
        snapshot.locations = (0..6).map(location).collect();

        let first = pack(&snapshot, 600, pov_id);
        let second = pack(&snapshot, 600, pov_id);

        assert_eq!(first, second);
    }

    #[test]
    fn test_budget_respected_across_sizes() {
        let pov = character("Archer", RoleTier::Protagonist, 30, 5);
        let pov_id = pov.id;
        let mut characters = vec![pov];
        for i in 0..12 {
            let role = RoleTier::all()[i % 9];
            characters.push(character(&format!("C{}", i), role, 20 + i * 7, 3 + i));
        }
        let mut snapshot = snapshot(characters);
        snapshot.locations = (0..7).map(location).collect();

        for available in (45..2_000).step_by(37) {
            let packed = pack(&snapshot, available, pov_id);
            assert!(!packed.pov_override);
            assert!(packed.total_tokens() <= available, "over budget at {}", available);
        }
    }

    #[test]
    fn test_missing_summary_and_unknown_pov() {
        let mut snapshot = snapshot(vec![character("Lancer", RoleTier::Major, 10, 5)]);
        snapshot.previous_chapter_summary = Some("   ".to_string());

        let packed = pack(&snapshot, 1_000, CharacterId::new());

        assert!(!packed.contains(EntityKey::PreviousChapter));
        assert_eq!(packed.blocks_in(ContextTier::PointOfView).count(), 0);
        assert_eq!(packed.blocks_in(ContextTier::Major).count(), 1);
    }

    #[test]
    fn test_story_progression_is_the_last_tier() {
        let pov = character("Aria", RoleTier::Protagonist, 10, 5);
        let pov_id = pov.id;
        let mut snapshot = snapshot(vec![pov]);
        snapshot.locations = vec![location(1)];
        snapshot.arcs = (1..=3)
            .map(|n| ArcRef {
                id: ArcId::new(),
                name: format!("Arc {}", n),
                detail: words(30),
            })
            .collect();

        let packed = pack(&snapshot, 100_000, pov_id);
        let arcs: Vec<_> = packed.blocks_in(ContextTier::StoryProgression).collect();
        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].entity, EntityKey::Arc(snapshot.arcs[0].id));
        assert_eq!(packed.blocks.last().unwrap().tier, ContextTier::StoryProgression);

        // 15 + 150 + 30 tokens leave no room for a 45 token arc
        let tight = pack(&snapshot, 200, pov_id);
        assert_eq!(tight.blocks_in(ContextTier::StoryProgression).count(), 0);
        assert!(tight.contains(EntityKey::Location(snapshot.locations[0].id)));
    }
}
