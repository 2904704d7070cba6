//! Generation settings value object
//!
//! Stored in SQLite as key-value pairs and exchanged as JSON through the
//! settings API.

use serde::{Deserialize, Serialize};

use super::ContextBudget;

/// All runtime-tunable knobs of the context packer, estimator and validator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationSettings {
    // Budget
    pub model_context_tokens: usize,
    pub scaffolding_reserve_tokens: usize,
    pub tokens_per_word: f64,

    // Tier caps
    pub max_protagonists: usize,
    pub max_major_characters: usize,
    pub max_locations: usize,
    pub max_power_systems: usize,
    pub max_lore_entries: usize,
    pub max_creatures: usize,
    #[serde(default = "default_max_story_arcs")]
    pub max_story_arcs: usize,

    // Rendering
    pub condensed_detail_words: usize,

    // Validation
    pub length_tolerance: f64,
    pub empty_threshold_words: usize,

    // Request defaults
    pub default_temperature: f32,
    pub default_target_word_count: u32,
    pub min_target_word_count: u32,
    pub max_target_word_count: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model_context_tokens: 16_384,
            scaffolding_reserve_tokens: 1_024,
            tokens_per_word: 1.5,
            max_protagonists: 2,
            max_major_characters: 4,
            max_locations: 5,
            max_power_systems: 3,
            max_lore_entries: 3,
            max_creatures: 3,
            max_story_arcs: default_max_story_arcs(),
            condensed_detail_words: 40,
            length_tolerance: 0.10,
            empty_threshold_words: 20,
            default_temperature: 0.85,
            default_target_word_count: 3_000,
            min_target_word_count: 500,
            max_target_word_count: 8_000,
        }
    }
}

impl GenerationSettings {
    /// Load from environment variables, using defaults for missing values
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_context_tokens: env_or("QUILLFORGE_MODEL_CONTEXT_TOKENS", defaults.model_context_tokens),
            scaffolding_reserve_tokens: env_or("QUILLFORGE_SCAFFOLDING_RESERVE_TOKENS", defaults.scaffolding_reserve_tokens),
            tokens_per_word: env_or("QUILLFORGE_TOKENS_PER_WORD", defaults.tokens_per_word),
            max_protagonists: env_or("QUILLFORGE_MAX_PROTAGONISTS", defaults.max_protagonists),
            max_major_characters: env_or("QUILLFORGE_MAX_MAJOR_CHARACTERS", defaults.max_major_characters),
            max_locations: env_or("QUILLFORGE_MAX_LOCATIONS", defaults.max_locations),
            max_power_systems: env_or("QUILLFORGE_MAX_POWER_SYSTEMS", defaults.max_power_systems),
            max_lore_entries: env_or("QUILLFORGE_MAX_LORE_ENTRIES", defaults.max_lore_entries),
            max_creatures: env_or("QUILLFORGE_MAX_CREATURES", defaults.max_creatures),
            max_story_arcs: env_or("QUILLFORGE_MAX_STORY_ARCS", defaults.max_story_arcs),
            condensed_detail_words: env_or("QUILLFORGE_CONDENSED_DETAIL_WORDS", defaults.condensed_detail_words),
            length_tolerance: env_or("QUILLFORGE_LENGTH_TOLERANCE", defaults.length_tolerance),
            empty_threshold_words: env_or("QUILLFORGE_EMPTY_THRESHOLD_WORDS", defaults.empty_threshold_words),
            default_temperature: env_or("QUILLFORGE_DEFAULT_TEMPERATURE", defaults.default_temperature),
            default_target_word_count: env_or("QUILLFORGE_DEFAULT_WORD_COUNT", defaults.default_target_word_count),
            min_target_word_count: env_or("QUILLFORGE_MIN_WORD_COUNT", defaults.min_target_word_count),
            max_target_word_count: env_or("QUILLFORGE_MAX_WORD_COUNT", defaults.max_target_word_count),
        }
    }

    /// Budget for a chapter whose response needs `response_tokens`
    ///
    /// `scaffolding_tokens` is the measured size of everything in the request
    /// that is not packed context. The configured reserve is a floor; a
    /// larger measurement replaces it.
    pub fn budget_for(&self, scaffolding_tokens: usize, response_tokens: usize) -> ContextBudget {
        ContextBudget::new(
            self.model_context_tokens,
            self.scaffolding_reserve_tokens.max(scaffolding_tokens),
            response_tokens,
        )
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model_context_tokens == 0 {
            return Err("Model context must be greater than 0".to_string());
        }
        if self.scaffolding_reserve_tokens >= self.model_context_tokens {
            return Err(format!(
                "Scaffolding reserve ({}) must be smaller than the model context ({})",
                self.scaffolding_reserve_tokens, self.model_context_tokens
            ));
        }
        if !(self.tokens_per_word.is_finite() && self.tokens_per_word > 0.0) {
            return Err("Tokens per word must be a positive number".to_string());
        }
        if !(0.0..1.0).contains(&self.length_tolerance) {
            return Err("Length tolerance must be in [0, 1)".to_string());
        }
        if self.min_target_word_count == 0 || self.min_target_word_count > self.max_target_word_count {
            return Err(format!(
                "Invalid word count range {}..={}",
                self.min_target_word_count, self.max_target_word_count
            ));
        }
        Ok(())
    }
}

fn default_max_story_arcs() -> usize {
    2
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = GenerationSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tokens_per_word, 1.5);
        assert_eq!(settings.max_protagonists, 2);
        assert_eq!(settings.max_major_characters, 4);
    }

    #[test]
    fn test_validate_rejects_oversized_reserve() {
        let settings = GenerationSettings {
            scaffolding_reserve_tokens: 20_000,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let settings = GenerationSettings {
            length_tolerance: 1.5,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_budget_for_keeps_configured_reserve_as_floor() {
        let settings = GenerationSettings::default();
        let budget = settings.budget_for(300, 4_500);
        assert_eq!(budget.scaffolding_reserve_tokens, 1_024);
        assert_eq!(budget.available_for_context(), 16_384 - 1_024 - 4_500);
    }

    #[test]
    fn test_budget_for_grows_reserve_with_measured_scaffolding() {
        let settings = GenerationSettings::default();
        let budget = settings.budget_for(9_400, 4_500);
        assert_eq!(budget.scaffolding_reserve_tokens, 9_400);
        assert_eq!(budget.available_for_context(), 16_384 - 9_400 - 4_500);
    }

    #[test]
    fn test_missing_arc_cap_deserializes_to_default() {
        let mut fields = serde_json::to_value(GenerationSettings::default()).unwrap();
        fields.as_object_mut().unwrap().remove("max_story_arcs");
        let settings: GenerationSettings = serde_json::from_value(fields).unwrap();
        assert_eq!(settings.max_story_arcs, 2);
    }
}
