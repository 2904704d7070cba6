//! Token estimation without access to the model's tokenizer
//!
//! Estimates are word based and rounded up, which tends to overestimate for
//! Llama-family tokenizers on English prose. Overestimating is the safe side
//! for budget management. The trait is the seam for an exact tokenizer.

use super::prose::word_count;

/// Estimates how many model tokens a piece of text costs
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;

    /// Tokens needed for the model to produce `words` words of output
    fn tokens_for_words(&self, words: usize) -> usize;
}

/// Fixed words-to-tokens ratio estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordRatioEstimator {
    tokens_per_word: f64,
}

impl WordRatioEstimator {
    pub const DEFAULT_TOKENS_PER_WORD: f64 = 1.5;

    /// Non-positive or non-finite ratios fall back to the default
    pub fn new(tokens_per_word: f64) -> Self {
        let tokens_per_word = if tokens_per_word.is_finite() && tokens_per_word > 0.0 {
            tokens_per_word
        } else {
            Self::DEFAULT_TOKENS_PER_WORD
        };
        Self { tokens_per_word }
    }

    pub fn tokens_per_word(&self) -> f64 {
        self.tokens_per_word
    }
}

impl Default for WordRatioEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOKENS_PER_WORD)
    }
}

impl TokenEstimator for WordRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        self.tokens_for_words(word_count(text))
    }

    fn tokens_for_words(&self, words: usize) -> usize {
        (words as f64 * self.tokens_per_word).ceil() as usize
    }
}
