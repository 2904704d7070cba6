//! Response validation - classifies a raw model response against its target

use crate::domain::value_objects::{ContextTier, GenerationStatus};

use super::prose::{section_header, word_count, TASK_SECTION};

/// Markers the model is told to stop at, stripped from the end of responses
pub const STOP_MARKERS: [&str; 2] = ["</chapter>", "[END]"];

/// Below this share of word-like tokens a response is not prose
const MIN_ALPHABETIC_RATIO: f64 = 0.5;

/// A cleaned and classified draft
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub text: String,
    pub word_count: usize,
    pub status: GenerationStatus,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseValidator {
    tolerance: f64,
    empty_threshold_words: usize,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new(0.10, 20)
    }
}

impl ResponseValidator {
    pub fn new(tolerance: f64, empty_threshold_words: usize) -> Self {
        Self {
            tolerance: tolerance.clamp(0.0, 0.99),
            empty_threshold_words,
        }
    }

    /// Smallest word count classified as `Complete` for `target`
    pub fn minimum_words(&self, target: u32) -> usize {
        // Absorb float noise so 3000 * 0.9 stays 2700
        let minimum = f64::from(target) * (1.0 - self.tolerance) - 1e-6;
        minimum.ceil().max(0.0) as usize
    }

    pub fn validate(&self, raw: &str, target_word_count: u32) -> ValidatedDraft {
        let text = clean(raw);
        let words = word_count(&text);

        if words <= self.empty_threshold_words {
            return ValidatedDraft {
                text,
                word_count: words,
                status: GenerationStatus::Empty,
                detail: Some(format!(
                    "The model returned {} usable words, nothing to keep",
                    words
                )),
            };
        }

        if let Some(reason) = malformed_reason(&text) {
            return ValidatedDraft {
                text,
                word_count: words,
                status: GenerationStatus::Malformed,
                detail: Some(reason.to_string()),
            };
        }

        let minimum = self.minimum_words(target_word_count);
        if words >= minimum {
            ValidatedDraft {
                text,
                word_count: words,
                status: GenerationStatus::Complete,
                detail: None,
            }
        } else {
            ValidatedDraft {
                text,
                word_count: words,
                status: GenerationStatus::Short,
                detail: Some(format!(
                    "Draft has {} words, target was {} (minimum {})",
                    words, target_word_count, minimum
                )),
            }
        }
    }
}

/// Strips reasoning blocks, chapter tags and trailing stop markers
pub fn clean(raw: &str) -> String {
    let text = strip_reasoning(raw);
    let body = text.trim_start();
    let body = body.strip_prefix("<chapter>").unwrap_or(body);

    let mut end = body.trim_end();
    while let Some(rest) = STOP_MARKERS
        .iter()
        .find_map(|marker| end.strip_suffix(marker))
    {
        end = rest.trim_end();
    }
    end.trim_start().to_string()
}

fn strip_reasoning(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            // Unclosed reasoning runs to the end of the response
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn malformed_reason(text: &str) -> Option<&'static str> {
    let trimmed = text.trim();
    if trimmed.starts_with('{')
        && trimmed.ends_with('}')
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Some("The model returned a JSON object instead of prose");
    }

    if echoes_scaffolding(trimmed) {
        return Some("The model repeated the prompt structure instead of writing the chapter");
    }

    let tokens = trimmed.split_whitespace().count();
    let wordlike = trimmed
        .split_whitespace()
        .filter(|t| t.chars().any(char::is_alphabetic))
        .count();
    if (wordlike as f64) < tokens as f64 * MIN_ALPHABETIC_RATIO {
        return Some("The response is mostly non-alphabetic and does not read as prose");
    }

    None
}

fn echoes_scaffolding(text: &str) -> bool {
    let headers: Vec<String> = ContextTier::all_by_priority()
        .iter()
        .map(|tier| section_header(tier.heading()))
        .chain(std::iter::once(section_header(TASK_SECTION)))
        .collect();
    text.lines()
        .map(str::trim)
        .any(|line| headers.iter().any(|h| h == line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prose(words: usize) -> String {
        let sentence = ["The", "rain", "fell", "on", "the", "ruined", "chapel", "again."];
        (0..words)
            .map(|i| sentence[i % sentence.len()])
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_classification_against_target() {
        let validator = ResponseValidator::default();

        let complete = validator.validate(&prose(2950), 3000);
        assert_eq!(complete.status, GenerationStatus::Complete);
        assert_eq!(complete.word_count, 2950);
        assert!(complete.detail.is_none());

        let short = validator.validate(&prose(1500), 3000);
        assert_eq!(short.status, GenerationStatus::Short);

        let empty = validator.validate("", 3000);
        assert_eq!(empty.status, GenerationStatus::Empty);
        assert_eq!(empty.word_count, 0);
    }

    #[test]
    fn test_tolerance_boundary() {
        let validator = ResponseValidator::new(0.10, 20);
        assert_eq!(validator.minimum_words(3000), 2700);
        assert_eq!(
            validator.validate(&prose(2700), 3000).status,
            GenerationStatus::Complete
        );
        assert_eq!(
            validator.validate(&prose(2699), 3000).status,
            GenerationStatus::Short
        );
        // Longer than asked is still complete
        assert_eq!(
            validator.validate(&prose(4000), 3000).status,
            GenerationStatus::Complete
        );
    }

    #[test]
    fn test_near_empty_threshold() {
        let validator = ResponseValidator::new(0.10, 20);
        assert_eq!(
            validator.validate(&prose(12), 3000).status,
            GenerationStatus::Empty
        );
        let strict = ResponseValidator::new(0.10, 0);
        assert_eq!(
            strict.validate(&prose(12), 3000).status,
            GenerationStatus::Short
        );
    }

    #[test]
    fn test_reasoning_and_stop_markers_are_removed() {
        let raw = format!(
            "<think>The user wants a duel scene.</think>\n\n{}\n\n</chapter>\n[END]",
            prose(40)
        );
        let cleaned = clean(&raw);
        assert_eq!(cleaned, prose(40));
        assert!(!cleaned.contains("think"));
    }

    #[test]
    fn test_unclosed_reasoning_is_dropped() {
        assert_eq!(clean("Opening line. <think>never finished"), "Opening line.");
    }

    #[test]
    fn test_json_object_is_malformed() {
        let raw = format!("{{\"chapter\": \"{}\"}}", prose(60));
        let draft = ResponseValidator::default().validate(&raw, 3000);
        assert_eq!(draft.status, GenerationStatus::Malformed);
    }

    #[test]
    fn test_scaffolding_echo_is_malformed() {
        let raw = format!(
            "{}\n{}\n{}",
            section_header(ContextTier::PointOfView.heading()),
            prose(60),
            section_header(TASK_SECTION)
        );
        let draft = ResponseValidator::default().validate(&raw, 3000);
        assert_eq!(draft.status, GenerationStatus::Malformed);
        assert!(draft.detail.is_some());
    }

    #[test]
    fn test_symbol_noise_is_malformed() {
        let raw = (0..80).map(|i| format!("{}#", i)).collect::<Vec<_>>().join(" ");
        let draft = ResponseValidator::default().validate(&raw, 3000);
        assert_eq!(draft.status, GenerationStatus::Malformed);
    }

    #[test]
    fn test_dialogue_with_punctuation_is_prose() {
        let raw = format!("\"Again?\" - she whispered. ... {}", prose(300));
        let draft = ResponseValidator::default().validate(&raw, 3000);
        assert_eq!(draft.status, GenerationStatus::Short);
    }
}
