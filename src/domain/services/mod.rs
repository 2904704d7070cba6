//! Domain services - Pure operations over domain values
//!
//! Nothing in here performs I/O. Everything takes an immutable snapshot or
//! plain text and returns a new value.

pub mod context_packer;
pub mod prose;
pub mod response_validator;
pub mod sections;
pub mod token_estimator;

pub use context_packer::{ContextPacker, TierCaps};
pub use prose::{closing_sentences, leading_sentences, section_header, word_count, TASK_SECTION};
pub use sections::{extract_field, extract_section};
pub use response_validator::{ResponseValidator, ValidatedDraft, STOP_MARKERS};
pub use token_estimator::{TokenEstimator, WordRatioEstimator};
