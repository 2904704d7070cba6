//! Narrative role of a character
//!
//! The role tier is what the context packer uses to decide whether a
//! character is sent to the model at full detail, in condensed form, or not
//! at all. Roles arrive from the API as free text and are validated here,
//! so nothing downstream has to deal with unknown role names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleTier {
    Protagonist,
    Deuteragonist,
    Major,
    Supporting,
    Minor,
    Antagonist,
    LoveInterest,
    Mentor,
    Rival,
}

impl RoleTier {
    pub fn all() -> [Self; 9] {
        [
            Self::Protagonist,
            Self::Deuteragonist,
            Self::Major,
            Self::Supporting,
            Self::Minor,
            Self::Antagonist,
            Self::LoveInterest,
            Self::Mentor,
            Self::Rival,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protagonist => "protagonist",
            Self::Deuteragonist => "deuteragonist",
            Self::Major => "major",
            Self::Supporting => "supporting",
            Self::Minor => "minor",
            Self::Antagonist => "antagonist",
            Self::LoveInterest => "love-interest",
            Self::Mentor => "mentor",
            Self::Rival => "rival",
        }
    }

    /// Human-readable label used when rendering character blocks
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Protagonist => "Protagonist",
            Self::Deuteragonist => "Deuteragonist",
            Self::Major => "Major Character",
            Self::Supporting => "Supporting Character",
            Self::Minor => "Minor Character",
            Self::Antagonist => "Antagonist",
            Self::LoveInterest => "Love Interest",
            Self::Mentor => "Mentor",
            Self::Rival => "Rival",
        }
    }

    /// Lead roles are packed at full detail ahead of everyone else
    pub fn is_lead(&self) -> bool {
        matches!(self, Self::Protagonist | Self::Deuteragonist)
    }
}

impl fmt::Display for RoleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown character role: {0}")]
pub struct UnknownRoleError(pub String);

impl FromStr for RoleTier {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
        match normalized.as_str() {
            "protagonist" | "main-character" => Ok(Self::Protagonist),
            "deuteragonist" => Ok(Self::Deuteragonist),
            "major" => Ok(Self::Major),
            "supporting" => Ok(Self::Supporting),
            "minor" => Ok(Self::Minor),
            "antagonist" | "villain" => Ok(Self::Antagonist),
            "love-interest" => Ok(Self::LoveInterest),
            "mentor" => Ok(Self::Mentor),
            "rival" => Ok(Self::Rival),
            _ => Err(UnknownRoleError(s.to_string())),
        }
    }
}
