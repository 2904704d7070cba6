//! Cast and world-building DTOs

use serde::{Deserialize, Serialize};

use crate::application::services::{
    CreateCharacterRequest, CreateCreatureRequest, CreateLocationRequest, CreateLoreRequest,
    CreatePowerSystemRequest,
};
use crate::domain::entities::{Character, Creature, Location, LoreEntry, PowerSystem};
use crate::domain::value_objects::{RoleTier, UnknownRoleError};

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequestDto {
    pub name: String,
    /// Free-form role name, e.g. "protagonist" or "love interest"
    pub role: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub appearance: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub abilities: Option<String>,
    #[serde(default)]
    pub motivations: Option<String>,
    #[serde(default)]
    pub relationships: Option<String>,
    #[serde(default)]
    pub character_arc: Option<String>,
    #[serde(default)]
    pub voice_style: Option<String>,
}

impl TryFrom<CreateCharacterRequestDto> for CreateCharacterRequest {
    type Error = UnknownRoleError;

    fn try_from(dto: CreateCharacterRequestDto) -> Result<Self, Self::Error> {
        Ok(Self {
            role: dto.role.parse::<RoleTier>()?,
            name: dto.name,
            age: dto.age,
            gender: dto.gender,
            appearance: dto.appearance,
            personality: dto.personality,
            background: dto.background,
            abilities: dto.abilities,
            motivations: dto.motivations,
            relationships: dto.relationships,
            character_arc: dto.character_arc,
            voice_style: dto.voice_style,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterResponseDto {
    pub id: String,
    pub story_id: String,
    pub name: String,
    pub role: RoleTier,
    pub age: Option<u32>,
    pub gender: String,
    pub appearance: String,
    pub personality: String,
    pub background: String,
    pub abilities: String,
    pub motivations: String,
    pub relationships: String,
    pub character_arc: String,
    pub voice_style: String,
    pub status: String,
}

impl From<Character> for CharacterResponseDto {
    fn from(c: Character) -> Self {
        Self {
            id: c.id.to_string(),
            story_id: c.story_id.to_string(),
            name: c.name,
            role: c.role,
            age: c.age,
            gender: c.gender,
            appearance: c.appearance,
            personality: c.personality,
            background: c.background,
            abilities: c.abilities,
            motivations: c.motivations,
            relationships: c.relationships,
            character_arc: c.character_arc,
            voice_style: c.voice_style,
            status: c.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequestDto {
    pub name: String,
    pub location_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub culture: Option<String>,
}

impl From<CreateLocationRequestDto> for CreateLocationRequest {
    fn from(dto: CreateLocationRequestDto) -> Self {
        Self {
            name: dto.name,
            location_type: dto.location_type,
            description: dto.description,
            culture: dto.culture,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LocationResponseDto {
    pub id: String,
    pub story_id: String,
    pub name: String,
    pub location_type: String,
    pub description: String,
    pub culture: String,
}

impl From<Location> for LocationResponseDto {
    fn from(l: Location) -> Self {
        Self {
            id: l.id.to_string(),
            story_id: l.story_id.to_string(),
            name: l.name,
            location_type: l.location_type,
            description: l.description,
            culture: l.culture,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCreatureRequestDto {
    pub name: String,
    pub creature_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub habitat: Option<String>,
    #[serde(default)]
    pub abilities: Option<String>,
    #[serde(default)]
    pub danger_level: Option<String>,
}

impl From<CreateCreatureRequestDto> for CreateCreatureRequest {
    fn from(dto: CreateCreatureRequestDto) -> Self {
        Self {
            name: dto.name,
            creature_type: dto.creature_type,
            description: dto.description,
            habitat: dto.habitat,
            abilities: dto.abilities,
            danger_level: dto.danger_level,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatureResponseDto {
    pub id: String,
    pub story_id: String,
    pub name: String,
    pub creature_type: String,
    pub description: String,
    pub habitat: String,
    pub abilities: String,
    pub danger_level: String,
}

impl From<Creature> for CreatureResponseDto {
    fn from(c: Creature) -> Self {
        Self {
            id: c.id.to_string(),
            story_id: c.story_id.to_string(),
            name: c.name,
            creature_type: c.creature_type,
            description: c.description,
            habitat: c.habitat,
            abilities: c.abilities,
            danger_level: c.danger_level,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePowerSystemRequestDto {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(default)]
    pub limitations: Option<String>,
}

impl From<CreatePowerSystemRequestDto> for CreatePowerSystemRequest {
    fn from(dto: CreatePowerSystemRequestDto) -> Self {
        Self {
            name: dto.name,
            description: dto.description,
            rules: dto.rules,
            limitations: dto.limitations,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PowerSystemResponseDto {
    pub id: String,
    pub story_id: String,
    pub name: String,
    pub description: String,
    pub rules: String,
    pub limitations: String,
}

impl From<PowerSystem> for PowerSystemResponseDto {
    fn from(p: PowerSystem) -> Self {
        Self {
            id: p.id.to_string(),
            story_id: p.story_id.to_string(),
            name: p.name,
            description: p.description,
            rules: p.rules,
            limitations: p.limitations,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateLoreRequestDto {
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl From<CreateLoreRequestDto> for CreateLoreRequest {
    fn from(dto: CreateLoreRequestDto) -> Self {
        Self {
            category: dto.category,
            title: dto.title,
            content: dto.content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoreResponseDto {
    pub id: String,
    pub story_id: String,
    pub category: String,
    pub title: String,
    pub content: String,
}

impl From<LoreEntry> for LoreResponseDto {
    fn from(l: LoreEntry) -> Self {
        Self {
            id: l.id.to_string(),
            story_id: l.story_id.to_string(),
            category: l.category,
            title: l.title,
            content: l.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_role_is_parsed() {
        let dto: CreateCharacterRequestDto =
            serde_json::from_str(r#"{"name": "Beatrice", "role": "Mentor"}"#).unwrap();
        let request = CreateCharacterRequest::try_from(dto).unwrap();
        assert_eq!(request.role, RoleTier::Mentor);
        assert!(request.age.is_none());
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let dto: CreateCharacterRequestDto =
            serde_json::from_str(r#"{"name": "Otto", "role": "merchant"}"#).unwrap();
        assert!(CreateCharacterRequest::try_from(dto).is_err());
    }
}
