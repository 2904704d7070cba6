//! Story and world-building API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::existing_story;
use crate::application::dto::{
    CharacterResponseDto, CreateCharacterRequestDto, CreateCreatureRequestDto,
    CreateLocationRequestDto, CreateLoreRequestDto, CreatePowerSystemRequestDto,
    CreateStoryRequestDto, CreatureResponseDto, LocationResponseDto, LoreResponseDto,
    PowerSystemResponseDto, StoryResponseDto,
};
use crate::application::services::{CreateCharacterRequest, StoryService};
use crate::infrastructure::state::AppState;

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Writes only fail on input the service rejects once the story is known
fn rejected(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

/// List all stories
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoryResponseDto>>, (StatusCode, String)> {
    let stories = state.story_service.list_stories().await.map_err(internal)?;
    Ok(Json(stories.into_iter().map(StoryResponseDto::from).collect()))
}

/// Create a new story
pub async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStoryRequestDto>,
) -> Result<(StatusCode, Json<StoryResponseDto>), (StatusCode, String)> {
    let story = state
        .story_service
        .create_story(req.into())
        .await
        .map_err(rejected)?;
    Ok((StatusCode::CREATED, Json(StoryResponseDto::from(story))))
}

/// Get a story by ID
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoryResponseDto>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let story = state
        .story_service
        .get_story(story_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Story not found".to_string()))?;
    Ok(Json(StoryResponseDto::from(story)))
}

pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CharacterResponseDto>>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let characters = state
        .story_service
        .list_characters(story_id)
        .await
        .map_err(internal)?;
    Ok(Json(characters.into_iter().map(CharacterResponseDto::from).collect()))
}

pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateCharacterRequestDto>,
) -> Result<(StatusCode, Json<CharacterResponseDto>), (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let request = CreateCharacterRequest::try_from(req)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let character = state
        .story_service
        .add_character(story_id, request)
        .await
        .map_err(rejected)?;
    Ok((StatusCode::CREATED, Json(CharacterResponseDto::from(character))))
}

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LocationResponseDto>>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let locations = state
        .story_service
        .list_locations(story_id)
        .await
        .map_err(internal)?;
    Ok(Json(locations.into_iter().map(LocationResponseDto::from).collect()))
}

pub async fn create_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateLocationRequestDto>,
) -> Result<(StatusCode, Json<LocationResponseDto>), (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let location = state
        .story_service
        .add_location(story_id, req.into())
        .await
        .map_err(rejected)?;
    Ok((StatusCode::CREATED, Json(LocationResponseDto::from(location))))
}

pub async fn list_creatures(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CreatureResponseDto>>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let creatures = state
        .story_service
        .list_creatures(story_id)
        .await
        .map_err(internal)?;
    Ok(Json(creatures.into_iter().map(CreatureResponseDto::from).collect()))
}

pub async fn create_creature(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateCreatureRequestDto>,
) -> Result<(StatusCode, Json<CreatureResponseDto>), (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let creature = state
        .story_service
        .add_creature(story_id, req.into())
        .await
        .map_err(rejected)?;
    Ok((StatusCode::CREATED, Json(CreatureResponseDto::from(creature))))
}

pub async fn list_power_systems(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PowerSystemResponseDto>>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let systems = state
        .story_service
        .list_power_systems(story_id)
        .await
        .map_err(internal)?;
    Ok(Json(systems.into_iter().map(PowerSystemResponseDto::from).collect()))
}

pub async fn create_power_system(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreatePowerSystemRequestDto>,
) -> Result<(StatusCode, Json<PowerSystemResponseDto>), (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let system = state
        .story_service
        .add_power_system(story_id, req.into())
        .await
        .map_err(rejected)?;
    Ok((StatusCode::CREATED, Json(PowerSystemResponseDto::from(system))))
}

pub async fn list_lore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LoreResponseDto>>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let lore = state
        .story_service
        .list_lore(story_id)
        .await
        .map_err(internal)?;
    Ok(Json(lore.into_iter().map(LoreResponseDto::from).collect()))
}

pub async fn create_lore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateLoreRequestDto>,
) -> Result<(StatusCode, Json<LoreResponseDto>), (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let entry = state
        .story_service
        .add_lore(story_id, req.into())
        .await
        .map_err(rejected)?;
    Ok((StatusCode::CREATED, Json(LoreResponseDto::from(entry))))
}
