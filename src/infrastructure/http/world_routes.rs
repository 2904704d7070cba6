//! Story arc and model-assisted world-building routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::existing_story;
use crate::application::dto::{
    ArcResponseDto, CreateArcRequestDto, ExpandLocationRequestDto, ExpandProfileRequestDto,
    GenerateLoreRequestDto, GeneratePowerSystemRequestDto, SynopsisAnalysisRequestDto,
    UpdateArcProgressionRequestDto, WorldGenerationResponseDto,
};
use crate::application::ports::outbound::LlmError;
use crate::application::services::{StoryService, WorldBuildingError, WorldBuildingResult};
use crate::domain::value_objects::{
    ArcId, CharacterId, CreatureId, LocationDetails, LocationId, PowerSystemDraft,
    ProfileSuggestions, StructureSuggestions,
};
use crate::infrastructure::state::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn world_error(e: WorldBuildingError) -> (StatusCode, String) {
    let status = match &e {
        WorldBuildingError::Llm(LlmError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
        WorldBuildingError::Llm(LlmError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        WorldBuildingError::Llm(LlmError::Protocol(_)) | WorldBuildingError::EmptyResult => {
            StatusCode::BAD_GATEWAY
        }
        WorldBuildingError::StoryNotFound(_) | WorldBuildingError::NotFound(_) => {
            StatusCode::NOT_FOUND
        }
        WorldBuildingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        WorldBuildingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

fn invalid_id(kind: &str) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("Invalid {} ID", kind))
}

pub async fn list_arcs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Vec<ArcResponseDto>> {
    let story_id = existing_story(&state, &id).await?;
    let arcs = state
        .story_service
        .list_arcs(story_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(arcs.into_iter().map(ArcResponseDto::from).collect()))
}

pub async fn create_arc(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CreateArcRequestDto>,
) -> Result<(StatusCode, Json<ArcResponseDto>), (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let arc = state
        .story_service
        .add_arc(story_id, req.into())
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok((StatusCode::CREATED, Json(ArcResponseDto::from(arc))))
}

/// Replace where an arc's threads stand
pub async fn update_arc_progression(
    State(state): State<Arc<AppState>>,
    Path((id, arc_id)): Path<(String, String)>,
    Json(req): Json<UpdateArcProgressionRequestDto>,
) -> ApiResult<ArcResponseDto> {
    let story_id = existing_story(&state, &id).await?;
    let arc_id = ArcId::parse(&arc_id).map_err(|_| invalid_id("arc"))?;

    state
        .story_service
        .update_arc_progression(story_id, arc_id, req.progression)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map(|arc| Json(ArcResponseDto::from(arc)))
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Arc not found".to_string()))
}

pub async fn analyze_synopsis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SynopsisAnalysisRequestDto>,
) -> ApiResult<WorldBuildingResult<StructureSuggestions>> {
    let story_id = existing_story(&state, &id).await?;
    state
        .world_building_service
        .generate_from_synopsis(story_id, req.synopsis)
        .await
        .map(Json)
        .map_err(world_error)
}

pub async fn expand_location(
    State(state): State<Arc<AppState>>,
    Path((id, location_id)): Path<(String, String)>,
    Json(req): Json<ExpandLocationRequestDto>,
) -> ApiResult<WorldBuildingResult<LocationDetails>> {
    let story_id = existing_story(&state, &id).await?;
    let location_id = LocationId::parse(&location_id).map_err(|_| invalid_id("location"))?;
    state
        .world_building_service
        .expand_location(story_id, location_id, req.aspects)
        .await
        .map(Json)
        .map_err(world_error)
}

pub async fn generate_power_system(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GeneratePowerSystemRequestDto>,
) -> ApiResult<WorldBuildingResult<PowerSystemDraft>> {
    let story_id = existing_story(&state, &id).await?;
    state
        .world_building_service
        .generate_power_system(story_id, &req.concept)
        .await
        .map(Json)
        .map_err(world_error)
}

pub async fn generate_lore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GenerateLoreRequestDto>,
) -> ApiResult<WorldBuildingResult<String>> {
    let story_id = existing_story(&state, &id).await?;
    state
        .world_building_service
        .generate_lore(story_id, &req.topic, req.category)
        .await
        .map(Json)
        .map_err(world_error)
}

pub async fn expand_character(
    State(state): State<Arc<AppState>>,
    Path((id, character_id)): Path<(String, String)>,
    Json(req): Json<ExpandProfileRequestDto>,
) -> ApiResult<WorldBuildingResult<ProfileSuggestions>> {
    let story_id = existing_story(&state, &id).await?;
    let character_id = CharacterId::parse(&character_id).map_err(|_| invalid_id("character"))?;
    state
        .world_building_service
        .expand_character_details(story_id, character_id, req.focus)
        .await
        .map(Json)
        .map_err(world_error)
}

pub async fn expand_creature(
    State(state): State<Arc<AppState>>,
    Path((id, creature_id)): Path<(String, String)>,
    Json(req): Json<ExpandProfileRequestDto>,
) -> ApiResult<WorldBuildingResult<ProfileSuggestions>> {
    let story_id = existing_story(&state, &id).await?;
    let creature_id = CreatureId::parse(&creature_id).map_err(|_| invalid_id("creature"))?;
    state
        .world_building_service
        .expand_creature_details(story_id, creature_id, req.focus)
        .await
        .map(Json)
        .map_err(world_error)
}

/// Past world-building calls, newest first
pub async fn world_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Vec<WorldGenerationResponseDto>> {
    let story_id = existing_story(&state, &id).await?;
    let history = state
        .world_building_service
        .list_generations(story_id)
        .await
        .map_err(world_error)?;
    Ok(Json(
        history
            .into_iter()
            .map(WorldGenerationResponseDto::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::StoryId;

    #[test]
    fn test_world_error_status_mapping() {
        let cases = [
            (
                WorldBuildingError::Llm(LlmError::Connection("refused".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (WorldBuildingError::Llm(LlmError::Timeout(300)), StatusCode::GATEWAY_TIMEOUT),
            (
                WorldBuildingError::Llm(LlmError::Protocol("bad json".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (WorldBuildingError::EmptyResult, StatusCode::BAD_GATEWAY),
            (WorldBuildingError::StoryNotFound(StoryId::new()), StatusCode::NOT_FOUND),
            (WorldBuildingError::NotFound("Location x".into()), StatusCode::NOT_FOUND),
            (WorldBuildingError::InvalidRequest("topic".into()), StatusCode::BAD_REQUEST),
            (WorldBuildingError::Store("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(world_error(error).0, expected);
        }
    }
}
