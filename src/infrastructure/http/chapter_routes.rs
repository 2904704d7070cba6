//! Chapter and generation API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::existing_story;
use crate::application::dto::{
    CancelGenerationResponseDto, ChapterResponseDto, GenerateChapterRequestDto,
    GenerationStatusDto, SaveChapterRequestDto,
};
use crate::application::ports::outbound::LlmPort;
use crate::application::services::{GeneratedChapter, GenerationError, StoryService};
use crate::infrastructure::state::AppState;

fn generation_error(e: GenerationError) -> (StatusCode, String) {
    let status = match &e {
        GenerationError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
        GenerationError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        GenerationError::Protocol(_) | GenerationError::EmptyGeneration(_) => {
            StatusCode::BAD_GATEWAY
        }
        GenerationError::AlreadyInProgress(_) | GenerationError::Cancelled => StatusCode::CONFLICT,
        GenerationError::StoryNotFound(_) => StatusCode::NOT_FOUND,
        GenerationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GenerationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChapterResponseDto>>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let chapters = state
        .story_service
        .list_chapters(story_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(chapters.into_iter().map(ChapterResponseDto::from).collect()))
}

/// Save a chapter by hand, replacing any chapter with the same number
pub async fn save_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SaveChapterRequestDto>,
) -> Result<(StatusCode, Json<ChapterResponseDto>), (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let chapter = state
        .story_service
        .save_chapter(story_id, req.into())
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok((StatusCode::CREATED, Json(ChapterResponseDto::from(chapter))))
}

/// Generate the next chapter; accepted drafts are saved
pub async fn generate_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GenerateChapterRequestDto>,
) -> Result<Json<GeneratedChapter>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let settings = state.settings_service.get().await;

    state
        .generation_service
        .generate_and_persist(story_id, req.into_params(&settings))
        .await
        .map(Json)
        .map_err(generation_error)
}

pub async fn cancel_generation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CancelGenerationResponseDto>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    let cancelled = state.generation_service.cancel(story_id);
    Ok(Json(CancelGenerationResponseDto {
        story_id: story_id.to_string(),
        cancelled,
    }))
}

pub async fn generation_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GenerationStatusDto>, (StatusCode, String)> {
    let story_id = existing_story(&state, &id).await?;
    Ok(Json(GenerationStatusDto {
        story_id: story_id.to_string(),
        generating: state.generation_service.is_generating(story_id),
    }))
}

#[derive(Debug, Serialize)]
pub struct LlmHealthResponse {
    pub model: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report whether the completion endpoint answers
pub async fn llm_health(State(state): State<Arc<AppState>>) -> Json<LlmHealthResponse> {
    let (available, error) = match state.llm_client.health_check().await {
        Ok(available) => (available, None),
        Err(e) => (false, Some(e.to_string())),
    };
    Json(LlmHealthResponse {
        model: state.llm_client.model_name().to_string(),
        available,
        error,
    })
}
