//! HTTP REST API routes

mod chapter_routes;
mod settings_routes;
mod story_routes;
mod world_routes;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::application::services::StoryService;
use crate::domain::value_objects::StoryId;
use crate::infrastructure::state::AppState;

pub use settings_routes::settings_routes;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/llm/health", get(chapter_routes::llm_health))
        // Story routes
        .route(
            "/api/stories",
            get(story_routes::list_stories).post(story_routes::create_story),
        )
        .route("/api/stories/{id}", get(story_routes::get_story))
        // World-building routes
        .route(
            "/api/stories/{id}/characters",
            get(story_routes::list_characters).post(story_routes::create_character),
        )
        .route(
            "/api/stories/{id}/locations",
            get(story_routes::list_locations).post(story_routes::create_location),
        )
        .route(
            "/api/stories/{id}/creatures",
            get(story_routes::list_creatures).post(story_routes::create_creature),
        )
        .route(
            "/api/stories/{id}/power-systems",
            get(story_routes::list_power_systems).post(story_routes::create_power_system),
        )
        .route(
            "/api/stories/{id}/lore",
            get(story_routes::list_lore).post(story_routes::create_lore),
        )
        .route(
            "/api/stories/{id}/arcs",
            get(world_routes::list_arcs).post(world_routes::create_arc),
        )
        .route(
            "/api/stories/{id}/arcs/{arc_id}/progression",
            put(world_routes::update_arc_progression),
        )
        // Model-assisted world-building
        .route(
            "/api/stories/{id}/world/synopsis",
            post(world_routes::analyze_synopsis),
        )
        .route(
            "/api/stories/{id}/world/locations/{location_id}/expand",
            post(world_routes::expand_location),
        )
        .route(
            "/api/stories/{id}/world/power-systems",
            post(world_routes::generate_power_system),
        )
        .route("/api/stories/{id}/world/lore", post(world_routes::generate_lore))
        .route(
            "/api/stories/{id}/world/characters/{character_id}/expand",
            post(world_routes::expand_character),
        )
        .route(
            "/api/stories/{id}/world/creatures/{creature_id}/expand",
            post(world_routes::expand_creature),
        )
        .route("/api/stories/{id}/world/history", get(world_routes::world_history))
        // Chapter routes
        .route(
            "/api/stories/{id}/chapters",
            get(chapter_routes::list_chapters).post(chapter_routes::save_chapter),
        )
        .route(
            "/api/stories/{id}/chapters/generate",
            post(chapter_routes::generate_chapter),
        )
        .route(
            "/api/stories/{id}/chapters/generate/cancel",
            post(chapter_routes::cancel_generation),
        )
        .route(
            "/api/stories/{id}/chapters/generate/status",
            get(chapter_routes::generation_status),
        )
        .merge(settings_routes())
}

/// Parse a story id from the path and make sure the story exists
async fn existing_story(state: &AppState, id: &str) -> Result<StoryId, (StatusCode, String)> {
    let story_id = StoryId::parse(id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid story ID".to_string()))?;

    state
        .story_service
        .get_story(story_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Story not found".to_string()))?;

    Ok(story_id)
}
