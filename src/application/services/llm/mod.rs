//! Prompt assembly for the completion endpoint

mod prompt_builder;
mod world_prompts;

pub use prompt_builder::{build_system_prompt, build_user_prompt};
pub use world_prompts::{
    build_profile_prompt, build_structure_prompt, build_world_prompt, location_request,
    lore_request, power_system_request, CHARACTER_DEVELOPER_SYSTEM_PROMPT,
    DEFAULT_LOCATION_ASPECTS, WORLD_BUILDER_SYSTEM_PROMPT,
};
