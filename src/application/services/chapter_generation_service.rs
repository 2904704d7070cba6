//! Chapter generation service - one story snapshot in, one validated draft out
//!
//! Runs the whole pipeline for a single "generate chapter" action:
//! snapshot, packing, prompt rendering, the completion call and validation.
//! Only one generation may be in flight per story. A running generation can
//! be cancelled, which drops the pending request and persists nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::llm::{build_system_prompt, build_user_prompt};
use super::settings_service::SettingsService;
use super::story_context_service::StoryContextService;
use crate::application::ports::outbound::{
    FinishReason, LlmError, LlmPort, LlmRequest, StoryRepositoryPort,
};
use crate::domain::entities::Chapter;
use crate::domain::services::{
    section_header, ContextPacker, ResponseValidator, TierCaps, TokenEstimator,
    WordRatioEstimator, STOP_MARKERS,
};
use crate::domain::value_objects::{
    ChapterParams, ContextTier, GenerationMetadata, GenerationOutcome, GenerationRequest,
    GenerationStatus, PackedContext, StoryId, ValidationDecision,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Cannot reach the model endpoint: {0}")]
    Connection(String),
    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),
    #[error("Model endpoint protocol error: {0}")]
    Protocol(String),
    #[error("The model returned no usable text: {0}")]
    EmptyGeneration(String),
    #[error("Generation was cancelled")]
    Cancelled,
    #[error("A chapter is already being generated for story {0}")]
    AlreadyInProgress(StoryId),
    #[error("Story not found: {0}")]
    StoryNotFound(StoryId),
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
    #[error("Story store error: {0}")]
    Store(String),
}

impl From<LlmError> for GenerationError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Connection(msg) => Self::Connection(msg),
            LlmError::Timeout(secs) => Self::Timeout(secs),
            LlmError::Protocol(msg) => Self::Protocol(msg),
        }
    }
}

fn store_error(err: anyhow::Error) -> GenerationError {
    GenerationError::Store(format!("{:#}", err))
}

/// A generated draft and, when it was accepted, the chapter saved from it
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedChapter {
    pub outcome: GenerationOutcome,
    pub chapter: Option<Chapter>,
}

type InFlight = Mutex<HashMap<StoryId, AbortHandle>>;

fn lock(registry: &InFlight) -> MutexGuard<'_, HashMap<StoryId, AbortHandle>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds a story's in-flight slot and frees it on every exit path
struct SlotGuard<'a> {
    registry: &'a InFlight,
    story_id: StoryId,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        lock(self.registry).remove(&self.story_id);
    }
}

pub struct ChapterGenerationService {
    repository: Arc<dyn StoryRepositoryPort>,
    llm: Arc<dyn LlmPort>,
    settings: Arc<SettingsService>,
    context: StoryContextService,
    in_flight: InFlight,
}

impl ChapterGenerationService {
    pub fn new(
        repository: Arc<dyn StoryRepositoryPort>,
        llm: Arc<dyn LlmPort>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            context: StoryContextService::new(repository.clone()),
            repository,
            llm,
            settings,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Generate the next chapter of a story without saving it
    ///
    /// `Empty` drafts surface as `GenerationError::EmptyGeneration`. Every
    /// other classification comes back as an outcome with its decision.
    pub async fn generate_chapter(
        &self,
        story_id: StoryId,
        params: ChapterParams,
    ) -> Result<GenerationOutcome, GenerationError> {
        let (_slot, registration) = self.claim(story_id)?;
        self.generate_abortable(story_id, params, registration).await
    }

    /// Generate the next chapter and save it as a draft when accepted
    ///
    /// Short and malformed drafts are returned unsaved. Saving a short draft
    /// or asking for a continuation is left to the caller.
    pub async fn generate_and_persist(
        &self,
        story_id: StoryId,
        params: ChapterParams,
    ) -> Result<GeneratedChapter, GenerationError> {
        let (_slot, registration) = self.claim(story_id)?;
        let outcome = self
            .generate_abortable(story_id, params, registration)
            .await?;

        if outcome.decision != ValidationDecision::Accept {
            debug!(
                story_id = %story_id,
                status = ?outcome.status,
                "Draft not accepted, leaving it unsaved"
            );
            return Ok(GeneratedChapter {
                outcome,
                chapter: None,
            });
        }

        let chapter = Chapter::from_outcome(&outcome);
        self.repository
            .save_chapter(&chapter)
            .await
            .map_err(store_error)?;
        info!(
            story_id = %story_id,
            chapter = chapter.chapter_number,
            words = chapter.word_count,
            "Saved generated chapter as draft"
        );

        Ok(GeneratedChapter {
            outcome,
            chapter: Some(chapter),
        })
    }

    /// Abort the generation running for `story_id`
    ///
    /// Returns whether there was one to abort.
    pub fn cancel(&self, story_id: StoryId) -> bool {
        match lock(&self.in_flight).get(&story_id) {
            Some(handle) => {
                handle.abort();
                info!(story_id = %story_id, "Cancelling chapter generation");
                true
            }
            None => false,
        }
    }

    pub fn is_generating(&self, story_id: StoryId) -> bool {
        lock(&self.in_flight).contains_key(&story_id)
    }

    /// Reserve the story's slot, registering the handle `cancel` will use
    fn claim(
        &self,
        story_id: StoryId,
    ) -> Result<(SlotGuard<'_>, AbortRegistration), GenerationError> {
        let mut in_flight = lock(&self.in_flight);
        if in_flight.contains_key(&story_id) {
            warn!(story_id = %story_id, "Rejected concurrent generation request");
            return Err(GenerationError::AlreadyInProgress(story_id));
        }
        let (handle, registration) = AbortHandle::new_pair();
        in_flight.insert(story_id, handle);
        let guard = SlotGuard {
            registry: &self.in_flight,
            story_id,
        };
        Ok((guard, registration))
    }

    async fn generate_abortable(
        &self,
        story_id: StoryId,
        params: ChapterParams,
        registration: AbortRegistration,
    ) -> Result<GenerationOutcome, GenerationError> {
        match Abortable::new(self.generate(story_id, params), registration).await {
            Ok(result) => result,
            Err(Aborted) => {
                info!(story_id = %story_id, "Chapter generation cancelled");
                Err(GenerationError::Cancelled)
            }
        }
    }

    #[instrument(skip(self, params), fields(target_words = params.target_word_count))]
    async fn generate(
        &self,
        story_id: StoryId,
        params: ChapterParams,
    ) -> Result<GenerationOutcome, GenerationError> {
        let settings = self.settings.get().await;

        if params.directive.trim().is_empty() {
            return Err(GenerationError::InvalidRequest(
                "Plot directive cannot be empty".to_string(),
            ));
        }
        if !(settings.min_target_word_count..=settings.max_target_word_count)
            .contains(&params.target_word_count)
        {
            return Err(GenerationError::InvalidRequest(format!(
                "Target word count must be between {} and {}",
                settings.min_target_word_count, settings.max_target_word_count
            )));
        }

        let snapshot = self
            .context
            .build_snapshot(story_id, settings.condensed_detail_words)
            .await
            .map_err(store_error)?
            .ok_or(GenerationError::StoryNotFound(story_id))?;

        let pov_name = snapshot
            .character(params.pov_character_id)
            .map(|c| c.name.clone());
        if pov_name.is_none() {
            warn!(
                pov_character_id = %params.pov_character_id,
                "Point-of-view character is not part of this story, writing without a POV block"
            );
        }

        let estimator = WordRatioEstimator::new(settings.tokens_per_word);
        let desired_response = estimator.tokens_for_words(params.target_word_count as usize);
        let mut request =
            GenerationRequest::new(story_id, snapshot.chapter_number, params, desired_response);

        // Everything but the packed blocks: system prompt, task section and
        // the heading of every tier that might be rendered
        let system_prompt = build_system_prompt(&snapshot.metadata, request.style_preset);
        let bare_prompt = build_user_prompt(
            &snapshot.metadata,
            &PackedContext::default(),
            &request,
            pov_name.as_deref(),
        );
        let scaffolding_tokens = scaffolding_tokens(&estimator, &system_prompt, &bare_prompt);
        let budget = settings.budget_for(scaffolding_tokens, desired_response);
        if budget.response_cap(0) == 0 {
            return Err(GenerationError::InvalidRequest(format!(
                "Plot directive and instructions need about {} tokens, the model context holds {}",
                scaffolding_tokens, settings.model_context_tokens
            )));
        }
        if scaffolding_tokens > settings.scaffolding_reserve_tokens {
            debug!(
                measured = scaffolding_tokens,
                configured = settings.scaffolding_reserve_tokens,
                "Scaffolding exceeds the configured reserve"
            );
        }

        let packed = ContextPacker::new(&estimator, TierCaps::from(&settings)).pack(
            &snapshot,
            &budget,
            request.pov_character_id,
        );

        if packed.pov_override {
            warn!(
                available = packed.available_tokens,
                packed = packed.total_tokens(),
                "Point-of-view profile alone exceeds the context budget"
            );
        }
        debug!(
            blocks = packed.blocks.len(),
            skipped = packed.skipped.len(),
            tokens = packed.total_tokens(),
            available = packed.available_tokens,
            "Packed story context"
        );

        let max_response_tokens = budget.response_cap(packed.total_tokens());
        if max_response_tokens == 0 {
            return Err(GenerationError::InvalidRequest(
                "The point-of-view profile leaves no room for a response".to_string(),
            ));
        }
        if max_response_tokens < desired_response {
            warn!(
                desired = desired_response,
                capped = max_response_tokens,
                "Response cap reduced to stay inside the model context"
            );
        }
        request.max_response_tokens = max_response_tokens;

        let user_prompt =
            build_user_prompt(&snapshot.metadata, &packed, &request, pov_name.as_deref());

        let llm_request = STOP_MARKERS.iter().fold(
            LlmRequest::new(user_prompt.clone())
                .with_system_prompt(system_prompt)
                .with_temperature(request.temperature)
                .with_max_tokens(Some(to_u32(request.max_response_tokens)))
                .with_context_window(to_u32(settings.model_context_tokens)),
            |req, marker| req.with_stop(*marker),
        );

        info!(
            story_id = %story_id,
            chapter = request.chapter_number,
            model = self.llm.model_name(),
            max_tokens = request.max_response_tokens,
            "Requesting chapter from model"
        );
        let response = self.llm.generate(llm_request).await?;

        let validator =
            ResponseValidator::new(settings.length_tolerance, settings.empty_threshold_words);
        let mut draft = validator.validate(&response.content, request.target_word_count);
        let hit_token_cap = response.finish_reason == FinishReason::Length;
        if hit_token_cap && draft.status == GenerationStatus::Short {
            draft.detail = Some(format!(
                "Stopped at the response cap of {} tokens after {} words",
                request.max_response_tokens, draft.word_count
            ));
        }

        if draft.status == GenerationStatus::Empty {
            warn!(story_id = %story_id, "Model returned an empty chapter");
            return Err(GenerationError::EmptyGeneration(
                draft.detail.unwrap_or_default(),
            ));
        }

        info!(
            story_id = %story_id,
            chapter = request.chapter_number,
            words = draft.word_count,
            status = ?draft.status,
            "Chapter draft validated"
        );

        Ok(GenerationOutcome {
            story_id,
            chapter_number: request.chapter_number,
            pov_character_id: request.pov_character_id,
            decision: draft.status.decision(),
            status: draft.status,
            word_count: draft.word_count,
            text: draft.text,
            detail: draft.detail,
            prompt_used: user_prompt,
            metadata: GenerationMetadata {
                model: self.llm.model_name().to_string(),
                temperature: request.temperature,
                target_word_count: request.target_word_count,
                max_response_tokens: request.max_response_tokens,
                context_tokens: packed.total_tokens(),
                context_blocks: packed.blocks.len(),
                skipped_blocks: packed.skipped.len(),
                pov_override: packed.pov_override,
                prompt_tokens: response.usage.map(|u| u.prompt_tokens),
                completion_tokens: response.usage.map(|u| u.completion_tokens),
                hit_token_cap,
            },
        })
    }
}

/// Tokens taken by the request outside the packed blocks
///
/// Word-ratio estimates round up per piece, so this never undercounts the
/// assembled prompt.
fn scaffolding_tokens(
    estimator: &dyn TokenEstimator,
    system_prompt: &str,
    bare_prompt: &str,
) -> usize {
    let headings: usize = ContextTier::all_by_priority()
        .iter()
        .map(|tier| estimator.estimate(&section_header(tier.heading())))
        .sum();
    estimator.estimate(system_prompt) + estimator.estimate(bare_prompt) + headings
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
