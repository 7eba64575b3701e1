use crate::{
    api::handlers::{ApiError, ErrorResponse},
    refine::PromptRefiner,
};
use axum::{Json, extract::Extension, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RefinePrompt {
    pub original_prompt: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct RefinePromptResponse {
    pub refined_prompt: String,
}

#[utoipa::path(
    post,
    path= "/prompts/refine",
    request_body = RefinePrompt,
    responses (
        (status = 200, description = "Refined prompt, empty when the model returned nothing", body = RefinePromptResponse, content_type = "application/json"),
        (status = 422, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "LLM request failed", body = ErrorResponse),
        (status = 504, description = "LLM request timed out", body = ErrorResponse),
    ),
    tag= "prompts"
)]
// axum handler for prompt refinement
#[instrument(skip(refiner, payload))]
pub async fn refine(
    refiner: Extension<Arc<dyn PromptRefiner>>,
    payload: Result<Json<RefinePrompt>, JsonRejection>,
) -> Result<Json<RefinePromptResponse>, ApiError> {
    let Json(request) = payload?;

    if request.original_prompt.trim().is_empty() {
        return Err(ApiError::Validation("Invalid original_prompt".to_string()));
    }

    debug!(chars = request.original_prompt.len(), "Refining prompt");

    let refined_prompt = refiner.refine(&request.original_prompt).await?;

    Ok(Json(RefinePromptResponse { refined_prompt }))
}
