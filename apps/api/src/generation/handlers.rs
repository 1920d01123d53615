//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::generation::generator::{GeneratedContent, GenerationError, GenerationInput};
use crate::models::resume::{ResumeRecord, ResumeUpdate};
use crate::resume::handlers::current_with_id;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub input: GenerationInput,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub ok: bool,
    pub result: GeneratedContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate
///
/// Stateless: generates content for the posted fields and returns it.
/// Errors, including an unreadable body, use the flat `{"error": ...}` body
/// of `GenerationError`.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, GenerationError> {
    let Json(request) = payload.map_err(|e| GenerationError::Validation(e.body_text()))?;
    let result = state.generator.request_completion(&request.input).await?;
    Ok(Json(GenerateResponse { ok: true, result }))
}

/// POST /api/v1/resumes/:id/generate
///
/// Generates from the stored raw fields and saves the result as the record's
/// AI overlay. One generation per user at a time; duplicates get 409.
pub async fn handle_generate_for_resume(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRecord>, AppError> {
    let user_id = current.user.id;
    let _in_flight = state.in_flight.try_begin(user_id).ok_or_else(|| {
        AppError::Conflict("A generation is already running for this resume".to_string())
    })?;

    let record = current_with_id(&state, user_id, id).await?;
    let content = state
        .generator
        .request_completion(&GenerationInput::from(&record.fields))
        .await?;

    // Re-read under the lock: raw fields saved while the model was running are kept.
    let _lock = state.user_locks.lock(user_id).await;
    let mut fields = current_with_id(&state, user_id, id).await?.fields;
    fields.ai = content.into_overlay();

    let saved = state
        .store
        .update(
            id,
            user_id,
            ResumeUpdate {
                title: None,
                fields: Some(fields),
            },
        )
        .await?;

    info!(
        "Applied {:?} generation to resume {} for user {}",
        state.generator.mode(),
        id,
        user_id
    );
    Ok(Json(saved))
}
