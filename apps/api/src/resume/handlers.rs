//! Axum route handlers for the Resume API.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::resume::{ResumeFields, ResumeRecord, ResumeUpdate, DEFAULT_TITLE};
use crate::render::{file_name, RenderFormat};
use crate::resume::assemble::{assemble, DocumentModel, RenderTarget};
use crate::state::AppState;

const NO_RESUME: &str = "No resume found. Go back and create one.";

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub format: RenderFormat,
}

/// Returns the user's current record, creating an empty one on first visit.
///
/// Runs under the user's lock so two first visits cannot both create.
pub async fn load_or_create(state: &AppState, user_id: Uuid) -> Result<ResumeRecord, AppError> {
    let _lock = state.user_locks.lock(user_id).await;

    if let Some(record) = state.store.find_latest_by_user(user_id).await? {
        return Ok(record);
    }

    let record = state
        .store
        .create(user_id, DEFAULT_TITLE, &ResumeFields::default())
        .await?;
    info!("Created empty resume {} on first visit of user {}", record.id, user_id);
    Ok(record)
}

/// The user's current record, which must be `id`.
pub async fn current_with_id(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
) -> Result<ResumeRecord, AppError> {
    state
        .store
        .find_latest_by_user(user_id)
        .await?
        .filter(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

async fn current_or_not_found(state: &AppState, user_id: Uuid) -> Result<ResumeRecord, AppError> {
    state
        .store
        .find_latest_by_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_RESUME.to_string()))
}

/// GET /api/v1/resumes/current
pub async fn handle_get_current(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ResumeRecord>, AppError> {
    Ok(Json(load_or_create(&state, current.user.id).await?))
}

/// PUT /api/v1/resumes/:id
///
/// Last write wins. Waits behind any in-progress create for the same user.
pub async fn handle_save(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(update): Json<ResumeUpdate>,
) -> Result<Json<ResumeRecord>, AppError> {
    let user_id = current.user.id;
    let _lock = state.user_locks.lock(user_id).await;

    let record = state.store.update(id, user_id, update).await?;
    info!("Saved resume {} for user {}", id, user_id);
    Ok(Json(record))
}

/// GET /api/v1/resumes/current/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<DocumentModel>, AppError> {
    let record = current_or_not_found(&state, current.user.id).await?;
    Ok(Json(assemble(&record, RenderTarget::Preview)))
}

/// GET /api/v1/resumes/current/document
pub async fn handle_document(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<DocumentModel>, AppError> {
    let record = current_or_not_found(&state, current.user.id).await?;
    Ok(Json(assemble(&record, RenderTarget::Document)))
}

/// GET /api/v1/resumes/current/download?format=pdf|md
pub async fn handle_download(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let record = current_or_not_found(&state, current.user.id).await?;
    let doc = assemble(&record, RenderTarget::Document);

    let renderer = query.format.renderer();
    let content_type = renderer.content_type();
    let name = file_name(&record.title, renderer.extension()).replace('"', "");

    let bytes = tokio::task::spawn_blocking(move || renderer.render(&doc))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Render task failed: {e}")))??;

    info!("Rendered {} ({} bytes) for user {}", name, bytes.len(), current.user.id);

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}
