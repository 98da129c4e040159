//! Axum route handlers for the Resume Analysis API.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::analysis::extractor::ResumeFile;
use crate::analysis::highlight::{highlight_keywords, Segment};
use crate::analysis::pipeline::PipelineSnapshot;
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
    /// Display form only; concatenating the segment texts equals `analysis`.
    pub segments: Vec<Segment>,
}

/// POST /api/resume/analyze
///
/// Multipart upload (`resume` field) driving the session pipeline:
/// extract → prompt → remote analysis. Returns the report plus its
/// highlight segments.
pub async fn handle_analyze(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let file = read_resume_field(&mut multipart).await?;

    let pipeline = state.sessions.pipeline_for(user_id, &state.analyzer).await;
    let analysis = pipeline.submit(file).await?;
    let segments = highlight_keywords(&analysis);

    Ok(Json(AnalyzeResponse { analysis, segments }))
}

/// GET /api/resume/status
///
/// Current pipeline state for the session: idle/extracting/analyzing/done/
/// failed, plus the held result or error message.
pub async fn handle_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PipelineSnapshot>, AppError> {
    let pipeline = state.sessions.pipeline_for(user_id, &state.analyzer).await;
    Ok(Json(pipeline.snapshot().await))
}

/// POST /api/resume/reset
///
/// Clears the session pipeline back to Idle (the "clear result" /
/// "re-upload" user action).
pub async fn handle_reset(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, AppError> {
    let pipeline = state.sessions.pipeline_for(user_id, &state.analyzer).await;
    pipeline.reset().await;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_resume_field(multipart: &mut Multipart) -> Result<ResumeFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }
        let media_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        return Ok(ResumeFile { bytes, media_type });
    }

    Err(AppError::Validation(
        "missing `resume` file field".to_string(),
    ))
}
