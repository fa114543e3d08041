//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::evaluator::{evaluate_pdf, evaluate_text, Evaluation};
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";

#[derive(Debug, Deserialize)]
pub struct EvaluateTextRequest {
    pub resume_text: String,
    pub job_description: String,
}

/// POST /api/v1/evaluate
///
/// Multipart upload: `resume` (PDF file) and `job_description` (text).
pub async fn handle_evaluate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Evaluation>, AppError> {
    let mut resume: Option<Bytes> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(RESUME_FIELD) => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read resume: {e}")))?;
                resume = Some(data);
            }
            Some(JOB_DESCRIPTION_FIELD) => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("could not read job description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let resume = resume
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("a resume PDF must be uploaded".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;

    info!("Evaluating uploaded resume ({} bytes)", resume.len());
    let evaluation = evaluate_pdf(resume, &job_description, state.llm.as_ref()).await?;

    Ok(Json(evaluation))
}

/// POST /api/v1/evaluate/text
///
/// Same pipeline for resume text that is already extracted.
pub async fn handle_evaluate_text(
    State(state): State<AppState>,
    Json(request): Json<EvaluateTextRequest>,
) -> Result<Json<Evaluation>, AppError> {
    let candidate = evaluate_text(
        &request.resume_text,
        &request.job_description,
        state.llm.as_ref(),
    )
    .await?;

    Ok(Json(Evaluation::from_candidate(candidate)))
}
