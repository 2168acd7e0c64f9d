use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse},
};
use chrono::Utc;

use crate::auth::extractors::CurrentUser;
use crate::errors::AppError;
use crate::export::{
    answers_file_name, answers_to_text, render_print_html, resume_file_name,
    MARKDOWN_CONTENT_TYPE, TEXT_CONTENT_TYPE,
};
use crate::state::AppState;

fn attachment(content_type: &'static str, file_name: String, body: String) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
}

/// GET /api/v1/history/resumes/:id/download
pub async fn handle_download_resume(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(resume_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let history = state.store.get_history(&user.user_id).await;
    let entry = history
        .find_resume(&resume_id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    Ok(attachment(
        MARKDOWN_CONTENT_TYPE,
        resume_file_name(Utc::now()),
        entry.updated_resume_content.clone(),
    ))
}

/// GET /api/v1/history/resumes/:id/print
pub async fn handle_print_resume(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(resume_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let history = state.store.get_history(&user.user_id).await;
    let entry = history
        .find_resume(&resume_id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let html = render_print_html(entry)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Print template failed: {e}")))?;
    Ok(Html(html))
}

/// GET /api/v1/history/jobs/:job_id/answers/download
pub async fn handle_download_answers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let history = state.store.get_history(&user.user_id).await;
    let answers: Vec<_> = history.answers_for_job(&job_id).collect();
    if answers.is_empty() {
        return Err(AppError::NotFound(format!("No answers for job {job_id}")));
    }

    Ok(attachment(
        TEXT_CONTENT_TYPE,
        answers_file_name(Utc::now()),
        answers_to_text(answers),
    ))
}
