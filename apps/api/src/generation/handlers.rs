//! Axum route handlers for the workspace: résumé tailoring and application answers.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::extractors::CurrentUser;
use crate::errors::AppError;
use crate::generation::answers::generate_answers;
use crate::generation::job_details::extract_job_details;
use crate::generation::resume_input::{ResumeInput, ValidationError};
use crate::generation::tailor::tailor_resume;
use crate::models::history::{new_record_id, AnswerEntry, ResumeEntry};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Steps that grant the remote script permission to store uploaded documents.
pub static UPLOAD_PERMISSION_STEPS: [&str; 5] = [
    "Open the Apps Script project that backs your remote store.",
    "Add a setup function that calls DriveApp.createFolder(\"Temp\").",
    "Select setup in the toolbar and click Run.",
    "Accept the permissions prompt (Review, Advanced, Go to project, Allow).",
    "Deploy a new version: Deploy, Manage Deployments, Edit, New Version, Deploy.",
];

/// A document upload the remote store refused. The résumé itself was generated.
#[derive(Debug, Serialize)]
pub struct UploadIssue {
    pub code: &'static str,
    pub message: String,
    pub remediation: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub resume: ResumeEntry,
    /// Whether the store accepted the entry.
    pub synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_issue: Option<UploadIssue>,
}

#[derive(Debug, Serialize)]
pub struct AnswersResponse {
    pub job_id: String,
    pub answers: Vec<AnswerEntry>,
}

#[derive(Debug)]
struct UploadedFile {
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

/// Fields shared by both workspace forms.
#[derive(Debug, Default)]
struct WorkspaceForm {
    job_description: String,
    resume_text: String,
    questions: String,
    resume_file: Option<UploadedFile>,
}

impl WorkspaceForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = WorkspaceForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid form data: {}", e.body_text())))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume_file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::Validation(format!("Invalid form data: {}", e.body_text()))
                    })?;
                    // Browsers send an empty, unnamed part when no file was chosen.
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.resume_file = Some(UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                }
                "job_description" | "resume_text" | "questions" => {
                    let value = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Invalid form data: {}", e.body_text()))
                    })?;
                    match name.as_str() {
                        "job_description" => form.job_description = value,
                        "resume_text" => form.resume_text = value,
                        _ => form.questions = value,
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }

    /// A document upload takes precedence over pasted text.
    fn resume_and_job(&self, max_upload_bytes: usize) -> Result<(ResumeInput, String), ValidationError> {
        let job_description = self.job_description.trim();
        if job_description.is_empty() {
            return Err(ValidationError::MissingInput);
        }
        let input = match &self.resume_file {
            Some(file) => ResumeInput::from_document(
                &file.file_name,
                &file.content_type,
                file.bytes.clone(),
                max_upload_bytes,
            )?,
            None => ResumeInput::from_text(&self.resume_text).ok_or(ValidationError::MissingInput)?,
        };
        Ok((input, job_description.to_string()))
    }

    /// One question per non-blank line.
    fn question_list(&self) -> Result<Vec<String>, ValidationError> {
        let questions: Vec<String> = self
            .questions
            .lines()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
            .collect();
        if questions.is_empty() {
            return Err(ValidationError::MissingQuestions);
        }
        Ok(questions)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/tailor
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<TailorResponse>, AppError> {
    let form = WorkspaceForm::read(multipart).await?;
    let (input, job_description) = form.resume_and_job(state.config.max_upload_bytes)?;

    let details = extract_job_details(&state.llm, &job_description).await;
    let content = tailor_resume(&state.llm, &input, &job_description, user.model_choice).await?;

    let entry = ResumeEntry {
        resume_id: new_record_id("res"),
        user_id: user.user_id.clone(),
        job_id: new_record_id("job"),
        original_resume_link: input.source_link(),
        updated_resume_content: content,
        company_name: details.company,
        job_title: details.title,
        date: Utc::now(),
    };

    let response = state.store.save_resume(&entry, input.file_data()).await;
    let upload_issue = (input.is_document() && response.is_permission_denied()).then(|| UploadIssue {
        code: "UPLOAD_PERMISSION_DENIED",
        message: response.message.clone().unwrap_or_default(),
        remediation: &UPLOAD_PERMISSION_STEPS,
    });
    if !response.is_success() && upload_issue.is_none() {
        warn!(
            "Saving resume {} failed: {}",
            entry.resume_id,
            response.message.as_deref().unwrap_or("no message")
        );
    }

    info!(
        "Tailored resume {} for {} ({} at {})",
        entry.resume_id, user.user_id, entry.job_title, entry.company_name
    );
    Ok(Json(TailorResponse {
        resume: entry,
        synced: response.is_success(),
        upload_issue,
    }))
}

/// POST /api/v1/answers/generate
pub async fn handle_generate_answers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<AnswersResponse>, AppError> {
    let form = WorkspaceForm::read(multipart).await?;
    let (input, job_description) = form.resume_and_job(state.config.max_upload_bytes)?;
    let questions = form.question_list()?;

    let generated = generate_answers(
        &state.llm,
        &questions,
        &input,
        &job_description,
        user.model_choice,
    )
    .await?;

    let job_id = new_record_id("job");
    let mut answers = Vec::with_capacity(generated.len());
    for answer in generated {
        let entry = AnswerEntry {
            answer_id: new_record_id("ans"),
            user_id: user.user_id.clone(),
            job_id: job_id.clone(),
            question_text: answer.question,
            answer_text: answer.answer,
            date: Utc::now(),
        };
        let response = state.store.save_answer(&entry).await;
        if !response.is_success() {
            warn!(
                "Saving answer {} failed: {}",
                entry.answer_id,
                response.message.as_deref().unwrap_or("no message")
            );
        }
        answers.push(entry);
    }

    info!("Generated {} answers for {} ({job_id})", answers.len(), user.user_id);
    Ok(Json(AnswersResponse { job_id, answers }))
}
