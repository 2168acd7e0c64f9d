//! Résumé tailoring: rewrites the applicant's résumé against one job description.

use crate::errors::AppError;
use crate::generation::prompts::{fill, TAILOR_PROMPT_TEMPLATE};
use crate::generation::resume_input::ResumeInput;
use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, RESUME_WRITER_SYSTEM};
use crate::llm_client::{GenerationRequest, LlmClient};
use crate::models::user::ModelChoice;

/// Returned in place of the résumé when the model answers with nothing.
pub const EMPTY_RESUME_MESSAGE: &str = "Failed to generate resume. Please try again.";

const TAILOR_TEMPERATURE: f32 = 0.3;

pub async fn tailor_resume(
    llm: &LlmClient,
    input: &ResumeInput,
    job_description: &str,
    model: ModelChoice,
) -> Result<String, AppError> {
    let resume = input.prompt_text();
    let prompt = fill(
        TAILOR_PROMPT_TEMPLATE,
        &[
            ("factuality", FACTUALITY_INSTRUCTION),
            ("job_description", job_description),
            ("resume", resume.as_str()),
        ],
    );

    let request = GenerationRequest::new(model, input.parts(prompt))
        .system(RESUME_WRITER_SYSTEM)
        .temperature(TAILOR_TEMPERATURE);

    let text = llm
        .call_text(&request)
        .await
        .map_err(|e| AppError::Generation(format!("Resume tailoring failed: {e}")))?;

    Ok(text.unwrap_or_else(|| EMPTY_RESUME_MESSAGE.to_string()))
}
