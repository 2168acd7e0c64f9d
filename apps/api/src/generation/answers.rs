//! Application answers: one model call answers every question against the résumé.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::generation::prompts::{fill, ANSWERS_PROMPT_TEMPLATE};
use crate::generation::resume_input::ResumeInput;
use crate::llm_client::prompts::FACTUALITY_INSTRUCTION;
use crate::llm_client::{GenerationRequest, LlmClient};
use crate::models::user::ModelChoice;

const ANSWERS_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub question: String,
    pub answer: String,
}

fn answers_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "answer": { "type": "STRING" }
            },
            "required": ["question", "answer"]
        }
    })
}

/// Numbers questions from 1, one per line.
fn numbered(questions: &[String]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {q}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn generate_answers(
    llm: &LlmClient,
    questions: &[String],
    input: &ResumeInput,
    job_description: &str,
    model: ModelChoice,
) -> Result<Vec<GeneratedAnswer>, AppError> {
    let resume = input.prompt_text();
    let numbered_questions = numbered(questions);
    let prompt = fill(
        ANSWERS_PROMPT_TEMPLATE,
        &[
            ("factuality", FACTUALITY_INSTRUCTION),
            ("job_description", job_description),
            ("resume", resume.as_str()),
            ("questions", numbered_questions.as_str()),
        ],
    );

    let request = GenerationRequest::new(model, input.parts(prompt))
        .temperature(ANSWERS_TEMPERATURE)
        .json_schema(answers_schema());

    let answers = llm
        .call_json::<Vec<GeneratedAnswer>>(&request)
        .await
        .map_err(|e| AppError::Generation(format!("Answer generation failed: {e}")))?;

    Ok(answers.unwrap_or_default())
}
