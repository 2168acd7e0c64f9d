//! Job detail extraction: company and title used to label saved history.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::generation::prompts::{fill, JOB_DETAILS_PROMPT_TEMPLATE};
use crate::llm_client::{GenerationRequest, LlmClient, Part};
use crate::models::user::ModelChoice;

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_ROLE: &str = "Unknown Role";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
}

impl Default for JobDetails {
    fn default() -> Self {
        Self {
            company: UNKNOWN_COMPANY.to_string(),
            title: UNKNOWN_ROLE.to_string(),
        }
    }
}

impl JobDetails {
    /// Blank fields fall back to their placeholders.
    fn or_placeholders(self) -> Self {
        let company = self.company.trim();
        let title = self.title.trim();
        Self {
            company: (if company.is_empty() { UNKNOWN_COMPANY } else { company }).to_string(),
            title: (if title.is_empty() { UNKNOWN_ROLE } else { title }).to_string(),
        }
    }
}

fn job_details_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "company": { "type": "STRING" },
            "title": { "type": "STRING" }
        },
        "required": ["company", "title"]
    })
}

/// Always uses the fast model. Never fails: any problem yields the placeholder pair.
pub async fn extract_job_details(llm: &LlmClient, job_description: &str) -> JobDetails {
    if job_description.trim().is_empty() {
        return JobDetails::default();
    }

    let prompt = fill(JOB_DETAILS_PROMPT_TEMPLATE, &[("job_description", job_description)]);
    let request = GenerationRequest::new(ModelChoice::Flash, vec![Part::Text(prompt)])
        .json_schema(job_details_schema());

    match llm.call_json::<JobDetails>(&request).await {
        Ok(Some(details)) => details.or_placeholders(),
        Ok(None) => JobDetails::default(),
        Err(e) => {
            warn!("Job detail extraction failed: {e}");
            JobDetails::default()
        }
    }
}
