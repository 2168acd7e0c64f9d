use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lenient;

/// Generates `<prefix>_<uuid>` identifiers, e.g. `res_…`, `job_…`, `ans_…`.
pub fn new_record_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub resume_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub job_id: String,
    /// Where the original resume came from: an uploaded file name or a text excerpt.
    /// Older sheets name this column `original_resume_content`.
    #[serde(
        default,
        alias = "original_resume_content",
        deserialize_with = "lenient::string"
    )]
    pub original_resume_link: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub updated_resume_content: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub company_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub job_title: String,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEntry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub answer_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub job_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub question_text: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub answer_text: String,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub date: DateTime<Utc>,
}

/// A user's saved resumes and answers, most recent first.
///
/// Rows that cannot be read at all are skipped, never the whole history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default, deserialize_with = "lenient::rows")]
    pub resumes: Vec<ResumeEntry>,
    #[serde(default, deserialize_with = "lenient::rows")]
    pub answers: Vec<AnswerEntry>,
}

impl History {
    pub fn find_resume(&self, resume_id: &str) -> Option<&ResumeEntry> {
        self.resumes.iter().find(|r| r.resume_id == resume_id)
    }

    pub fn answers_for_job<'a>(&'a self, job_id: &'a str) -> impl Iterator<Item = &'a AnswerEntry> {
        self.answers.iter().filter(move |a| a.job_id == job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_ids_are_prefixed_and_unique() {
        let a = new_record_id("res");
        let b = new_record_id("res");
        assert!(a.starts_with("res_"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_history_missing_arrays_default_to_empty() {
        let history: History = serde_json::from_str(r#"{"status": "error"}"#).unwrap();
        assert!(history.resumes.is_empty());
        assert!(history.answers.is_empty());
    }

    #[test]
    fn test_legacy_and_partial_rows_are_kept() {
        let history: History = serde_json::from_value(serde_json::json!({
            "resumes": [{
                "resume_id": "res_1",
                "user_id": "u1",
                "job_id": "job_1",
                "original_resume_content": "Jane Doe, Rust developer",
                "updated_resume_content": "# Jane Doe",
                "company_name": "Acme",
                "job_title": 42,
                "date": ""
            }],
            "answers": [
                { "answer_id": "ans_1", "user_id": "u1", "job_id": "job_1" },
                "not a row"
            ]
        }))
        .unwrap();

        let resume = &history.resumes[0];
        assert_eq!(resume.original_resume_link, "Jane Doe, Rust developer");
        assert_eq!(resume.job_title, "42");
        assert_eq!(resume.date, DateTime::<Utc>::default());
        assert_eq!(history.answers.len(), 1);
        assert_eq!(history.answers[0].question_text, "");
    }
}
