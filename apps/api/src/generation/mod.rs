// Workspace generation: résumé tailoring, application answers, job detail extraction.
// All model calls go through llm_client; no direct HTTP calls to the model API here.

pub mod answers;
pub mod handlers;
pub mod job_details;
pub mod prompts;
pub mod resume_input;
pub mod tailor;
