//! LLM client: the single point of entry for all Gemini API calls.
//!
//! No other module builds generateContent requests directly. Each call is
//! attempted once; callers decide how a failure surfaces.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::user::ModelChoice;

pub mod prompts;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One piece of user content: prompt text or an inline binary attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
}

/// Everything a single generateContent call needs.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: ModelChoice,
    pub parts: Vec<Part>,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    /// When set, the response is requested as `application/json` matching this schema.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    pub fn new(model: ModelChoice, parts: Vec<Part>) -> Self {
        Self {
            model,
            parts,
            system: None,
            temperature: None,
            response_schema: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: [GeminiContent<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: &'a [Part],
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: [Part; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

impl<'a> From<&'a GenerationRequest> for GeminiRequest<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        GeminiRequest {
            contents: [GeminiContent {
                role: "user",
                parts: &request.parts,
            }],
            system_instruction: request.system.as_ref().map(|s| GeminiSystemInstruction {
                parts: [Part::Text(s.clone())],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json"),
                response_schema: request.response_schema.as_ref(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl LlmResponse {
    /// Concatenated text of the first candidate, or `None` when it produced nothing.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The single model client shared by every generation path.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_base: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: ModelChoice) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model.as_model_id())
    }

    /// Makes one generateContent call and returns the full response object.
    pub async fn call(&self, request: &GenerationRequest) -> Result<LlmResponse, LlmError> {
        let body = GeminiRequest::from(request);

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage_metadata {
            debug!(
                "Gemini call succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
                request.model, usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(llm_response)
    }

    /// Text output of a call, `None` when the model returned nothing.
    pub async fn call_text(&self, request: &GenerationRequest) -> Result<Option<String>, LlmError> {
        let response = self.call(request).await?;
        let text = response.text();
        if text.is_none() {
            debug!(
                "Gemini returned no text: finish_reason={:?}",
                response.candidates.first().and_then(|c| c.finish_reason.as_deref())
            );
        }
        Ok(text)
    }

    /// Deserializes the text output as JSON. `None` when the model returned nothing.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        request: &GenerationRequest,
    ) -> Result<Option<T>, LlmError> {
        match self.call_text(request).await? {
            Some(text) => Ok(Some(serde_json::from_str(strip_json_fences(&text))?)),
            None => Ok(None),
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::testing::{spawn_model, text_reply};
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_request_body_shape_with_attachment_and_schema() {
        let request = GenerationRequest::new(
            ModelChoice::Flash,
            vec![
                Part::Text("Tailor this".to_string()),
                Part::InlineData {
                    mime_type: "application/pdf".to_string(),
                    data: "JVBERi0=".to_string(),
                },
            ],
        )
        .system("You are a professional resume writer.")
        .temperature(0.5)
        .json_schema(json!({ "type": "OBJECT" }));

        let body = serde_json::to_value(GeminiRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Tailor this" },
                        { "inlineData": { "mimeType": "application/pdf", "data": "JVBERi0=" } }
                    ]
                }],
                "systemInstruction": { "parts": [{ "text": "You are a professional resume writer." }] },
                "generationConfig": {
                    "temperature": 0.5,
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "OBJECT" }
                }
            })
        );
    }

    #[test]
    fn test_plain_text_request_omits_optional_config() {
        let request = GenerationRequest::new(ModelChoice::Pro, vec![Part::Text("hi".to_string())]);
        let body = serde_json::to_value(GeminiRequest::from(&request)).unwrap();
        assert!(body.get("systemInstruction").is_none());
        assert_eq!(body["generationConfig"], json!({}));
    }

    #[test]
    fn test_response_text_joins_parts_and_treats_blank_as_none() {
        let response: LlmResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello, world"));

        let blank: LlmResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        }))
        .unwrap();
        assert_eq!(blank.text(), None);
        assert_eq!(LlmResponse::default().text(), None);
    }

    #[tokio::test]
    async fn test_call_targets_model_endpoint() {
        let (client, captured) = spawn_model(StatusCode::OK, text_reply("done")).await;
        let request = GenerationRequest::new(ModelChoice::Pro, vec![Part::Text("hi".to_string())]);

        let text = client.call_text(&request).await.unwrap();
        assert_eq!(text.as_deref(), Some("done"));

        let calls = captured.lock().unwrap().clone();
        assert_eq!(calls[0].0, "gemini-3-pro-preview:generateContent");
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let (client, _) = spawn_model(
            StatusCode::BAD_REQUEST,
            json!({ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } }),
        )
        .await;
        let request = GenerationRequest::new(ModelChoice::Flash, vec![Part::Text("hi".to_string())]);

        match client.call(&request).await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
