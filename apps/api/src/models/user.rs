use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Generative model a user generates with. Serialized as the model identifier
/// the hosted API expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "gemini-2.5-flash")]
    Flash,
    #[serde(rename = "gemini-3-pro-preview")]
    Pro,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::Flash, ModelChoice::Pro];

    pub fn as_model_id(&self) -> &'static str {
        match self {
            ModelChoice::Flash => "gemini-2.5-flash",
            ModelChoice::Pro => "gemini-3-pro-preview",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelChoice::Flash => "Gemini 2.5 Flash (Fast & Efficient)",
            ModelChoice::Pro => "Gemini 3 Pro Preview (Higher Quality)",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_model_id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::model_choice")]
    pub model_choice: ModelChoice,
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub created_at: DateTime<Utc>,
}

/// Locally cached credentials, keyed by normalized email in the auth map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub user_id: String,
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
