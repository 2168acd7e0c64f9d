//! Record store: the remote spreadsheet-backed system of record and its local fallback.
//!
//! `RecordStore` has two implementations: `HttpRecordStore` talks to the remote
//! script endpoint, `FallbackStore` emulates it on the local store. `StoreClient`
//! composes them so callers never branch on connectivity and never see an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::local_store::LocalStoreError;
use crate::models::history::{AnswerEntry, History, ResumeEntry};
use crate::models::user::{ModelChoice, User};

pub mod endpoint;
pub mod fallback;
pub mod remote;

pub use endpoint::{EndpointResolver, ResolvedEndpoint};
pub use fallback::FallbackStore;
pub use remote::HttpRecordStore;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Remote store endpoint is not configured")]
    NotConfigured,

    #[error("Remote store unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Failed to encode store request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Remote store sent an unreadable response: {0}")]
    InvalidResponse(serde_json::Error),

    #[error("Local store error: {0}")]
    Local(#[from] LocalStoreError),
}

/// Uploaded resume document forwarded alongside a `save_resume` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    pub base64: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub name: String,
}

/// One write against the store. Serializes as `{"action": "<name>", ...fields}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StoreAction {
    SaveUser {
        #[serde(flatten)]
        user: User,
        password_hash: String,
    },
    LoginUser {
        email: String,
        password_hash: String,
    },
    SaveResume {
        #[serde(flatten)]
        entry: ResumeEntry,
        #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
        file_data: Option<FileData>,
    },
    SaveAnswer {
        #[serde(flatten)]
        entry: AnswerEntry,
    },
    UpdateUserModel {
        user_id: String,
        model_choice: ModelChoice,
    },
}

impl StoreAction {
    pub fn name(&self) -> &'static str {
        match self {
            StoreAction::SaveUser { .. } => "save_user",
            StoreAction::LoginUser { .. } => "login_user",
            StoreAction::SaveResume { .. } => "save_resume",
            StoreAction::SaveAnswer { .. } => "save_answer",
            StoreAction::UpdateUserModel { .. } => "update_user_model",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Success,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse {
    #[serde(default)]
    pub status: StoreStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl StoreResponse {
    pub fn success() -> Self {
        Self {
            status: StoreStatus::Success,
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: StoreStatus::Error,
            message: Some(message.into()),
            user: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StoreStatus::Success
    }

    /// The remote script reports Drive permission failures for uploads in `message`,
    /// sometimes alongside a success status for the row itself.
    pub fn is_permission_denied(&self) -> bool {
        self.message
            .as_deref()
            .map(|m| m.to_lowercase().contains("permission"))
            .unwrap_or(false)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn submit(&self, action: &StoreAction) -> Result<StoreResponse, SyncError>;
    async fn history(&self, user_id: &str) -> Result<History, SyncError>;
}

/// Remote-first store access. Degrades to the fallback store on any remote failure.
#[derive(Clone)]
pub struct StoreClient {
    remote: Arc<dyn RecordStore>,
    fallback: Arc<dyn RecordStore>,
}

impl StoreClient {
    pub fn new(remote: Arc<dyn RecordStore>, fallback: Arc<dyn RecordStore>) -> Self {
        Self { remote, fallback }
    }

    pub async fn post(&self, action: StoreAction) -> StoreResponse {
        match self.remote.submit(&action).await {
            Ok(response) => response,
            Err(SyncError::NotConfigured) => {
                warn!(
                    "Remote store sync is disabled; '{}' handled by local fallback",
                    action.name()
                );
                self.post_fallback(&action).await
            }
            Err(e) => {
                warn!("Remote store '{}' failed: {e}; using local fallback", action.name());
                self.post_fallback(&action).await
            }
        }
    }

    async fn post_fallback(&self, action: &StoreAction) -> StoreResponse {
        self.fallback.submit(action).await.unwrap_or_else(|e| {
            error!("Local fallback '{}' failed: {e}", action.name());
            StoreResponse::error(e.to_string())
        })
    }

    pub async fn save_user(&self, user: &User, password_hash: &str) -> StoreResponse {
        self.post(StoreAction::SaveUser {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        })
        .await
    }

    pub async fn login_user(&self, email: &str, password_hash: &str) -> StoreResponse {
        self.post(StoreAction::LoginUser {
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
        .await
    }

    pub async fn save_resume(&self, entry: &ResumeEntry, file_data: Option<FileData>) -> StoreResponse {
        self.post(StoreAction::SaveResume {
            entry: entry.clone(),
            file_data,
        })
        .await
    }

    pub async fn save_answer(&self, entry: &AnswerEntry) -> StoreResponse {
        self.post(StoreAction::SaveAnswer {
            entry: entry.clone(),
        })
        .await
    }

    pub async fn update_user_model(&self, user_id: &str, model_choice: ModelChoice) -> StoreResponse {
        self.post(StoreAction::UpdateUserModel {
            user_id: user_id.to_string(),
            model_choice,
        })
        .await
    }

    pub async fn get_history(&self, user_id: &str) -> History {
        match self.remote.history(user_id).await {
            Ok(history) => history,
            Err(e) => {
                if !matches!(e, SyncError::NotConfigured) {
                    warn!("Remote history fetch failed: {e}; using local fallback");
                }
                self.fallback.history(user_id).await.unwrap_or_else(|e| {
                    error!("Local fallback history failed: {e}");
                    History::default()
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Scripted remote: records every action and answers from a fixed closure.
    pub struct FakeRemote {
        pub calls: Mutex<Vec<String>>,
        respond: Box<dyn Fn(&StoreAction) -> Result<StoreResponse, SyncError> + Send + Sync>,
    }

    impl FakeRemote {
        pub fn new(
            respond: impl Fn(&StoreAction) -> Result<StoreResponse, SyncError> + Send + Sync + 'static,
        ) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                respond: Box::new(respond),
            }
        }

        /// A remote that behaves as if no endpoint were configured.
        pub fn offline() -> Self {
            Self::new(|_| Err(SyncError::NotConfigured))
        }

        pub fn call_names(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RecordStore for FakeRemote {
        async fn submit(&self, action: &StoreAction) -> Result<StoreResponse, SyncError> {
            self.calls.lock().unwrap().push(action.name().to_string());
            (self.respond)(action)
        }

        async fn history(&self, _user_id: &str) -> Result<History, SyncError> {
            self.calls.lock().unwrap().push("get_history".to_string());
            Err(SyncError::NotConfigured)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use serde_json::json;

    use super::testing::FakeRemote;
    use super::*;
    use crate::local_store::LocalStore;

    fn sample_user() -> User {
        User {
            user_id: "user_a_x_com".to_string(),
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            model_choice: ModelChoice::Flash,
            created_at: Utc::now(),
        }
    }

    fn client_with(remote: FakeRemote, local: &LocalStore) -> StoreClient {
        StoreClient::new(
            Arc::new(remote),
            Arc::new(FallbackStore::new(local.clone(), Duration::ZERO)),
        )
    }

    #[test]
    fn test_action_serializes_with_flattened_payload() {
        let action = StoreAction::SaveUser {
            user: sample_user(),
            password_hash: "h".to_string(),
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["action"], "save_user");
        assert_eq!(value["user_id"], "user_a_x_com");
        assert_eq!(value["model_choice"], "gemini-2.5-flash");
        assert_eq!(value["password_hash"], "h");
    }

    #[test]
    fn test_update_model_action_shape() {
        let action = StoreAction::UpdateUserModel {
            user_id: "user_a_x_com".to_string(),
            model_choice: ModelChoice::Pro,
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "action": "update_user_model",
                "user_id": "user_a_x_com",
                "model_choice": "gemini-3-pro-preview"
            })
        );
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let response: StoreResponse =
            serde_json::from_str(r#"{"status": "offline_success"}"#).unwrap();
        assert_eq!(response.status, StoreStatus::Unknown);
        assert!(!response.is_success());
    }

    #[test]
    fn test_permission_message_detected() {
        let response = StoreResponse {
            status: StoreStatus::Success,
            message: Some(
                "[Upload Error: You do not have permission to call DriveApp.createFolder]"
                    .to_string(),
            ),
            user: None,
        };
        assert!(response.is_permission_denied());
        assert!(!StoreResponse::success().is_permission_denied());
    }

    #[tokio::test]
    async fn test_remote_response_is_returned_untouched() {
        let local = LocalStore::in_memory();
        let client = client_with(
            FakeRemote::new(|_| Ok(StoreResponse::error("Sheet is full"))),
            &local,
        );
        let response = client.save_user(&sample_user(), "h").await;
        assert_eq!(response, StoreResponse::error("Sheet is full"));

        // Nothing reached the fallback collections.
        let history = client.get_history("user_a_x_com").await;
        assert!(history.resumes.is_empty());
    }

    #[tokio::test]
    async fn test_offline_remote_degrades_to_fallback() {
        let local = LocalStore::in_memory();
        let client = client_with(FakeRemote::offline(), &local);

        let response = client.save_user(&sample_user(), "h").await;
        assert!(response.is_success());

        let users: Vec<serde_json::Value> = local
            .get_list(crate::local_store::USERS_KEY)
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_history_for_new_user_is_empty() {
        let local = LocalStore::in_memory();
        let client = client_with(FakeRemote::offline(), &local);
        let history = client.get_history("user_nobody").await;
        assert_eq!(history, History::default());
    }
}
