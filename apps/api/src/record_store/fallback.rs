use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RecordStore, StoreAction, StoreResponse, SyncError};
use crate::local_store::{LocalStore, ANSWERS_KEY, RESUMES_KEY, USERS_KEY};
use crate::models::history::{AnswerEntry, History, ResumeEntry};
use crate::models::user::User;

pub const OFFLINE_LOGIN_MESSAGE: &str =
    "Offline login not supported in fallback. Please use Cloud Mode.";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    #[serde(flatten)]
    user: User,
    #[serde(default)]
    password_hash: String,
}

/// Offline emulation of the remote store over the local store.
///
/// Every call sleeps for `latency` first so the interface behaves the same
/// whichever store answered.
pub struct FallbackStore {
    local: LocalStore,
    latency: Duration,
}

impl FallbackStore {
    pub fn new(local: LocalStore, latency: Duration) -> Self {
        Self { local, latency }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl RecordStore for FallbackStore {
    async fn submit(&self, action: &StoreAction) -> Result<StoreResponse, SyncError> {
        self.simulate_latency().await;
        debug!("Local fallback handling '{}'", action.name());

        match action {
            StoreAction::SaveUser {
                user,
                password_hash,
            } => {
                self.local
                    .update(USERS_KEY, |users: &mut Vec<StoredUser>| {
                        if !users.iter().any(|u| u.user.user_id == user.user_id) {
                            users.push(StoredUser {
                                user: user.clone(),
                                password_hash: password_hash.clone(),
                            });
                        }
                    })
                    .await?;
                Ok(StoreResponse::success())
            }
            StoreAction::LoginUser { .. } => Ok(StoreResponse::error(OFFLINE_LOGIN_MESSAGE)),
            StoreAction::SaveResume { entry, .. } => {
                self.local
                    .update(RESUMES_KEY, |resumes: &mut Vec<ResumeEntry>| {
                        resumes.push(entry.clone())
                    })
                    .await?;
                Ok(StoreResponse::success())
            }
            StoreAction::SaveAnswer { entry } => {
                self.local
                    .update(ANSWERS_KEY, |answers: &mut Vec<AnswerEntry>| {
                        answers.push(entry.clone())
                    })
                    .await?;
                Ok(StoreResponse::success())
            }
            StoreAction::UpdateUserModel {
                user_id,
                model_choice,
            } => {
                self.local
                    .update(USERS_KEY, |users: &mut Vec<StoredUser>| {
                        if let Some(stored) = users.iter_mut().find(|u| &u.user.user_id == user_id) {
                            stored.user.model_choice = *model_choice;
                        }
                    })
                    .await?;
                Ok(StoreResponse::success())
            }
        }
    }

    async fn history(&self, user_id: &str) -> Result<History, SyncError> {
        self.simulate_latency().await;

        let resumes: Vec<ResumeEntry> = self.local.get_list(RESUMES_KEY).await?;
        let answers: Vec<AnswerEntry> = self.local.get_list(ANSWERS_KEY).await?;

        Ok(History {
            resumes: resumes
                .into_iter()
                .rev()
                .filter(|r| r.user_id == user_id)
                .collect(),
            answers: answers
                .into_iter()
                .rev()
                .filter(|a| a.user_id == user_id)
                .collect(),
        })
    }
}
