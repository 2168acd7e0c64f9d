//! Credential and session management.
//!
//! Credentials are cached locally by normalized email; the remote store is
//! asked first on login and mirrored into the cache when it answers.

use std::collections::BTreeMap;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::local_store::{LocalStore, LocalStoreError, AUTH_DB_KEY, SESSION_KEY};
use crate::models::user::{CredentialRecord, ModelChoice, User};
use crate::record_store::StoreClient;

pub mod extractors;
pub mod handlers;
pub mod password;

use password::{derive_user_id, hash_password, normalize_email, verify_password};

pub const MIN_PASSWORD_LEN: usize = 6;

type CredentialMap = BTreeMap<String, CredentialRecord>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists. Please log in.")]
    DuplicateUser,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Local store error: {0}")]
    Store(#[from] LocalStoreError),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AuthService {
    local: LocalStore,
    store: StoreClient,
}

impl AuthService {
    pub fn new(local: LocalStore, store: StoreClient) -> Self {
        Self { local, store }
    }

    pub async fn signup(&self, email: &str, name: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        let name = name.trim();
        validate_email(email)?;
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required.".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        let key = normalize_email(email);
        let user = User {
            user_id: derive_user_id(email),
            email: email.to_string(),
            name: name.to_string(),
            model_choice: ModelChoice::Flash,
            created_at: Utc::now(),
        };
        let hash = hash_password(email, password)?;
        let record = CredentialRecord {
            user_id: user.user_id.clone(),
            hash: hash.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
        };

        // Existence check and insert happen under one lock so two signups
        // for the same email cannot both succeed.
        let inserted = self
            .local
            .update(AUTH_DB_KEY, |credentials: &mut CredentialMap| {
                if credentials.contains_key(&key) {
                    return false;
                }
                credentials.insert(key, record);
                true
            })
            .await?;
        if !inserted {
            return Err(AuthError::DuplicateUser);
        }

        let response = self.store.save_user(&user, &hash).await;
        if !response.is_success() {
            warn!(
                "Remote sync of new user {} failed: {}",
                user.user_id,
                response.message.as_deref().unwrap_or("no message")
            );
        }

        self.local.set(SESSION_KEY, &user).await?;
        info!("Signed up {}", user.user_id);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        validate_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required.".to_string()));
        }

        let key = normalize_email(email);
        let hash = hash_password(email, password)?;

        let response = self.store.login_user(&key, &hash).await;
        let remote_user = if response.is_success() {
            response.user
        } else {
            None
        };
        let user = match remote_user {
            Some(remote_user) => {
                self.local
                    .update(AUTH_DB_KEY, |credentials: &mut CredentialMap| {
                        let hash = credentials
                            .get(&key)
                            .map(|cached| cached.hash.clone())
                            .unwrap_or(hash);
                        credentials.insert(
                            key,
                            CredentialRecord {
                                user_id: remote_user.user_id.clone(),
                                hash,
                                name: remote_user.name.clone(),
                                created_at: remote_user.created_at,
                            },
                        );
                    })
                    .await?;
                info!("Logged in {} via remote store", remote_user.user_id);
                remote_user
            }
            None => {
                let credentials = self.credentials().await?;
                let record = credentials
                    .get(&key)
                    .ok_or(AuthError::InvalidCredentials)?;
                if !verify_password(password, &record.hash).unwrap_or(false) {
                    return Err(AuthError::InvalidCredentials);
                }
                info!("Logged in {} from local credentials", record.user_id);
                User {
                    user_id: record.user_id.clone(),
                    email: email.to_string(),
                    name: record.name.clone(),
                    model_choice: ModelChoice::Flash,
                    created_at: record.created_at,
                }
            }
        };

        self.local.set(SESSION_KEY, &user).await?;
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.local.remove(SESSION_KEY).await?;
        Ok(())
    }

    /// Reads the session record. Never touches the network.
    pub async fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.local.get(SESSION_KEY).await?)
    }

    /// Replaces the session record, e.g. after a model choice change.
    pub async fn refresh_session(&self, user: &User) -> Result<(), AuthError> {
        self.local.set(SESSION_KEY, user).await?;
        Ok(())
    }

    async fn credentials(&self) -> Result<CredentialMap, AuthError> {
        Ok(self.local.get(AUTH_DB_KEY).await?.unwrap_or_default())
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation(
            "A valid email address is required.".to_string(),
        ));
    }
    Ok(())
}
