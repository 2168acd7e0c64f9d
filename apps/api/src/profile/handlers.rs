use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::extractors::CurrentUser;
use crate::errors::AppError;
use crate::models::user::{ModelChoice, User};
use crate::record_store::ResolvedEndpoint;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ModelOption {
    pub id: ModelChoice,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub model_label: &'static str,
    pub available_models: Vec<ModelOption>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateModelRequest {
    pub model_choice: ModelChoice,
}

#[derive(Debug, Serialize)]
pub struct UpdateModelResponse {
    pub user: User,
    /// Whether the store accepted the change. The session is updated regardless.
    pub synced: bool,
}

#[derive(Debug, Serialize)]
pub struct StoreSettingsResponse {
    /// False means every record goes to the local fallback store.
    pub connected: bool,
    pub endpoint: Option<ResolvedEndpoint>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStoreRequest {
    /// `None` or blank clears the override.
    pub url: Option<String>,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        model_label: user.model_choice.label(),
        available_models: ModelChoice::ALL
            .into_iter()
            .map(|id| ModelOption {
                id,
                label: id.label(),
            })
            .collect(),
        user,
    })
}

/// PUT /api/v1/profile/model
pub async fn handle_update_model(
    State(state): State<AppState>,
    CurrentUser(mut user): CurrentUser,
    Json(req): Json<UpdateModelRequest>,
) -> Result<Json<UpdateModelResponse>, AppError> {
    let response = state
        .store
        .update_user_model(&user.user_id, req.model_choice)
        .await;
    if !response.is_success() {
        warn!(
            "Model change for {} not synced: {}",
            user.user_id,
            response.message.as_deref().unwrap_or("no message")
        );
    }

    user.model_choice = req.model_choice;
    state.auth.refresh_session(&user).await?;
    info!("{} now generates with {}", user.user_id, user.model_choice);

    Ok(Json(UpdateModelResponse {
        user,
        synced: response.is_success(),
    }))
}

async fn store_settings(state: &AppState) -> Result<StoreSettingsResponse, AppError> {
    let endpoint = state.endpoint.resolve().await?;
    Ok(StoreSettingsResponse {
        connected: endpoint.is_some(),
        endpoint,
    })
}

/// GET /api/v1/settings/store
pub async fn handle_get_store_settings(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<StoreSettingsResponse>, AppError> {
    Ok(Json(store_settings(&state).await?))
}

/// PUT /api/v1/settings/store
pub async fn handle_update_store_settings(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(req): Json<UpdateStoreRequest>,
) -> Result<Json<StoreSettingsResponse>, AppError> {
    let url = req.url.as_deref().map(str::trim).filter(|u| !u.is_empty());
    if let Some(url) = url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(AppError::Validation(
                "The store URL must start with http:// or https://".to_string(),
            ));
        }
    }

    state.endpoint.set_override(url).await?;
    match url {
        Some(url) => info!("Remote store override set to {url}"),
        None => info!("Remote store override cleared"),
    }
    Ok(Json(store_settings(&state).await?))
}

/// DELETE /api/v1/settings/local-data
/// Wipes the session, credential cache, endpoint override and fallback records.
/// Works without a session, like clearing a browser profile's site data.
pub async fn handle_clear_local_data(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.local.clear().await?;
    warn!("Local store cleared");
    Ok(StatusCode::NO_CONTENT)
}
