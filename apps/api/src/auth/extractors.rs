use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// The signed-in user, read from the session record.
/// Rejects with 401 when nobody is signed in.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = state.auth.current_user().await?;
        user.map(CurrentUser).ok_or(AppError::Unauthorized)
    }
}
