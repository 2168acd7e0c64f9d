use axum::{extract::State, Json};

use crate::auth::extractors::CurrentUser;
use crate::models::history::History;
use crate::state::AppState;

/// GET /api/v1/history
/// Remote history when reachable, the local fallback otherwise. Never fails once signed in.
pub async fn handle_get_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<History> {
    Json(state.store.get_history(&user.user_id).await)
}
