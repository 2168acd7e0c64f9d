use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::auth::extractors::CurrentUser;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = state.auth.signup(&req.email, &req.name, &req.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let user = state.auth.login(&req.email, &req.password).await?;
    Ok(Json(user))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.auth.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::build_router;
    use crate::routes::testing::{body_json, json_request};
    use crate::state::testing::offline_state;

    #[tokio::test]
    async fn test_signup_me_logout_flow() {
        let app = build_router(offline_state());

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/signup",
                json!({ "email": "a@x.com", "name": "Ada", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["user_id"], "user_a_x_com");

        let me = app
            .clone()
            .oneshot(Request::get("/api/v1/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);

        let logout = app
            .clone()
            .oneshot(Request::post("/api/v1/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(logout.status(), StatusCode::NO_CONTENT);

        let me = app
            .oneshot(Request::get("/api/v1/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_conflict() {
        let app = build_router(offline_state());
        let signup = json!({ "email": "a@x.com", "name": "Ada", "password": "secret1" });

        app.clone()
            .oneshot(json_request("POST", "/api/v1/auth/signup", signup.clone()))
            .await
            .unwrap();
        let response = app
            .oneshot(json_request("POST", "/api/v1/auth/signup", signup))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "User already exists. Please log in."
        );
    }

    #[tokio::test]
    async fn test_bad_login_is_unauthorized() {
        let app = build_router(offline_state());
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/v1/auth/login",
                json!({ "email": "nobody@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"]["code"], "INVALID_CREDENTIALS");
    }
}
