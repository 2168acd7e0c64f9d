pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::export::handlers as export;
use crate::generation::handlers as generation;
use crate::history::handlers as history;
use crate::profile::handlers as profile;
use crate::state::AppState;

/// Request bodies may exceed the upload limit so oversized files reach validation
/// and get a size-specific message instead of a bare 413.
fn body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_mul(4).max(2 * 1024 * 1024)
}

pub fn build_router(state: AppState) -> Router {
    let limit = body_limit(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/signup", post(auth::handle_signup))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Workspace
        .route(
            "/api/v1/resumes/tailor",
            post(generation::handle_tailor_resume),
        )
        .route(
            "/api/v1/answers/generate",
            post(generation::handle_generate_answers),
        )
        // History & export
        .route("/api/v1/history", get(history::handle_get_history))
        .route(
            "/api/v1/history/resumes/:id/download",
            get(export::handle_download_resume),
        )
        .route(
            "/api/v1/history/resumes/:id/print",
            get(export::handle_print_resume),
        )
        .route(
            "/api/v1/history/jobs/:job_id/answers/download",
            get(export::handle_download_answers),
        )
        // Profile & settings
        .route("/api/v1/profile", get(profile::handle_get_profile))
        .route("/api/v1/profile/model", put(profile::handle_update_model))
        .route(
            "/api/v1/settings/store",
            get(profile::handle_get_store_settings).put(profile::handle_update_store_settings),
        )
        .route(
            "/api/v1/settings/local-data",
            delete(profile::handle_clear_local_data),
        )
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        response::Response,
    };
    use serde_json::Value;

    const BOUNDARY: &str = "resumate-test-boundary";

    pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// One part of a multipart/form-data body.
    pub struct FormPart {
        name: String,
        file: Option<(String, String)>,
        data: Vec<u8>,
    }

    impl FormPart {
        pub fn text(name: &str, value: &str) -> Self {
            Self {
                name: name.to_string(),
                file: None,
                data: value.as_bytes().to_vec(),
            }
        }

        pub fn file(name: &str, file_name: &str, content_type: &str, data: Vec<u8>) -> Self {
            Self {
                name: name.to_string(),
                file: Some((file_name.to_string(), content_type.to_string())),
                data,
            }
        }
    }

    pub fn multipart_request(uri: &str, parts: Vec<FormPart>) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match &part.file {
                Some((file_name, content_type)) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
                ),
            }
            body.extend_from_slice(&part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }
}
