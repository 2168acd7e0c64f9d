use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::local_store::LocalStore;
use crate::record_store::{EndpointResolver, FallbackStore, RecordStore, StoreClient};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub local: LocalStore,
    pub endpoint: EndpointResolver,
    pub store: StoreClient,
    pub auth: AuthService,
    pub llm: LlmClient,
}

impl AppState {
    /// Wires the store layers around `remote`. The endpoint resolver must be
    /// the one `remote` reads from so settings changes take effect immediately.
    pub fn new(
        config: Config,
        local: LocalStore,
        endpoint: EndpointResolver,
        remote: Arc<dyn RecordStore>,
        llm: LlmClient,
    ) -> Self {
        let fallback = Arc::new(FallbackStore::new(local.clone(), config.fallback_latency));
        let store = StoreClient::new(remote, fallback);
        let auth = AuthService::new(local.clone(), store.clone());
        Self {
            config,
            local,
            endpoint,
            store,
            auth,
            llm,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::time::Duration;

    use super::AppState;
    use crate::config::{Config, DEFAULT_LOCAL_STORE, DEFAULT_MAX_UPLOAD_BYTES};
    use crate::llm_client::{testing::unreachable_client, LlmClient, DEFAULT_API_BASE};
    use crate::local_store::LocalStore;
    use crate::models::user::User;
    use crate::record_store::{testing::FakeRemote, EndpointResolver};

    pub fn test_config() -> Config {
        Config {
            gemini_api_key: "test-key".to_string(),
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            store_endpoint_url: None,
            local_store: DEFAULT_LOCAL_STORE.to_string(),
            fallback_latency: Duration::ZERO,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    /// In-memory state with the given remote and model client.
    pub fn state_with(remote: FakeRemote, llm: LlmClient) -> (AppState, Arc<FakeRemote>) {
        let local = LocalStore::in_memory();
        let remote = Arc::new(remote);
        let endpoint = EndpointResolver::new(local.clone(), None);
        let state = AppState::new(test_config(), local, endpoint, remote.clone(), llm);
        (state, remote)
    }

    /// Offline state with no reachable model.
    pub fn offline_state() -> AppState {
        state_with(FakeRemote::offline(), unreachable_client()).0
    }

    /// Signs up a user so requests pass the session check.
    pub async fn signed_in(state: &AppState) -> User {
        state.auth.signup("a@x.com", "Ada", "secret1").await.unwrap()
    }
}
