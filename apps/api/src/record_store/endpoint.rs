use serde::Serialize;

use crate::local_store::{LocalStore, LocalStoreError, SCRIPT_URL_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointSource {
    /// Set at runtime through the settings route and kept in the local store.
    Override,
    /// `STORE_ENDPOINT_URL` from the environment.
    Config,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub source: EndpointSource,
}

/// Decides which remote store URL, if any, requests go to.
#[derive(Clone)]
pub struct EndpointResolver {
    local: LocalStore,
    default_url: Option<String>,
}

impl EndpointResolver {
    pub fn new(local: LocalStore, default_url: Option<String>) -> Self {
        let default_url = default_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Self { local, default_url }
    }

    pub async fn resolve(&self) -> Result<Option<ResolvedEndpoint>, LocalStoreError> {
        let stored: Option<String> = self.local.get(SCRIPT_URL_KEY).await?;
        if let Some(url) = stored.filter(|u| !u.is_empty()) {
            return Ok(Some(ResolvedEndpoint {
                url,
                source: EndpointSource::Override,
            }));
        }
        Ok(self.default_url.clone().map(|url| ResolvedEndpoint {
            url,
            source: EndpointSource::Config,
        }))
    }

    /// Stores a trimmed override, or removes it when `url` is `None` or blank.
    pub async fn set_override(&self, url: Option<&str>) -> Result<(), LocalStoreError> {
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => self.local.set(SCRIPT_URL_KEY, url).await,
            None => self.local.remove(SCRIPT_URL_KEY).await,
        }
    }
}
