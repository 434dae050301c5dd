use fale_shared::constants::endpoints;
use fale_shared::protocol::{AddApiKeyRequest, ApiKeyList, DeleteApiKeyRequest};
use fale_shared::providers::find_provider;
use fale_shared::types::{ApiKeyId, ApiKeyRecord};
use fale_shared::{Result, ValidationError};

use crate::http::{ApiClient, ApiRequest};

/// The user's provider API keys. Key material is write-only: the backend
/// only ever returns metadata.
pub struct ApiKeyManager {
    api: ApiClient,
    keys: Vec<ApiKeyRecord>,
}

impl ApiKeyManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            keys: Vec::new(),
        }
    }

    pub fn keys(&self) -> &[ApiKeyRecord] {
        &self.keys
    }

    /// Providers with an active key, in the backend's order.
    pub fn active_providers(&self) -> Vec<&str> {
        active_providers(&self.keys)
    }

    pub async fn refresh(&mut self) -> Result<&[ApiKeyRecord]> {
        let list: ApiKeyList = self.api.get(endpoints::API_KEYS).await?;
        tracing::debug!(count = list.api_keys.len(), "loaded api keys");
        self.keys = list.api_keys;
        Ok(&self.keys)
    }

    pub async fn add(&mut self, provider: &str, api_key: &str) -> Result<()> {
        if find_provider(provider).is_none() {
            return Err(ValidationError::UnknownProvider(provider.to_string()).into());
        }
        if api_key.trim().is_empty() {
            return Err(ValidationError::MissingField("api_key").into());
        }

        let body = AddApiKeyRequest {
            provider: provider.to_string(),
            api_key: api_key.trim().to_string(),
        };
        self.api
            .send(ApiRequest::post(endpoints::API_KEYS).json(&body)?)
            .await?;
        tracing::info!(provider, "api key added");

        self.refresh().await?;
        Ok(())
    }

    pub async fn remove(&mut self, id: ApiKeyId) -> Result<()> {
        self.api
            .send(ApiRequest::delete(endpoints::API_KEYS).json(&DeleteApiKeyRequest { id })?)
            .await?;
        tracing::info!(key_id = %id, "api key removed");

        self.refresh().await?;
        Ok(())
    }
}

pub(crate) fn active_providers(keys: &[ApiKeyRecord]) -> Vec<&str> {
    keys.iter()
        .filter(|k| k.is_active)
        .map(|k| k.provider.as_str())
        .collect()
}
