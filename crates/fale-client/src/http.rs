//! Outbound HTTP.
//!
//! [`Transport`] is the bare reqwest client bound to the backend's base URL.
//! [`ApiClient`] is the gateway every authenticated call goes through: it
//! attaches the bearer token, refreshes an expired token before sending and
//! retries a request exactly once after a 401.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fale_shared::protocol::ErrorBody;
use fale_shared::{AuthError, ClientError, Result};

use crate::config::ClientConfig;
use crate::session::SessionStore;

/// A request that can be sent more than once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Set before the single retry that follows a 401.
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ClientError::Decode(format!("request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Status and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Server-provided message, if the body carries one.
    pub fn server_message(&self) -> Option<String> {
        serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(ErrorBody::into_message)
    }

    /// The error this non-success response stands for. The server's own
    /// wording is kept; the HTTP reason phrase is the fallback.
    pub fn into_error(self) -> ClientError {
        let message = self.server_message().unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(self.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Request failed")
                .to_string()
        });
        ClientError::from_status(self.status, message)
    }

    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request` once. Any HTTP status is `Ok`; only transport
    /// failures (connect, timeout, body read) are errors.
    pub async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            retried = request.retried,
            authenticated = bearer.is_some(),
            "sending request"
        );

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(path = %request.path, error = %e, "request failed");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        tracing::debug!(path = %request.path, status, "received response");

        Ok(RawResponse { status, body })
    }
}

/// The authenticated gateway. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Send through the token lifecycle and return the successful response.
    ///
    /// 1. An expired access token is refreshed before sending.
    /// 2. A 401 on a request not yet retried triggers one refresh and one
    ///    retry. A 401 on the retry is returned as `Unauthorized`.
    /// 3. A failed refresh has already logged the session out; the caller
    ///    gets `SessionExpired`.
    pub async fn send(&self, mut request: ApiRequest) -> Result<RawResponse> {
        let (token, generation) = self.session.bearer_for_request().await?;
        let response = self
            .session
            .transport()
            .execute(&request, token.as_deref())
            .await?;

        if response.status != 401 || request.retried {
            return response.into_result();
        }

        request.retried = true;
        tracing::info!(path = %request.path, "got 401, refreshing token and retrying once");

        let fresh = self.session.refresh_since(generation).await?;
        let response = self
            .session
            .transport()
            .execute(&request, Some(&fresh))
            .await?;

        if response.status == 401 {
            let message = response
                .server_message()
                .unwrap_or_else(|| "Unauthorized".to_string());
            return Err(ClientError::Auth(AuthError::Unauthorized { message }));
        }
        response.into_result()
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.send(request).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::put(path).json(body)?).await
    }

    /// DELETE whose response body is not needed.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }
}
