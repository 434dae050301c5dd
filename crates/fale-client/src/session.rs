//! Session store: the access/refresh token pair and everything derived
//! from it.
//!
//! State machine:
//! `Anonymous -> (login/register) -> Authenticated -> (expiry) -> Refreshing
//! -> Authenticated | Anonymous`.
//!
//! `is_authenticated` is never stored; it is recomputed from the access
//! token and the clock on every call. Refreshes are single-flight: callers
//! that lose the race for the refresh lock reuse the winner's outcome.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use fale_shared::constants::endpoints;
use fale_shared::protocol::{AuthResponse, LoginRequest, RefreshResponse, RegisterRequest};
use fale_shared::token::{decode_claims, is_token_expired, is_token_expired_at};
use fale_shared::types::{RegisterProfile, UserProfile};
use fale_shared::validation::{validate_login, validate_registration};
use fale_shared::{AuthError, ClientError, Result};
use fale_store::StoredTokens;

use crate::events::{EventBus, SessionEvent};
use crate::http::{ApiRequest, Transport};
use crate::storage::SharedDatabase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    Anonymous,
    Refreshing,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionData {
    access_token: Option<String>,
    refresh_token: Option<String>,
    profile: Option<UserProfile>,
    /// Bumped on every token change so a refresh waiter can tell that
    /// someone else already renewed (or ended) the session.
    generation: u64,
}

pub struct SessionStore {
    transport: Transport,
    db: SharedDatabase,
    events: EventBus,
    data: RwLock<SessionData>,
    refresh_lock: AsyncMutex<()>,
}

impl SessionStore {
    pub fn new(transport: Transport, db: SharedDatabase, events: EventBus) -> Self {
        Self {
            transport,
            db,
            events,
            data: RwLock::new(SessionData::default()),
            refresh_lock: AsyncMutex::new(()),
        }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionData> {
        self.data.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionData> {
        self.data.write().unwrap_or_else(|e| e.into_inner())
    }

    // -----------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn has_access_token(&self) -> bool {
        self.read().access_token.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        !is_token_expired_at(self.read().access_token.as_deref(), now)
    }

    pub fn state(&self) -> AuthState {
        if self.refresh_lock.try_lock().is_err() {
            AuthState::Refreshing
        } else if self.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    /// `sub` claim of the current access token.
    pub fn user_id(&self) -> Option<String> {
        let token = self.access_token()?;
        decode_claims(&token).ok()?.user_id()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let token = self.access_token()?;
        decode_claims(&token).ok()?.expires_at()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    pub fn set_profile(&self, profile: Option<UserProfile>) {
        self.write().profile = profile;
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Rebuild the session from persisted tokens. An expired access token
    /// goes straight into a refresh.
    pub async fn restore(&self) -> AuthState {
        let stored = self.db.with(|db| db.load_tokens()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read persisted tokens");
            StoredTokens::default()
        });

        let had_tokens = stored.access_token.is_some() || stored.refresh_token.is_some();
        {
            let mut data = self.write();
            data.access_token = stored.access_token;
            data.refresh_token = stored.refresh_token;
            data.profile = None;
            data.generation += 1;
        }

        if self.is_authenticated() {
            tracing::info!(user_id = ?self.user_id(), "restored session");
            return AuthState::Authenticated;
        }
        if !had_tokens {
            return AuthState::Anonymous;
        }

        tracing::info!("persisted access token expired, refreshing");
        match self.refresh_access_token().await {
            Ok(_) => AuthState::Authenticated,
            Err(_) => AuthState::Anonymous,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        validate_login(email, password)?;
        let request = ApiRequest::post(endpoints::AUTH_LOGIN).json(&LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        })?;
        self.authenticate(request).await
    }

    pub async fn register(&self, profile: &RegisterProfile) -> Result<()> {
        validate_registration(profile)?;
        let request =
            ApiRequest::post(endpoints::AUTH_REGISTER).json(&RegisterRequest::from(profile))?;
        self.authenticate(request).await
    }

    async fn authenticate(&self, request: ApiRequest) -> Result<()> {
        let response = self.transport.execute(&request, None).await?;

        if response.status == 401 {
            let message = response
                .server_message()
                .unwrap_or_else(|| "Invalid email or password".to_string());
            tracing::info!(path = %request.path, "authentication rejected");
            return Err(AuthError::InvalidCredentials { message }.into());
        }

        let auth: AuthResponse = response.into_result()?.json()?;
        self.establish(auth);
        Ok(())
    }

    fn establish(&self, auth: AuthResponse) {
        if let Err(e) = self
            .db
            .with(|db| db.save_tokens(&auth.access_token, &auth.refresh_token))
        {
            tracing::warn!(error = %e, "could not persist tokens");
        }

        {
            let mut data = self.write();
            data.access_token = Some(auth.access_token);
            data.refresh_token = Some(auth.refresh_token);
            data.profile = auth.user;
            data.generation += 1;
        }

        let user_id = self.user_id();
        tracing::info!(user_id = ?user_id, "logged in");
        self.events.emit(SessionEvent::LoggedIn { user_id });
    }

    /// Clear the session locally and tell the backend in the background.
    /// Never waits on the backend.
    pub fn logout(&self) {
        if let Some(token) = self.end_session() {
            self.notify_logout(token);
        }
    }

    /// Returns the access token that was in use, if any.
    fn end_session(&self) -> Option<String> {
        let previous = {
            let mut data = self.write();
            let had_session = data.access_token.is_some() || data.refresh_token.is_some();
            data.refresh_token = None;
            data.profile = None;
            data.generation += 1;
            let token = data.access_token.take();
            had_session.then_some(token)
        };

        if let Err(e) = self.db.with(|db| db.clear_tokens()) {
            tracing::warn!(error = %e, "could not clear persisted tokens");
        }

        match previous {
            Some(token) => {
                tracing::info!("logged out");
                self.events.emit(SessionEvent::LoggedOut);
                token
            }
            None => None,
        }
    }

    fn notify_logout(&self, token: String) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime, skipping logout notification");
            return;
        };
        let transport = self.transport.clone();
        handle.spawn(async move {
            let request = ApiRequest::post(endpoints::AUTH_LOGOUT);
            match transport.execute(&request, Some(&token)).await {
                Ok(r) if r.is_success() => tracing::debug!("backend acknowledged logout"),
                Ok(r) => tracing::debug!(status = r.status, "logout notification rejected"),
                Err(e) => tracing::debug!(error = %e, "logout notification failed"),
            }
        });
    }

    // -----------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------

    /// Exchange the refresh token for a new access token. On failure the
    /// session is logged out and `SessionExpired` is returned, or
    /// `NotLoggedIn` when there was no session to begin with.
    pub async fn refresh_access_token(&self) -> Result<String> {
        let observed = self.read().generation;
        self.refresh_since(observed).await
    }

    /// Token to attach to an outgoing request, refreshed first if expired,
    /// together with the generation it belongs to.
    pub(crate) async fn bearer_for_request(&self) -> Result<(Option<String>, u64)> {
        let (token, generation) = {
            let data = self.read();
            (data.access_token.clone(), data.generation)
        };

        match token {
            None => Ok((None, generation)),
            Some(token) if !is_token_expired(Some(&token)) => Ok((Some(token), generation)),
            Some(_) => {
                tracing::debug!("access token expired before send");
                let fresh = self.refresh_since(generation).await?;
                let generation = self.read().generation;
                Ok((Some(fresh), generation))
            }
        }
    }

    /// Refresh unless the tokens changed after `observed`; in that case the
    /// current outcome is reused.
    pub(crate) async fn refresh_since(&self, observed: u64) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        let (refresh_token, access_token, generation) = {
            let data = self.read();
            (
                data.refresh_token.clone(),
                data.access_token.clone(),
                data.generation,
            )
        };

        if generation != observed {
            return match access_token {
                Some(token) if !is_token_expired(Some(&token)) => Ok(token),
                _ => Err(AuthError::SessionExpired.into()),
            };
        }

        let Some(refresh_token) = refresh_token else {
            tracing::info!("no refresh token available");
            self.force_logout();
            return Err(match access_token {
                Some(_) => AuthError::SessionExpired.into(),
                None => AuthError::NotLoggedIn.into(),
            });
        };

        let request = ApiRequest::post(endpoints::AUTH_REFRESH);
        let outcome = match self.transport.execute(&request, Some(&refresh_token)).await {
            Ok(response) => response
                .into_result()
                .and_then(|r| r.json::<RefreshResponse>()),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(RefreshResponse { access_token }) => {
                if let Err(e) = self.db.with(|db| db.save_access_token(&access_token)) {
                    tracing::warn!(error = %e, "could not persist refreshed token");
                }
                {
                    let mut data = self.write();
                    data.access_token = Some(access_token.clone());
                    data.generation += 1;
                }
                tracing::info!("access token refreshed");
                self.events.emit(SessionEvent::TokenRefreshed);
                Ok(access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed, logging out");
                self.force_logout();
                Err(ClientError::Auth(AuthError::SessionExpired))
            }
        }
    }

    fn force_logout(&self) {
        self.logout();
        self.events.emit(SessionEvent::AuthenticationRequired);
    }
}
