//! Application context shared by every front-end command.
//!
//! [`AppContext`] is built once at startup from configuration and the
//! persisted settings, and owns every long-lived component. Nothing in the
//! crate is a global.

use std::sync::Arc;

use fale_shared::types::DailyMessage;
use fale_shared::Result;

use crate::chat::ConversationController;
use crate::config::ClientConfig;
use crate::events::EventBus;
use crate::http::{ApiClient, Transport};
use crate::provider::ProviderPreferences;
use crate::resources::{ApiKeyManager, ConversationManager, NoteManager, PromptManager};
use crate::session::{AuthState, SessionStore};
use crate::storage::SharedDatabase;
use crate::theme::ThemePreference;

pub struct AppContext {
    pub config: ClientConfig,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub providers: Arc<ProviderPreferences>,
    pub theme: ThemePreference,
}

impl AppContext {
    /// Open the settings database named by `config` and restore the session
    /// from it.
    pub async fn initialize(config: ClientConfig) -> Result<Self> {
        let db = SharedDatabase::open(config.data_dir.as_deref())?;
        Self::with_database(config, db).await
    }

    /// Same as [`AppContext::initialize`] over an existing database handle.
    pub async fn with_database(config: ClientConfig, db: SharedDatabase) -> Result<Self> {
        let transport = Transport::new(&config)?;
        let session = Arc::new(SessionStore::new(transport, db.clone(), EventBus::new()));
        let api = ApiClient::new(Arc::clone(&session));
        let providers = Arc::new(ProviderPreferences::load(db.clone())?);
        let theme = ThemePreference::load(db)?;

        let ctx = Self {
            config,
            session,
            api,
            providers,
            theme,
        };

        let state = ctx.session.restore().await;
        tracing::info!(api_url = %ctx.config.api_url, ?state, "client initialised");

        if state == AuthState::Authenticated {
            if let Err(e) = ctx.api.load_profile().await {
                tracing::warn!(error = %e, "could not load profile");
            }
            if let Err(e) = ctx.sync_providers().await {
                tracing::warn!(error = %e, "could not reconcile provider selection");
            }
        }

        Ok(ctx)
    }

    pub fn chat(&self) -> ConversationController {
        ConversationController::new(self.api.clone(), Arc::clone(&self.providers))
    }

    pub fn api_keys(&self) -> ApiKeyManager {
        ApiKeyManager::new(self.api.clone())
    }

    pub fn conversations(&self) -> ConversationManager {
        ConversationManager::new(self.api.clone())
    }

    pub fn prompts(&self) -> PromptManager {
        PromptManager::new(self.api.clone())
    }

    pub fn notes(&self) -> NoteManager {
        NoteManager::new(self.api.clone())
    }

    pub async fn daily_message(&self) -> Result<Option<DailyMessage>> {
        self.api.daily_message_today().await
    }

    /// Load the user's keys and move the provider selection onto one that
    /// has an active key. Returns whether the selection changed.
    pub async fn sync_providers(&self) -> Result<bool> {
        let mut keys = self.api_keys();
        keys.refresh().await?;
        self.providers.reconcile(keys.keys())
    }

    /// Log in, then load the profile and reconcile the provider choice.
    /// Only the login itself can fail the call.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.session.login(email, password).await?;
        self.after_sign_in().await;
        Ok(())
    }

    pub async fn register(&self, profile: &fale_shared::types::RegisterProfile) -> Result<()> {
        self.session.register(profile).await?;
        self.after_sign_in().await;
        Ok(())
    }

    async fn after_sign_in(&self) {
        if self.session.profile().is_none() {
            if let Err(e) = self.api.load_profile().await {
                tracing::warn!(error = %e, "could not load profile");
            }
        }
        if let Err(e) = self.sync_providers().await {
            tracing::warn!(error = %e, "could not reconcile provider selection");
        }
    }

    pub fn logout(&self) {
        self.session.logout();
    }
}
