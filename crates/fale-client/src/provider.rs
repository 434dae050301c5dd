//! Persisted provider/model choice.

use std::sync::Mutex;

use fale_shared::providers::ProviderSelection;
use fale_shared::types::ApiKeyRecord;
use fale_shared::Result;

use crate::resources::api_keys::active_providers;
use crate::storage::SharedDatabase;

pub struct ProviderPreferences {
    db: SharedDatabase,
    selection: Mutex<ProviderSelection>,
}

impl ProviderPreferences {
    pub fn load(db: SharedDatabase) -> Result<Self> {
        let selection = db.with(|d| d.load_provider_selection())?;
        tracing::debug!(
            provider = selection.provider(),
            model = selection.model(),
            "loaded provider selection"
        );
        Ok(Self {
            db,
            selection: Mutex::new(selection),
        })
    }

    pub fn selection(&self) -> ProviderSelection {
        self.selection
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Switch provider; the model resets to the provider's default.
    pub fn set_provider(&self, provider: &str) -> Result<ProviderSelection> {
        self.update(|sel| Ok(sel.set_provider(provider).map(|_| true)?))
    }

    pub fn set_model(&self, model: &str) -> Result<ProviderSelection> {
        self.update(|sel| Ok(sel.set_model(model).map(|_| true)?))
    }

    /// Move to the first provider with an active key when the current one
    /// has none. Returns whether the selection changed.
    pub fn reconcile(&self, keys: &[ApiKeyRecord]) -> Result<bool> {
        let before = self.selection();
        let after = self.update(|sel| Ok(sel.reconcile(active_providers(keys))))?;
        let changed = before != after;
        if changed {
            tracing::info!(
                provider = after.provider(),
                model = after.model(),
                "selected provider has no active key, switched"
            );
        }
        Ok(changed)
    }

    /// Apply `f` to a copy; persist and publish it only when `f` succeeds
    /// and reports a change.
    fn update<F>(&self, f: F) -> Result<ProviderSelection>
    where
        F: FnOnce(&mut ProviderSelection) -> Result<bool>,
    {
        let mut guard = self.selection.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = guard.clone();
        if f(&mut next)? {
            self.db.with(|d| d.save_provider_selection(&next))?;
            *guard = next;
        }
        Ok(guard.clone())
    }
}
