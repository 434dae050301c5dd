//! Typed accessors over the settings table for each persisted concern.

use fale_shared::constants::storage_keys;
use fale_shared::providers::ProviderSelection;
use fale_shared::types::ThemeMode;

use crate::database::Database;
use crate::error::Result;

/// The token pair as last persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Database {
    // -- session tokens --------------------------------------------------

    pub fn load_tokens(&self) -> Result<StoredTokens> {
        Ok(StoredTokens {
            access_token: self.get_setting(storage_keys::ACCESS_TOKEN)?,
            refresh_token: self.get_setting(storage_keys::REFRESH_TOKEN)?,
        })
    }

    /// Write both tokens in one transaction.
    pub fn save_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.conn().execute_batch("BEGIN IMMEDIATE")?;
        let result = self
            .set_setting(storage_keys::ACCESS_TOKEN, access_token)
            .and_then(|_| self.set_setting(storage_keys::REFRESH_TOKEN, refresh_token));
        match result {
            Ok(()) => {
                self.conn().execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn().execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    pub fn save_access_token(&self, access_token: &str) -> Result<()> {
        self.set_setting(storage_keys::ACCESS_TOKEN, access_token)
    }

    pub fn clear_tokens(&self) -> Result<()> {
        self.remove_setting(storage_keys::ACCESS_TOKEN)?;
        self.remove_setting(storage_keys::REFRESH_TOKEN)?;
        Ok(())
    }

    // -- provider / model ------------------------------------------------

    pub fn load_provider_selection(&self) -> Result<ProviderSelection> {
        let provider = self.get_setting(storage_keys::SELECTED_PROVIDER)?;
        let model = self.get_setting(storage_keys::SELECTED_MODEL)?;
        Ok(ProviderSelection::from_stored(
            provider.as_deref(),
            model.as_deref(),
        ))
    }

    pub fn save_provider_selection(&self, selection: &ProviderSelection) -> Result<()> {
        self.set_setting(storage_keys::SELECTED_PROVIDER, selection.provider())?;
        self.set_setting(storage_keys::SELECTED_MODEL, selection.model())
    }

    // -- theme -----------------------------------------------------------

    pub fn load_theme(&self) -> Result<ThemeMode> {
        Ok(self
            .get_setting(storage_keys::THEME_MODE)?
            .map(|raw| ThemeMode::parse_lenient(&raw))
            .unwrap_or_default())
    }

    pub fn save_theme(&self, mode: ThemeMode) -> Result<()> {
        self.set_setting(storage_keys::THEME_MODE, mode.as_str())
    }
}
