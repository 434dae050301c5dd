//! Persisted light/dark preference.

use std::sync::Mutex;

use fale_shared::types::ThemeMode;
use fale_shared::Result;

use crate::storage::SharedDatabase;

pub struct ThemePreference {
    db: SharedDatabase,
    mode: Mutex<ThemeMode>,
}

impl ThemePreference {
    pub fn load(db: SharedDatabase) -> Result<Self> {
        let mode = db.with(|d| d.load_theme())?;
        Ok(Self {
            db,
            mode: Mutex::new(mode),
        })
    }

    pub fn mode(&self) -> ThemeMode {
        *self.mode.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, mode: ThemeMode) -> Result<()> {
        let mut guard = self.mode.lock().unwrap_or_else(|e| e.into_inner());
        self.db.with(|d| d.save_theme(mode))?;
        *guard = mode;
        Ok(())
    }

    pub fn toggle(&self) -> Result<ThemeMode> {
        let next = self.mode().toggled();
        self.set(next)?;
        tracing::debug!(mode = %next, "theme toggled");
        Ok(next)
    }
}
