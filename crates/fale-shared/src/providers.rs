//! The LLM providers the backend can route a chat to, and the user's
//! current provider/model choice.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MODEL, DEFAULT_PROVIDER};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    /// The first entry is the provider's default model.
    pub models: &'static [&'static str],
}

impl ProviderInfo {
    pub fn default_model(&self) -> &'static str {
        self.models.first().copied().unwrap_or_default()
    }

    pub fn offers(&self, model: &str) -> bool {
        self.models.contains(&model)
    }
}

pub const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        id: "openai",
        display_name: "OpenAI",
        models: &["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo"],
    },
    ProviderInfo {
        id: "anthropic",
        display_name: "Claude",
        models: &["claude-3-opus", "claude-3-sonnet", "claude-3-haiku"],
    },
    ProviderInfo {
        id: "google",
        display_name: "Gemini",
        models: &["gemini-pro", "gemini-ultra"],
    },
    ProviderInfo {
        id: "mistral",
        display_name: "Mistral AI",
        models: &["mistral-tiny", "mistral-small", "mistral-large"],
    },
    ProviderInfo {
        id: "llama",
        display_name: "Llama",
        models: &["llama-3"],
    },
    ProviderInfo {
        id: "cohere",
        display_name: "Cohere",
        models: &["command", "command-r", "command-light"],
    },
];

pub fn find_provider(id: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.id == id)
}

/// Provider and model used for the next chat request.
///
/// The model always belongs to the provider: every provider change resets
/// the model to that provider's default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSelection {
    provider: String,
    model: String,
}

impl Default for ProviderSelection {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ProviderSelection {
    /// Rebuild a selection from persisted values. Unknown providers fall
    /// back to the default selection and unknown models to the provider's
    /// default model.
    pub fn from_stored(provider: Option<&str>, model: Option<&str>) -> Self {
        let Some(info) = provider.and_then(find_provider) else {
            return Self::default();
        };
        let model = match model {
            Some(m) if info.offers(m) => m,
            _ => info.default_model(),
        };
        Self {
            provider: info.id.to_string(),
            model: model.to_string(),
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_provider(&mut self, provider: &str) -> Result<(), ValidationError> {
        let info = find_provider(provider)
            .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))?;
        self.provider = info.id.to_string();
        self.model = info.default_model().to_string();
        Ok(())
    }

    pub fn set_model(&mut self, model: &str) -> Result<(), ValidationError> {
        let offered = find_provider(&self.provider).is_some_and(|info| info.offers(model));
        if !offered {
            return Err(ValidationError::ModelNotOffered {
                provider: self.provider.clone(),
                model: model.to_string(),
            });
        }
        self.model = model.to_string();
        Ok(())
    }

    /// Cross-check against the providers the user holds an active key for,
    /// in the order the backend listed them.
    ///
    /// With no usable provider the selection is left alone. Returns whether
    /// the selection changed.
    pub fn reconcile<'a, I>(&mut self, active_providers: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let usable: Vec<&str> = active_providers
            .into_iter()
            .filter(|p| find_provider(p).is_some())
            .collect();

        if usable.is_empty() || usable.contains(&self.provider.as_str()) {
            return false;
        }

        self.set_provider(usable[0]).is_ok()
    }
}
