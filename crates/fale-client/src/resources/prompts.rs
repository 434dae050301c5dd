use fale_shared::constants::endpoints;
use fale_shared::protocol::TemplateList;
use fale_shared::types::{PromptTemplate, PromptTemplateInput, TemplateId};
use fale_shared::{Result, ValidationError};

use crate::http::ApiClient;

/// System templates plus the user's own.
pub struct PromptManager {
    api: ApiClient,
    templates: Vec<PromptTemplate>,
}

impl PromptManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            templates: Vec::new(),
        }
    }

    pub fn templates(&self) -> &[PromptTemplate] {
        &self.templates
    }

    pub async fn refresh(&mut self) -> Result<&[PromptTemplate]> {
        let list: TemplateList = self.api.get(endpoints::PROMPTS).await?;
        tracing::debug!(count = list.templates.len(), "loaded prompt templates");
        self.templates = list.templates;
        Ok(&self.templates)
    }

    pub async fn get(&self, id: TemplateId) -> Result<PromptTemplate> {
        self.api.get(&endpoints::prompt(id.0)).await
    }

    pub async fn create(&mut self, input: &PromptTemplateInput) -> Result<PromptTemplate> {
        validate_input(input)?;
        let created: PromptTemplate = self.api.post(endpoints::PROMPTS, input).await?;
        tracing::info!(template_id = %created.id, "prompt template created");

        self.refresh().await?;
        Ok(created)
    }

    /// Admin-only on the backend; a non-admin gets `Forbidden`.
    pub async fn create_system(&mut self, input: &PromptTemplateInput) -> Result<PromptTemplate> {
        validate_input(input)?;
        let created: PromptTemplate = self.api.post(endpoints::PROMPTS_SYSTEM, input).await?;
        tracing::info!(template_id = %created.id, "system prompt template created");

        self.refresh().await?;
        Ok(created)
    }

    pub async fn update(
        &mut self,
        id: TemplateId,
        input: &PromptTemplateInput,
    ) -> Result<PromptTemplate> {
        validate_input(input)?;
        self.ensure_editable(id).await?;
        let updated: PromptTemplate = self.api.put(&endpoints::prompt(id.0), input).await?;
        tracing::info!(template_id = %id, "prompt template updated");

        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: TemplateId) -> Result<()> {
        self.ensure_editable(id).await?;
        self.api.delete(&endpoints::prompt(id.0)).await?;
        tracing::info!(template_id = %id, "prompt template deleted");

        self.refresh().await?;
        Ok(())
    }

    /// System templates are read-only. Uses the loaded list when it knows
    /// the template, otherwise asks the backend.
    async fn ensure_editable(&self, id: TemplateId) -> Result<()> {
        let is_system = match self.templates.iter().find(|t| t.id == id) {
            Some(t) => t.is_system,
            None => self.get(id).await?.is_system,
        };
        if is_system {
            return Err(ValidationError::ReadOnlyTemplate.into());
        }
        Ok(())
    }
}

fn validate_input(input: &PromptTemplateInput) -> std::result::Result<(), ValidationError> {
    if input.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if input.template.trim().is_empty() {
        return Err(ValidationError::MissingField("template"));
    }
    Ok(())
}
