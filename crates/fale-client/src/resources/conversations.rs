use serde_json::Value;

use fale_shared::constants::{endpoints, DEFAULT_CONVERSATION_TITLE};
use fale_shared::export::render_transcript;
use fale_shared::protocol::{
    ConversationEnvelope, ConversationList, ConversationTitle, MessageCreated, MessageList,
    NewMessage,
};
use fale_shared::types::{Conversation, ConversationId, Message, Sender};
use fale_shared::{Result, ValidationError};

use crate::http::ApiClient;

pub struct ConversationManager {
    api: ApiClient,
    conversations: Vec<Conversation>,
}

impl ConversationManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            conversations: Vec::new(),
        }
    }

    /// Last loaded list, most recently updated first as the backend sends it.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub async fn refresh(&mut self) -> Result<&[Conversation]> {
        let list: ConversationList = self.api.get(endpoints::CONVERSATIONS).await?;
        tracing::debug!(count = list.conversations.len(), "loaded conversations");
        self.conversations = list.conversations;
        Ok(&self.conversations)
    }

    /// A single conversation including its messages.
    pub async fn get(&self, id: ConversationId) -> Result<Conversation> {
        self.api.get(&endpoints::conversation(id.0)).await
    }

    pub async fn create(&mut self, title: Option<&str>) -> Result<Conversation> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_TITLE);
        let created: ConversationEnvelope = self
            .api
            .post(
                endpoints::CONVERSATIONS,
                &ConversationTitle {
                    title: title.to_string(),
                },
            )
            .await?;
        tracing::info!(conversation_id = %created.conversation.id, "conversation created");

        self.refresh().await?;
        Ok(created.conversation)
    }

    pub async fn rename(&mut self, id: ConversationId, title: &str) -> Result<Conversation> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }
        let updated: ConversationEnvelope = self
            .api
            .put(
                &endpoints::conversation(id.0),
                &ConversationTitle {
                    title: title.to_string(),
                },
            )
            .await?;
        tracing::info!(conversation_id = %id, "conversation renamed");

        self.refresh().await?;
        Ok(updated.conversation)
    }

    pub async fn delete(&mut self, id: ConversationId) -> Result<()> {
        self.api.delete(&endpoints::conversation(id.0)).await?;
        tracing::info!(conversation_id = %id, "conversation deleted");

        self.refresh().await?;
        Ok(())
    }

    pub async fn messages(&self, id: ConversationId) -> Result<Vec<Message>> {
        let list: MessageList = self.api.get(&endpoints::conversation_messages(id.0)).await?;
        Ok(list.messages)
    }

    pub async fn add_message(
        &self,
        id: ConversationId,
        content: &str,
        sender: Sender,
        metadata: Option<Value>,
    ) -> Result<Message> {
        if content.trim().is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }
        let created: MessageCreated = self
            .api
            .post(
                &endpoints::conversation_messages(id.0),
                &NewMessage {
                    content: content.to_string(),
                    sender,
                    metadata,
                },
            )
            .await?;
        Ok(created.data)
    }

    /// Fetch `id` and render it as a plain-text transcript in local time.
    pub async fn export(&self, id: ConversationId) -> Result<String> {
        let conversation = self.get(id).await?;
        Ok(render_transcript(&conversation))
    }
}
