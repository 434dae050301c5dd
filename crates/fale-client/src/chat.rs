//! The active conversation: its transcript and the send/regenerate flow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use fale_shared::constants::endpoints;
use fale_shared::protocol::{ChatRequest, ChatResponse};
use fale_shared::types::{Conversation, ConversationId, Message, PromptTemplate, Sender};
use fale_shared::{AuthError, ClientError, ValidationError};

use crate::http::ApiClient;
use crate::provider::ProviderPreferences;

/// Why a send failed, phrased for the person at the keyboard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Please log in to send messages")]
    AuthRequired,

    #[error("API key required. Please add a valid API key for this provider.")]
    ApiKeyRequired { detail: String },

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Failed to get response. Please try again.")]
    Failed(ClientError),
}

impl From<ClientError> for ChatError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(ValidationError::EmptyMessage) => ChatError::EmptyMessage,
            ClientError::Forbidden { message } => ChatError::ApiKeyRequired { detail: message },
            ClientError::RateLimited { .. } => ChatError::RateLimited,
            ClientError::Auth(AuthError::Unauthorized { .. })
            | ClientError::Auth(AuthError::SessionExpired)
            | ClientError::Auth(AuthError::NotLoggedIn) => ChatError::AuthRequired,
            other => ChatError::Failed(other),
        }
    }
}

/// One line of the local transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub local_id: Uuid,
    /// Backend id, known only for messages loaded from the server.
    pub server_id: Option<i64>,
    pub content: String,
    pub sender: Sender,
    pub created_at: DateTime<Utc>,
    /// Provider and model that produced a bot reply.
    pub provider: Option<String>,
    pub model: Option<String>,
    pub metadata: Value,
}

impl TranscriptEntry {
    fn user(content: &str) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            server_id: None,
            content: content.to_string(),
            sender: Sender::User,
            created_at: Utc::now(),
            provider: None,
            model: None,
            metadata: Value::Null,
        }
    }

    fn bot(content: String, provider: &str, model: &str, regenerated: bool) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            server_id: None,
            content,
            sender: Sender::Bot,
            created_at: Utc::now(),
            provider: Some(provider.to_string()),
            model: Some(model.to_string()),
            metadata: json!({
                "provider": provider,
                "model": model,
                "regenerated": regenerated,
            }),
        }
    }
}

impl From<Message> for TranscriptEntry {
    fn from(m: Message) -> Self {
        let tag = |key: &str| m.metadata.get(key).and_then(Value::as_str).map(str::to_string);
        let provider = tag("provider");
        let model = tag("model");
        Self {
            local_id: Uuid::new_v4(),
            server_id: m.id,
            content: m.content,
            sender: m.sender,
            created_at: m.created_at.unwrap_or_else(Utc::now),
            provider,
            model,
            metadata: m.metadata,
        }
    }
}

/// Clears the pending flag when the send finishes or its future is dropped.
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct ConversationController {
    api: ApiClient,
    providers: Arc<ProviderPreferences>,
    conversation_id: Option<ConversationId>,
    title: Option<String>,
    transcript: Vec<TranscriptEntry>,
    template: Option<PromptTemplate>,
    pending: Arc<AtomicBool>,
    last_error: Option<ChatError>,
}

impl ConversationController {
    pub fn new(api: ApiClient, providers: Arc<ProviderPreferences>) -> Self {
        Self {
            api,
            providers,
            conversation_id: None,
            title: None,
            transcript: Vec::new(),
            template: None,
            pending: Arc::new(AtomicBool::new(false)),
            last_error: None,
        }
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.conversation_id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Shared view of the pending flag, for a UI that renders while a send
    /// is in flight.
    pub fn pending_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pending)
    }

    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    pub fn selected_template(&self) -> Option<&PromptTemplate> {
        self.template.as_ref()
    }

    /// Template applied to subsequent sends; `None` clears it.
    pub fn select_template(&mut self, template: Option<PromptTemplate>) {
        tracing::debug!(template_id = ?template.as_ref().map(|t| t.id), "template selected");
        self.template = template;
    }

    /// Forget the current conversation; the next send creates a new one.
    pub fn start_new(&mut self) {
        self.conversation_id = None;
        self.title = None;
        self.transcript.clear();
        self.last_error = None;
    }

    /// Switch to an existing conversation, replacing the transcript with the
    /// server's copy.
    pub async fn open(&mut self, id: ConversationId) -> fale_shared::Result<()> {
        let conversation: Conversation = self.api.get(&endpoints::conversation(id.0)).await?;
        tracing::info!(
            conversation_id = %id,
            messages = conversation.messages.len(),
            "conversation opened"
        );
        self.conversation_id = Some(conversation.id);
        self.title = Some(conversation.title);
        self.transcript = conversation
            .messages
            .into_iter()
            .map(TranscriptEntry::from)
            .collect();
        self.last_error = None;
        Ok(())
    }

    /// Send `text` as the next user turn.
    ///
    /// The user's message is appended before the request goes out and stays
    /// in the transcript if the request fails.
    pub async fn send_message(&mut self, text: &str) -> Result<TranscriptEntry, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.require_session()?;
        self.last_error = None;

        self.transcript.push(TranscriptEntry::user(text));

        let selection = self.providers.selection();
        let request = ChatRequest {
            message: text.to_string(),
            provider: selection.provider().to_string(),
            model: selection.model().to_string(),
            conversation_id: self.conversation_id,
            template_id: self.template.as_ref().map(|t| t.id),
            regenerate: false,
        };
        self.dispatch(request).await
    }

    /// Ask for a fresh reply to the last user message. Everything after
    /// that message is dropped first. Returns `Ok(None)` when the
    /// transcript has no user message.
    pub async fn regenerate_response(&mut self) -> Result<Option<TranscriptEntry>, ChatError> {
        let Some(index) = self
            .transcript
            .iter()
            .rposition(|entry| entry.sender == Sender::User)
        else {
            return Ok(None);
        };
        self.require_session()?;
        self.last_error = None;

        self.transcript.truncate(index + 1);
        let message = self.transcript[index].content.clone();

        let selection = self.providers.selection();
        let request = ChatRequest {
            message,
            provider: selection.provider().to_string(),
            model: selection.model().to_string(),
            conversation_id: self.conversation_id,
            template_id: None,
            regenerate: true,
        };
        self.dispatch(request).await.map(Some)
    }

    fn require_session(&mut self) -> Result<(), ChatError> {
        if self.api.session().has_access_token() {
            return Ok(());
        }
        self.last_error = Some(ChatError::AuthRequired);
        Err(ChatError::AuthRequired)
    }

    async fn dispatch(&mut self, request: ChatRequest) -> Result<TranscriptEntry, ChatError> {
        let pending = Arc::clone(&self.pending);
        let _pending = PendingGuard::set(&pending);

        let outcome: fale_shared::Result<ChatResponse> =
            self.api.post(endpoints::CHAT_MESSAGE, &request).await;

        match outcome {
            Ok(reply) => {
                if self.conversation_id.is_none() {
                    if let Some(id) = reply.conversation_id {
                        tracing::info!(conversation_id = %id, "adopted server conversation id");
                        self.conversation_id = Some(id);
                    }
                }
                let entry = TranscriptEntry::bot(
                    reply.response,
                    &request.provider,
                    &request.model,
                    request.regenerate,
                );
                self.transcript.push(entry.clone());
                Ok(entry)
            }
            Err(e) => {
                tracing::warn!(
                    provider = %request.provider,
                    model = %request.model,
                    regenerate = request.regenerate,
                    error = %e,
                    "chat request failed"
                );
                let err = ChatError::from(e);
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
}
