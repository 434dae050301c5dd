use serde::{Deserialize, Serialize};

use crate::types::{
    ApiKeyId, ApiKeyRecord, Conversation, ConversationId, Message, PromptTemplate,
    RegisterProfile, Sender, TemplateId, UserProfile,
};

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&RegisterProfile> for RegisterRequest {
    fn from(p: &RegisterProfile) -> Self {
        Self {
            email: p.email.trim().to_string(),
            password: p.password.clone(),
            first_name: p.first_name.trim().to_string(),
            last_name: p.last_name.trim().to_string(),
        }
    }
}

/// Returned by both login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResetTokenRequest {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResetTokenResponse {
    #[serde(default)]
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// New password; subject to the same complexity rules as sign-up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Body of `POST /api/chat/message`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub regenerate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
}

// ---------------------------------------------------------------------------
// API keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AddApiKeyRequest {
    pub provider: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteApiKeyRequest {
    pub id: ApiKeyId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyList {
    #[serde(default)]
    pub api_keys: Vec<ApiKeyRecord>,
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ConversationTitle {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationList {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationEnvelope {
    pub conversation: Conversation,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub content: String,
    pub sender: Sender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// `POST /api/conversations/{id}/messages` answers with the stored
/// message under `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageCreated {
    pub data: Message,
}

// ---------------------------------------------------------------------------
// Prompt templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateList {
    #[serde(default)]
    pub templates: Vec<PromptTemplate>,
}

// ---------------------------------------------------------------------------
// Generic bodies
// ---------------------------------------------------------------------------

/// Acknowledgement returned by deletes, logout and password recovery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body. The backend uses either `error` or `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}
