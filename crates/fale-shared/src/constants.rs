/// Application name
pub const APP_NAME: &str = "Fale Com Jesus";

/// Backend base URL when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Minimum password length accepted at registration / reset
pub const MIN_PASSWORD_LEN: usize = 8;

/// Special characters the backend's password policy recognises
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&";

/// Provider/model used before the user picks anything
pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Title suggested for conversations created explicitly
pub const DEFAULT_CONVERSATION_TITLE: &str = "Nova conversa";

/// Keys of the durable client-side key/value store
pub mod storage_keys {
    pub const ACCESS_TOKEN: &str = "accessToken";
    pub const REFRESH_TOKEN: &str = "refreshToken";
    pub const SELECTED_PROVIDER: &str = "selectedProvider";
    pub const SELECTED_MODEL: &str = "selectedModel";
    pub const THEME_MODE: &str = "themeMode";
}

/// REST paths, relative to the configured base URL
pub mod endpoints {
    pub const AUTH_LOGIN: &str = "/api/v1/auth/login";
    pub const AUTH_REGISTER: &str = "/api/v1/auth/register";
    pub const AUTH_REFRESH: &str = "/api/v1/auth/refresh";
    pub const AUTH_LOGOUT: &str = "/api/v1/auth/logout";
    pub const AUTH_FORGOT_PASSWORD: &str = "/api/v1/auth/forgot-password";
    pub const AUTH_RESET_PASSWORD: &str = "/api/v1/auth/reset-password";
    pub const AUTH_VERIFY_RESET_TOKEN: &str = "/api/v1/auth/verify-reset-token";

    pub const USERS_ME: &str = "/api/v1/users/me";

    pub const API_KEYS: &str = "/api/keys";
    pub const CONVERSATIONS: &str = "/api/conversations";
    pub const CHAT_MESSAGE: &str = "/api/chat/message";
    pub const PROMPTS: &str = "/api/prompts";
    pub const PROMPTS_SYSTEM: &str = "/api/prompts/system";

    pub const DAILY_MESSAGE_TODAY: &str = "/api/v1/daily-messages/today";
    pub const NOTES: &str = "/api/v1/notes";
    pub const NOTES_RECENT: &str = "/api/v1/notes/recent";

    pub fn conversation(id: i64) -> String {
        format!("{CONVERSATIONS}/{id}")
    }

    pub fn conversation_messages(id: i64) -> String {
        format!("{CONVERSATIONS}/{id}/messages")
    }

    pub fn prompt(id: i64) -> String {
        format!("{PROMPTS}/{id}")
    }

    pub fn note(id: i64) -> String {
        format!("{NOTES}/{id}")
    }
}
