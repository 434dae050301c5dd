use thiserror::Error;

/// Every failure a backend call or a client-side check can produce.
///
/// Callers match on the variant instead of inspecting HTTP status codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Map a non-success HTTP status and the server's message to a variant.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ClientError::Auth(AuthError::Unauthorized { message }),
            403 => ClientError::Forbidden { message },
            404 => ClientError::NotFound { message },
            429 => ClientError::RateLimited { message },
            _ => ClientError::Server { status, message },
        }
    }

    /// HTTP status this error was built from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth(AuthError::Unauthorized { .. }) => Some(401),
            ClientError::Auth(AuthError::InvalidCredentials { .. }) => Some(401),
            ClientError::Forbidden { .. } => Some(403),
            ClientError::NotFound { .. } => Some(404),
            ClientError::RateLimited { .. } => Some(429),
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the session is gone and the user has to sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Auth(AuthError::SessionExpired) | ClientError::Auth(AuthError::NotLoggedIn)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{message}")]
    InvalidCredentials { message: String },

    /// 401 that survived one refresh-and-retry.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Please log in first")]
    NotLoggedIn,
}

/// Problems caught before anything is sent to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Password must contain an uppercase letter, a lowercase letter, a digit and one of @$!%*?&")]
    PasswordTooWeak,

    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Model {model} is not offered by provider {provider}")]
    ModelNotOffered { provider: String, model: String },

    #[error("System templates are read-only")]
    ReadOnlyTemplate,
}

pub type Result<T> = std::result::Result<T, ClientError>;
