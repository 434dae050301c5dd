use serde::Serialize;
use tokio::sync::broadcast;

pub const EVENT_LOGGED_IN: &str = "logged-in";
pub const EVENT_TOKEN_REFRESHED: &str = "token-refreshed";
pub const EVENT_LOGGED_OUT: &str = "logged-out";
pub const EVENT_AUTHENTICATION_REQUIRED: &str = "authentication-required";

const EVENT_CAPACITY: usize = 32;

/// Session lifecycle notifications for whatever front end is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum SessionEvent {
    LoggedIn { user_id: Option<String> },
    TokenRefreshed,
    LoggedOut,
    /// The refresh token was rejected; the user has to sign in again.
    AuthenticationRequired,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::LoggedIn { .. } => EVENT_LOGGED_IN,
            SessionEvent::TokenRefreshed => EVENT_TOKEN_REFRESHED,
            SessionEvent::LoggedOut => EVENT_LOGGED_OUT,
            SessionEvent::AuthenticationRequired => EVENT_AUTHENTICATION_REQUIRED,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            tracing::trace!(event = name, "No subscribers for event");
        } else {
            tracing::debug!(event = name, "Emitted session event");
        }
    }
}
