//! # fale-client
//!
//! Async client library for the Fale Com Jesus backend: session and token
//! lifecycle, the authenticated HTTP gateway, the chat controller, the
//! provider/model selection and the REST resource managers.

pub mod chat;
pub mod config;
pub mod events;
pub mod http;
pub mod provider;
pub mod resources;
pub mod session;
pub mod state;
pub mod storage;
pub mod theme;

use tracing_subscriber::{fmt, EnvFilter};

pub use chat::{ChatError, ConversationController, TranscriptEntry};
pub use config::ClientConfig;
pub use events::{EventBus, SessionEvent};
pub use http::{ApiClient, ApiRequest, Transport};
pub use session::{AuthState, SessionStore};
pub use state::AppContext;
pub use storage::SharedDatabase;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default
/// filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init();
}
