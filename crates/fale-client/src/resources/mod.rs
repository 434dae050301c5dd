//! REST resource managers.
//!
//! Each manager keeps only the list the active view shows and reloads it in
//! full after every mutation. Server error messages reach the caller
//! unchanged inside the returned [`fale_shared::ClientError`].

pub mod account;
pub mod api_keys;
pub mod conversations;
pub mod daily;
pub mod notes;
pub mod prompts;
pub mod recovery;

pub use api_keys::ApiKeyManager;
pub use conversations::ConversationManager;
pub use notes::NoteManager;
pub use prompts::PromptManager;
