//! # fale-store
//!
//! Durable client-side state for Fale Com Jesus: the session tokens, the
//! chosen LLM provider/model and the theme preference. Everything lives in a
//! single SQLite `settings` table behind a synchronous [`Database`] handle
//! with typed accessors for each concern.

pub mod database;
pub mod migrations;
pub mod preferences;
pub mod settings;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use preferences::StoredTokens;
