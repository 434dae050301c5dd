//! # fale-shared
//!
//! Types shared by every Fale Com Jesus crate: the backend's wire models,
//! the error taxonomy, client-side validation, the provider catalog and
//! token inspection helpers. Nothing in here performs I/O.

pub mod constants;
pub mod error;
pub mod export;
pub mod protocol;
pub mod providers;
pub mod token;
pub mod types;
pub mod validation;

pub use error::{AuthError, ClientError, Result, ValidationError};
