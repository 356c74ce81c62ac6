//! SocialHub API Library
//!
//! HTTP handlers, session auth, the OAuth connect flow and application setup.
//! The binary in `main.rs` and the integration tests both build on it.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod oauth;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
