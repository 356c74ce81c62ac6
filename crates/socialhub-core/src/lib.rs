//! SocialHub Core Library
//!
//! Domain models, error types, configuration, token encryption and validation
//! shared by the database, infrastructure and API crates.

pub mod config;
pub mod encryption;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, OAuthProviderSettings, SocialHubConfig};
pub use encryption::TokenCipher;
pub use error::{AppError, ErrorMetadata, LogLevel, OAuthErrorKind};
