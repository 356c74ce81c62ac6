//! OAuth connect support for Instagram and LinkedIn

pub mod instagram;
pub mod linkedin;
pub mod popup;
pub mod provider;
pub mod state_token;

pub use instagram::InstagramProvider;
pub use linkedin::LinkedInProvider;
pub use popup::PopupOutcome;
pub use provider::{OAuthProvider, ProviderProfile, TokenGrant};
pub use state_token::StateSigner;

use socialhub_core::models::SocialPlatform;
use socialhub_core::AppError;
use std::sync::Arc;

/// The platforms with a connect flow
#[derive(Clone)]
pub struct OAuthProviders {
    providers: Vec<Arc<dyn OAuthProvider>>,
}

impl OAuthProviders {
    pub fn new(providers: Vec<Arc<dyn OAuthProvider>>) -> Self {
        Self { providers }
    }

    /// Unsupported platforms are a 400.
    pub fn get(&self, platform: SocialPlatform) -> Result<Arc<dyn OAuthProvider>, AppError> {
        self.providers
            .iter()
            .find(|p| p.platform() == platform)
            .cloned()
            .ok_or_else(|| {
                AppError::BadRequest(format!("{} does not support account connection", platform))
            })
    }
}
