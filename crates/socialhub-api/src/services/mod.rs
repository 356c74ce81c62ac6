pub mod invitations;
pub mod oauth_callback;
pub mod organization;
pub mod social_accounts;

#[cfg(test)]
pub(crate) mod testing;

pub use oauth_callback::{CallbackParams, OAuthCallbackService};
pub use organization::OrganizationResolver;
pub use social_accounts::{ConnectSettings, SocialAccountService};
