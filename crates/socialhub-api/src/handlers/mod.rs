pub mod invitations;
pub mod members;
pub mod oauth_callback;
pub mod organization;
pub mod posts;
pub mod session;
pub mod social_accounts;
