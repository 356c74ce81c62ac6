//! SocialHub Database Layer
//!
//! Postgres repositories for organizations, members, invitations, social
//! accounts, OAuth state records, posts, profiles and revoked sessions.

pub mod db;
pub mod store_traits;

pub use db::{
    InvitationRepository, MembershipRepository, NewPost, OAuthStateRepository,
    OrganizationRepository, PostEdit, PostRepository, ProfileRepository,
    RevokedSessionRepository, SocialAccountRepository,
};

// Re-exports: Transaction utilities
pub use db::transaction::{is_unique_violation, TransactionGuard};

pub use store_traits::{OAuthStateStore, OrganizationStore, ProfileStore, SocialAccountStore};
