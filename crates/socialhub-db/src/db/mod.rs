//! Database repositories for data access layer
//!
//! One repository per table. Tenant-owned tables are always filtered by
//! `organization_id`, so a row outside the caller's organization behaves exactly
//! like a missing row.

pub mod invitation;
pub mod membership;
pub mod oauth_state;
pub mod organization;
pub mod post;
pub mod profile;
pub mod session;
pub mod social_account;
//
// Transaction utilities
pub mod transaction;

pub use invitation::InvitationRepository;
pub use membership::MembershipRepository;
pub use oauth_state::OAuthStateRepository;
pub use organization::OrganizationRepository;
pub use post::{NewPost, PostEdit, PostRepository};
pub use profile::ProfileRepository;
pub use session::RevokedSessionRepository;
pub use social_account::SocialAccountRepository;
