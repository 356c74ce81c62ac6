//! Data models for the application
//!
//! Organized by domain; every tenant-owned row carries an `organization_id`.

mod invitation;
mod membership;
mod oauth_state;
mod organization;
mod post;
mod profile;
mod social_account;

pub use invitation::*;
pub use membership::*;
pub use oauth_state::*;
pub use organization::*;
pub use post::*;
pub use profile::*;
pub use social_account::*;
