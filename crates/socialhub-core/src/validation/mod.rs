//! Validation and normalization helpers

pub mod naming;
pub mod post_fields;

pub use naming::{
    derive_organization_name, derive_organization_slug, derive_user_name, normalize_email,
};
pub use post_fields::{normalize_hashtags, validate_media_urls, MAX_HASHTAGS};
