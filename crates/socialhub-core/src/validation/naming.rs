//! Organization naming rules used when an organization is created on first resolve.

use uuid::Uuid;

use crate::models::Profile;

/// `"First Last"` when the profile has both names, else the email local
/// part, else `"User"`.
pub fn derive_user_name(profile: Option<&Profile>, email: Option<&str>) -> String {
    if let Some(full) = profile.and_then(Profile::full_name) {
        return full;
    }

    email
        .or_else(|| profile.and_then(|p| p.email.as_deref()))
        .and_then(|e| e.split('@').next())
        .map(str::trim)
        .filter(|local| !local.is_empty())
        .unwrap_or("User")
        .to_string()
}

pub fn derive_organization_name(user_name: &str) -> String {
    format!("{}'s Organization", user_name)
}

/// Lowercased user name with whitespace runs collapsed to `-`, suffixed with
/// the first 8 characters of the user id.
pub fn derive_organization_slug(user_name: &str, user_id: Uuid) -> String {
    let base = user_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    let id = user_id.simple().to_string();
    format!("{}-{}", base, &id[..8])
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
