//! API constants

/// Prefix for every session-protected JSON route
pub const API_PREFIX: &str = "/api/v1";

/// Public path of the OAuth callback for a platform.
pub fn oauth_callback_path(platform: &str) -> String {
    format!("/oauth/{}/callback", platform)
}

/// Auth failures allowed per client IP within the window before a 429.
pub const AUTH_FAILURE_MAX: u32 = 10;
pub const AUTH_FAILURE_WINDOW_SECS: u64 = 15 * 60;
