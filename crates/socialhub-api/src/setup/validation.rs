//! Startup checks that go beyond parsing: catch settings that would only
//! fail on the first request.

use anyhow::Result;
use socialhub_core::{Config, TokenCipher};

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set explicit origins via CORS_ORIGINS."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }
    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }
    if config.request_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("Request timeout cannot be 0"));
    }
    if config.oauth_http_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("OAuth HTTP timeout cannot be 0"));
    }

    TokenCipher::from_base64_key(config.encryption_key())
        .map_err(|e| anyhow::anyhow!("ENCRYPTION_KEY is invalid: {}", e))?;

    let trusted_proxy_count = crate::auth::client_ip::trusted_proxy_count();
    if trusted_proxy_count > 10 {
        tracing::warn!(
            trusted_proxy_count,
            "TRUSTED_PROXY_COUNT is very high - ensure this matches your actual proxy setup"
        );
    }

    if config.use_mock_social_connect() {
        tracing::info!("Mock social connect enabled; OAuth redirects are skipped");
    } else {
        for (platform, settings) in [("instagram", config.instagram()), ("linkedin", config.linkedin())] {
            if !settings.is_configured() {
                tracing::warn!(platform, "OAuth client credentials missing; connect will be rejected");
            }
        }
    }

    if is_production && !config.public_base_url().starts_with("https://") {
        tracing::warn!(
            public_base_url = %config.public_base_url(),
            "PUBLIC_BASE_URL is not https; providers may reject the redirect URI"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
