//! Configuration module
//!
//! Environment-driven settings for the API: server, database, session secrets,
//! token encryption and the per-platform OAuth client settings.

use std::env;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const MAX_BODY_BYTES: usize = 1024 * 1024;
const OAUTH_STATE_TTL_SECS: i64 = 600;
const OAUTH_HTTP_TIMEOUT_SECS: u64 = 15;

const INSTAGRAM_AUTH_BASE_URL: &str = "https://api.instagram.com";
const INSTAGRAM_GRAPH_BASE_URL: &str = "https://graph.instagram.com";
const LINKEDIN_AUTH_BASE_URL: &str = "https://www.linkedin.com";
const LINKEDIN_API_BASE_URL: &str = "https://api.linkedin.com";

/// Base configuration shared by every binary
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// HS256 secret shared with the identity provider that issues session tokens
    pub jwt_secret: String,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    pub max_body_bytes: usize,
}

/// Client settings for one OAuth platform.
///
/// The platform is disabled unless both client id and secret are present.
#[derive(Clone, Debug)]
pub struct OAuthProviderSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Origin hosting the authorize and token endpoints
    pub auth_base_url: String,
    /// Origin hosting the profile endpoint
    pub api_base_url: String,
}

impl OAuthProviderSettings {
    fn from_env(prefix: &str, auth_default: &str, api_env: &str, api_default: &str) -> Self {
        Self {
            client_id: env::var(format!("{}_CLIENT_ID", prefix))
                .ok()
                .filter(|s| !s.trim().is_empty()),
            client_secret: env::var(format!("{}_CLIENT_SECRET", prefix))
                .ok()
                .filter(|s| !s.trim().is_empty()),
            auth_base_url: env::var(format!("{}_AUTH_BASE_URL", prefix))
                .unwrap_or_else(|_| auth_default.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_base_url: env::var(api_env)
                .unwrap_or_else(|_| api_default.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Client id and secret, when both are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.client_id.as_deref(), self.client_secret.as_deref()) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

/// Full service configuration
#[derive(Clone, Debug)]
pub struct SocialHubConfig {
    pub base: BaseConfig,
    pub database_url: String,
    /// Public origin used to build OAuth redirect URIs
    pub public_base_url: String,
    pub oauth_state_secret: String,
    pub oauth_state_ttl_secs: i64,
    /// Base64 encoded 32-byte AES key for stored provider tokens
    pub encryption_key: String,
    pub instagram: OAuthProviderSettings,
    pub linkedin: OAuthProviderSettings,
    /// Insert synthetic accounts on connect instead of running the OAuth redirect
    pub use_mock_social_connect: bool,
    pub oauth_http_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<SocialHubConfig>);

impl Config {
    fn inner(&self) -> &SocialHubConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = SocialHubConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().base.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit
    }

    pub fn max_body_bytes(&self) -> usize {
        self.inner().base.max_body_bytes
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn public_base_url(&self) -> &str {
        &self.inner().public_base_url
    }

    pub fn oauth_state_secret(&self) -> &str {
        &self.inner().oauth_state_secret
    }

    pub fn oauth_state_ttl_secs(&self) -> i64 {
        self.inner().oauth_state_ttl_secs
    }

    pub fn encryption_key(&self) -> &str {
        &self.inner().encryption_key
    }

    pub fn instagram(&self) -> &OAuthProviderSettings {
        &self.inner().instagram
    }

    pub fn linkedin(&self) -> &OAuthProviderSettings {
        &self.inner().linkedin
    }

    pub fn use_mock_social_connect(&self) -> bool {
        self.inner().use_mock_social_connect
    }

    pub fn oauth_http_timeout_secs(&self) -> u64 {
        self.inner().oauth_http_timeout_secs
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .to_lowercase()
        .parse()
        .unwrap_or(default)
}

impl SocialHubConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for session validation"))?,
            environment,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .unwrap_or_else(|_| HTTP_CONCURRENCY_LIMIT.to_string())
                .parse()
                .unwrap_or(HTTP_CONCURRENCY_LIMIT),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| MAX_BODY_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_BODY_BYTES),
        };

        let config = SocialHubConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port))
                .trim_end_matches('/')
                .to_string(),
            oauth_state_secret: env::var("OAUTH_STATE_SECRET")
                .map_err(|_| anyhow::anyhow!("OAUTH_STATE_SECRET must be set"))?,
            oauth_state_ttl_secs: env::var("OAUTH_STATE_TTL_SECS")
                .unwrap_or_else(|_| OAUTH_STATE_TTL_SECS.to_string())
                .parse()
                .unwrap_or(OAUTH_STATE_TTL_SECS),
            encryption_key: env::var("ENCRYPTION_KEY").map_err(|_| {
                anyhow::anyhow!("ENCRYPTION_KEY must be set (base64 encoded 32-byte key)")
            })?,
            instagram: OAuthProviderSettings::from_env(
                "INSTAGRAM",
                INSTAGRAM_AUTH_BASE_URL,
                "INSTAGRAM_GRAPH_BASE_URL",
                INSTAGRAM_GRAPH_BASE_URL,
            ),
            linkedin: OAuthProviderSettings::from_env(
                "LINKEDIN",
                LINKEDIN_AUTH_BASE_URL,
                "LINKEDIN_API_BASE_URL",
                LINKEDIN_API_BASE_URL,
            ),
            use_mock_social_connect: env_flag("USE_MOCK_SOCIAL_CONNECT", false),
            oauth_http_timeout_secs: env::var("OAUTH_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| OAUTH_HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(OAUTH_HTTP_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.oauth_state_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "OAUTH_STATE_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.oauth_state_ttl_secs <= 0 {
            return Err(anyhow::anyhow!("OAUTH_STATE_TTL_SECS must be positive"));
        }

        if !(self.public_base_url.starts_with("http://")
            || self.public_base_url.starts_with("https://"))
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must be an absolute http(s) origin"
            ));
        }

        if is_production_name(&self.base.environment) && self.use_mock_social_connect {
            return Err(anyhow::anyhow!(
                "USE_MOCK_SOCIAL_CONNECT cannot be enabled in production"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: Option<&str>, secret: Option<&str>) -> OAuthProviderSettings {
        OAuthProviderSettings {
            client_id: id.map(String::from),
            client_secret: secret.map(String::from),
            auth_base_url: "https://auth.example".to_string(),
            api_base_url: "https://api.example".to_string(),
        }
    }

    fn sample() -> SocialHubConfig {
        SocialHubConfig {
            base: BaseConfig {
                server_port: 4000,
                cors_origins: vec!["http://localhost:5173".to_string()],
                db_max_connections: 5,
                db_timeout_seconds: 5,
                jwt_secret: "j".repeat(32),
                environment: "development".to_string(),
                request_timeout_secs: 30,
                http_concurrency_limit: 100,
                max_body_bytes: 1024,
            },
            database_url: "postgres://localhost/socialhub".to_string(),
            public_base_url: "http://localhost:4000".to_string(),
            oauth_state_secret: "s".repeat(32),
            oauth_state_ttl_secs: 600,
            encryption_key: String::new(),
            instagram: provider(Some("ig"), Some("ig-secret")),
            linkedin: provider(None, Some("li-secret")),
            use_mock_social_connect: false,
            oauth_http_timeout_secs: 15,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_short_secrets_rejected() {
        let mut cfg = sample();
        cfg.base.jwt_secret = "short".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = sample();
        cfg.oauth_state_secret = "short".to_string();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("OAUTH_STATE_SECRET"));
    }

    #[test]
    fn test_database_url_scheme() {
        let mut cfg = sample();
        cfg.database_url = "mysql://localhost/db".to_string();
        assert!(cfg.validate().is_err());

        cfg.database_url = "postgresql://localhost/db".to_string();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_mock_connect_forbidden_in_production() {
        let mut cfg = sample();
        cfg.use_mock_social_connect = true;
        assert!(cfg.validate().is_ok());

        cfg.base.environment = "production".to_string();
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("USE_MOCK_SOCIAL_CONNECT"));
    }

    #[test]
    fn test_provider_requires_both_credentials() {
        let cfg = sample();
        assert_eq!(cfg.instagram.credentials(), Some(("ig", "ig-secret")));
        assert!(!cfg.linkedin.is_configured());
    }

    #[test]
    fn test_is_production() {
        let mut cfg = sample();
        cfg.base.environment = "PROD".to_string();
        assert!(Config(Box::new(cfg)).is_production());
    }
}
