//! Session authentication
//!
//! Sign-in happens at the external identity provider. This module validates
//! the session token it issues and exposes the result as `SessionContext`.

pub mod client_ip;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod org_context;

pub use jwt::{sign_session, SessionTokenValidator};
pub use middleware::{session_middleware, AuthFailureLimiter, AuthState};
pub use models::{SessionClaims, SessionContext};
pub use org_context::OrgContext;
