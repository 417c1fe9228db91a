//! Data access for the hosted backend.
//!
//! Profiles, profile settings and password sign-in all live in an external
//! backend-as-a-service. This crate hides it behind the [`Backend`] trait so
//! pages receive an injected client instead of reaching for a global one.
//!
//! # Implementations
//!
//! - [`RestBackend`]: PostgREST-style REST API plus password grant auth
//! - [`MemoryBackend`]: in-process tables, seeded from a JSON fixture
//! - [`CachedBackend`]: wraps either one with a freshness window and retry
//!
//! # Usage
//!
//! ```ignore
//! use linkbio_backend::{Backend, CachedBackend, QueryConfig, RestBackend};
//!
//! let rest = RestBackend::new("https://project.example.co", "anon-key");
//! let backend: Arc<dyn Backend> = Arc::new(CachedBackend::new(Arc::new(rest), QueryConfig::default()));
//! let row = backend.profile_by_username("alice").await?;
//! ```

pub mod cache;
pub mod memory;
pub mod password;
pub mod rest;
pub mod rows;
pub mod session;

pub use cache::{CachedBackend, QueryConfig};
pub use memory::MemoryBackend;
pub use rest::RestBackend;
pub use rows::{ProfilePatch, ProfileRow, SettingsPatch, SettingsRow};
pub use session::{Session, SessionClaims, SessionGrant};

use linkbio_core::ServiceError;

// ── Error ───────────────────────────────────────────────────────────

/// Failure talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("auth: {0}")]
    Auth(String),

    #[error("decode: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => *status >= 500,
            ApiError::Auth(_) | ApiError::Decode(_) => false,
        }
    }
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Auth(m) => ServiceError::Unauthorized(m),
            ApiError::Server { status: 401, message } => ServiceError::Unauthorized(message),
            ApiError::Server { status: 403, message } => ServiceError::PermissionDenied(message),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

// ── Backend ─────────────────────────────────────────────────────────

/// Operations the application needs from the hosted backend.
///
/// Lookups return `Ok(None)` when no row matches; `Err` is reserved for
/// transport, server and decoding failures.
#[async_trait::async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Single-row-or-none lookup on the unique username.
    async fn profile_by_username(&self, username: &str) -> Result<Option<ProfileRow>, ApiError>;

    async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>, ApiError>;

    /// Settings row keyed by the owning profile's id.
    async fn settings_by_profile_id(&self, id: &str) -> Result<Option<SettingsRow>, ApiError>;

    /// Patch the profile row. `access_token` is the signed-in user's session.
    async fn update_profile(
        &self,
        access_token: &str,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<(), ApiError>;

    async fn update_settings(
        &self,
        access_token: &str,
        id: &str,
        patch: &SettingsPatch,
    ) -> Result<(), ApiError>;

    /// Exchange email + password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionGrant, ApiError>;
}
