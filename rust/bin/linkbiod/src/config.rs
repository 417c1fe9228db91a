//! Server configuration, read from a TOML file.
//!
//! ```toml
//! [backend]
//! url = "https://project.example.co"   # empty: in-memory backend
//! anon_key = "..."
//!
//! [session]
//! jwt_secret = "..."
//! cookie_name = "linkbio_session"
//! max_age_secs = 604800
//!
//! [cache]
//! stale_secs = 300
//! retry = 1
//! max_entries = 1024
//!
//! [demo]
//! seed = "demo/seed.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use linkbio_backend::QueryConfig;
use serde::Deserialize;

pub const DEFAULT_COOKIE_NAME: &str = "linkbio_session";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret the backend signs access tokens with.
    pub jwt_secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,
    #[serde(default = "default_retry")]
    pub retry: u32,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_secs: default_stale_secs(),
            retry: default_retry(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemoConfig {
    /// JSON fixture for the in-memory backend.
    #[serde(default)]
    pub seed: Option<String>,
}

fn default_cookie_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_max_age() -> u64 {
    7 * 24 * 3600
}

fn default_stale_secs() -> u64 {
    300
}

fn default_retry() -> u32 {
    1
}

fn default_max_entries() -> usize {
    1024
}

impl ServerConfig {
    /// A bare name maps to `/etc/linkbio/<name>.toml`; anything containing
    /// `/` or `.` is taken as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/linkbio/{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn query_config(&self) -> QueryConfig {
        QueryConfig {
            stale_time: Duration::from_secs(self.cache.stale_secs),
            retry: self.cache.retry,
            max_entries: self.cache.max_entries,
        }
    }

    pub fn uses_memory_backend(&self) -> bool {
        self.backend.url.trim().is_empty()
    }
}
