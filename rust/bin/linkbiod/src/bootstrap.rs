//! Startup checks and backend construction.
//!
//! When linkbiod starts:
//! 1. Verify the config carries a session secret, and an anon key when a
//!    hosted backend is configured. Refuse to start otherwise.
//! 2. Build the backend client: REST when `backend.url` is set, otherwise
//!    the in-memory backend, seeded from `demo.seed` if given.

use std::path::Path;
use std::sync::Arc;

use linkbio_backend::{Backend, MemoryBackend, RestBackend};
use tracing::{info, warn};

use crate::config::ServerConfig;

pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.session.jwt_secret.is_empty() {
        anyhow::bail!("Session jwt_secret is empty in configuration.");
    }
    if config.session.cookie_name.trim().is_empty() {
        anyhow::bail!("Session cookie_name is empty in configuration.");
    }
    if !config.uses_memory_backend() && config.backend.anon_key.is_empty() {
        anyhow::bail!(
            "backend.url is set but backend.anon_key is empty.\n\
             Copy the anon key from the backend project settings."
        );
    }
    Ok(())
}

pub fn build_backend(config: &ServerConfig) -> anyhow::Result<Arc<dyn Backend>> {
    if !config.uses_memory_backend() {
        info!("Using hosted backend at {}", config.backend.url);
        return Ok(Arc::new(RestBackend::new(
            config.backend.url.clone(),
            config.backend.anon_key.clone(),
        )));
    }

    let secret = config.session.jwt_secret.clone();
    let backend = match &config.demo.seed {
        Some(seed) => MemoryBackend::load_seed(secret, Path::new(seed))
            .map_err(|e| anyhow::anyhow!("failed to load demo seed: {}", e))?,
        None => {
            warn!("No backend.url and no demo.seed configured; starting with an empty in-memory backend");
            MemoryBackend::new(secret)
        }
    };
    Ok(Arc::new(backend))
}
