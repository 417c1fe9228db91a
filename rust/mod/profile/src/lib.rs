//! Public profile pages.
//!
//! # Pieces
//!
//! - [`model`]: canonical profile, settings and link types parsed from rows
//! - [`loader`]: username to profile + settings, with classified failures
//! - [`theme`], [`url`], [`layout`]: rendering helpers
//! - [`page`]: the page state machine and document rendering
//!
//! # Usage
//!
//! ```ignore
//! use linkbio_profile::ProfileModule;
//!
//! let module = ProfileModule::new(backend.clone());
//! let router = module.routes(); // serves /{username}
//! ```

pub mod api;
pub mod layout;
pub mod loader;
pub mod model;
pub mod page;
pub mod theme;
pub mod url;

use std::sync::Arc;

use axum::Router;
use linkbio_backend::Backend;
use linkbio_core::Module;

pub use api::Viewer;
pub use loader::{LoadError, LoadedProfile, load_profile, load_profile_by_id};
pub use page::{ProfilePage, edit_profile_target};

pub struct ProfileModule {
    backend: Arc<dyn Backend>,
}

impl ProfileModule {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

impl Module for ProfileModule {
    fn name(&self) -> &str {
        "profile"
    }

    fn routes(&self) -> Router {
        api::routes(self.backend.clone())
    }
}
