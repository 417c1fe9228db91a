//! Shared building blocks for the linkbio services: the service error type,
//! id/time helpers, the page document model and the notification channel
//! rendered into every HTML response.

pub mod document;
pub mod error;
pub mod html;
pub mod module;
pub mod notify;
pub mod types;

pub use document::{DocumentRoot, StyleContext};
pub use error::ServiceError;
pub use module::Module;
pub use notify::{Notifier, Toast, ToastVariant};
pub use types::{merge_patch, new_id};
