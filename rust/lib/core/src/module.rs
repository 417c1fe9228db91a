use axum::Router;

/// A page module that contributes HTTP routes.
///
/// Each feature module (public profile pages, ...) implements this trait
/// to register its endpoints. The binary entry point collects all modules
/// and merges their routes into the application router.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes with their state already applied.
    fn routes(&self) -> Router;
}
