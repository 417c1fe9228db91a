//! Loads a profile and its settings from the backend.

use axum::http::StatusCode;
use linkbio_backend::{ApiError, Backend};
use linkbio_core::{Toast, ToastVariant};
use tracing::{error, warn};

use crate::model::{self, Profile, ProfileSettings, RowError};

/// Why a profile could not be shown.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("no username given")]
    MissingInput,

    #[error("profile @{0} does not exist")]
    NotFound(String),

    #[error("profile {0} has no settings")]
    SettingsMissing(String),

    #[error("{0}")]
    Backend(String),

    #[error("invalid profile data: {0}")]
    Invalid(String),
}

impl From<ApiError> for LoadError {
    fn from(e: ApiError) -> Self {
        LoadError::Backend(e.to_string())
    }
}

impl From<RowError> for LoadError {
    fn from(e: RowError) -> Self {
        LoadError::Invalid(e.to_string())
    }
}

impl LoadError {
    /// Toast to show for this failure, if any.
    pub fn notification(&self) -> Option<Toast> {
        match self {
            LoadError::MissingInput | LoadError::SettingsMissing(_) => None,
            LoadError::NotFound(username) => Some(Toast::new(
                ToastVariant::Error,
                "Profile not found",
                format!("No profile exists for @{}.", username),
            )),
            LoadError::Backend(message) | LoadError::Invalid(message) => Some(Toast::new(
                ToastVariant::Destructive,
                "Error loading profile",
                message.clone(),
            )),
        }
    }

    /// Status of the inline view rendered for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            LoadError::MissingInput => StatusCode::SEE_OTHER,
            LoadError::NotFound(_) | LoadError::SettingsMissing(_) => StatusCode::NOT_FOUND,
            LoadError::Backend(_) | LoadError::Invalid(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Whether the page shows the not-found view rather than the error view.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_) | LoadError::MissingInput)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProfile {
    pub profile: Profile,
    pub settings: ProfileSettings,
}

/// Load the public profile for `username`.
///
/// The profile lookup runs first; its id keys the settings lookup.
pub async fn load_profile(backend: &dyn Backend, username: Option<&str>) -> Result<LoadedProfile, LoadError> {
    let username = username
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(LoadError::MissingInput)?;

    let row = backend.profile_by_username(username).await.map_err(|e| {
        error!(username, "profile lookup failed: {}", e);
        LoadError::from(e)
    })?;
    let row = row.ok_or_else(|| LoadError::NotFound(username.to_string()))?;
    let profile = model::parse_profile(row)?;

    let settings = backend.settings_by_profile_id(&profile.id).await.map_err(|e| {
        error!(profile_id = %profile.id, "settings lookup failed: {}", e);
        LoadError::from(e)
    })?;
    let Some(settings) = settings else {
        warn!(profile_id = %profile.id, username, "profile has no settings row");
        return Err(LoadError::SettingsMissing(profile.id));
    };

    Ok(LoadedProfile {
        profile,
        settings: model::parse_settings(settings),
    })
}

/// Load the signed-in owner's profile by id.
///
/// Editors start from default settings when no row exists yet; the first
/// save creates it.
pub async fn load_profile_by_id(backend: &dyn Backend, id: &str) -> Result<LoadedProfile, LoadError> {
    let row = backend.profile_by_id(id).await.map_err(|e| {
        error!(profile_id = id, "profile lookup failed: {}", e);
        LoadError::from(e)
    })?;
    let row = row.ok_or_else(|| LoadError::NotFound(id.to_string()))?;
    let profile = model::parse_profile(row)?;

    let settings = backend
        .settings_by_profile_id(&profile.id)
        .await?
        .map(model::parse_settings)
        .unwrap_or_default();

    Ok(LoadedProfile { profile, settings })
}
