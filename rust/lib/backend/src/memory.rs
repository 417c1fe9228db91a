//! In-process backend used for local runs and tests.
//!
//! Tables are plain maps keyed by profile id. Sign-in checks a seeded
//! account list (argon2id password hashes) and signs tokens with the same
//! HS256 scheme as the hosted auth service, so the session guard cannot
//! tell the two apart.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde::Deserialize;
use tracing::info;

use crate::password::{hash_password, verify_password};
use crate::session::issue_token;
use crate::{ApiError, Backend, ProfilePatch, ProfileRow, SessionGrant, SettingsPatch, SettingsRow};

const TOKEN_TTL_SECS: u64 = 3600;

/// A sign-in account of the memory backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub email: String,
    /// argon2id PHC string.
    pub password_hash: String,
    pub user_id: String,
}

/// JSON fixture format accepted by [`MemoryBackend::load_seed`].
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub profiles: Vec<ProfileRow>,
    #[serde(default)]
    pub settings: Vec<SettingsRow>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

pub struct MemoryBackend {
    jwt_secret: String,
    profiles: RwLock<HashMap<String, ProfileRow>>,
    settings: RwLock<HashMap<String, SettingsRow>>,
    accounts: RwLock<Vec<Account>>,
}

impl MemoryBackend {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            profiles: RwLock::new(HashMap::new()),
            settings: RwLock::new(HashMap::new()),
            accounts: RwLock::new(Vec::new()),
        }
    }

    /// Build a backend from a JSON fixture file.
    pub fn load_seed(jwt_secret: impl Into<String>, path: &Path) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Decode(format!("read {}: {}", path.display(), e)))?;
        let seed: Seed = serde_json::from_str(&content)
            .map_err(|e| ApiError::Decode(format!("parse {}: {}", path.display(), e)))?;

        let backend = Self::new(jwt_secret);
        let (profiles, settings, accounts) = (seed.profiles.len(), seed.settings.len(), seed.accounts.len());
        backend.apply_seed(seed);
        info!(profiles, settings, accounts, "Loaded memory backend seed from {}", path.display());
        Ok(backend)
    }

    pub fn apply_seed(&self, seed: Seed) {
        for row in seed.profiles {
            self.insert_profile(row);
        }
        for row in seed.settings {
            self.insert_settings(row);
        }
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(seed.accounts);
    }

    /// Insert or replace a profile row. Rows without an id are ignored.
    pub fn insert_profile(&self, row: ProfileRow) {
        if let Some(id) = row.id.clone() {
            self.profiles
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id, row);
        }
    }

    /// Insert or replace a settings row. Rows without an id are ignored.
    pub fn insert_settings(&self, row: SettingsRow) {
        if let Some(id) = row.id.clone() {
            self.settings
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id, row);
        }
    }

    /// Register an account, hashing its password.
    pub fn add_account(&self, email: &str, password: &str, user_id: &str) -> Result<(), ApiError> {
        let password_hash = hash_password(password).map_err(|e| ApiError::Auth(format!("hash password: {}", e)))?;
        self.accounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Account {
                email: email.to_string(),
                password_hash,
                user_id: user_id.to_string(),
            });
        Ok(())
    }
}

/// Apply a serializable patch to a stored row through JSON merge-patch.
fn patch_row<R, P>(row: &R, patch: &P) -> Result<R, ApiError>
where
    R: serde::Serialize + serde::de::DeserializeOwned,
    P: serde::Serialize,
{
    let mut value = serde_json::to_value(row).map_err(|e| ApiError::Decode(e.to_string()))?;
    let patch = serde_json::to_value(patch).map_err(|e| ApiError::Decode(e.to_string()))?;
    linkbio_core::merge_patch(&mut value, &patch);
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn profile_by_username(&self, username: &str) -> Result<Option<ProfileRow>, ApiError> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles
            .values()
            .find(|p| p.username.as_deref() == Some(username))
            .cloned())
    }

    async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>, ApiError> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.get(id).cloned())
    }

    async fn settings_by_profile_id(&self, id: &str) -> Result<Option<SettingsRow>, ApiError> {
        let settings = self.settings.read().unwrap_or_else(PoisonError::into_inner);
        Ok(settings.get(id).cloned())
    }

    async fn update_profile(
        &self,
        _access_token: &str,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<(), ApiError> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        let row = profiles.get(id).ok_or_else(|| ApiError::Server {
            status: 404,
            message: format!("profile {} not found", id),
        })?;
        let updated = patch_row(row, patch)?;
        profiles.insert(id.to_string(), updated);
        Ok(())
    }

    async fn update_settings(
        &self,
        _access_token: &str,
        id: &str,
        patch: &SettingsPatch,
    ) -> Result<(), ApiError> {
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        // A first save creates the row, matching an upsert on the hosted side.
        let base = settings.get(id).cloned().unwrap_or_else(|| SettingsRow {
            id: Some(id.to_string()),
            ..Default::default()
        });
        let updated = patch_row(&base, patch)?;
        settings.insert(id.to_string(), updated);
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionGrant, ApiError> {
        let user_id = {
            let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
            accounts
                .iter()
                .find(|a| a.email.eq_ignore_ascii_case(email) && verify_password(password, &a.password_hash))
                .map(|a| a.user_id.clone())
                .ok_or_else(|| ApiError::Auth("invalid login credentials".to_string()))?
        };

        let access_token = issue_token(&self.jwt_secret, &user_id, Some(email), TOKEN_TTL_SECS)?;
        Ok(SessionGrant {
            access_token,
            expires_in: TOKEN_TTL_SECS,
            user_id,
        })
    }
}
