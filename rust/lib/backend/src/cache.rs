//! Query cache in front of a [`Backend`].
//!
//! Lookups are cached per key for `stale_time`; transient failures are
//! retried `retry` times before surfacing. Writes go straight through and
//! invalidate what they touch. Sign-in is never cached or retried.
//!
//! Keys come from request paths, so each map is bounded: expired entries
//! are dropped on read and on insert, and a full map evicts its oldest
//! entry. A lookup that raced with a write is returned but not stored.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{ApiError, Backend, ProfilePatch, ProfileRow, SessionGrant, SettingsPatch, SettingsRow};

/// Cache behaviour, passed explicitly by whoever builds the client.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// How long a cached lookup counts as fresh.
    pub stale_time: Duration,
    /// Extra attempts after a transient failure.
    pub retry: u32,
    /// Upper bound on cached lookups of each kind.
    pub max_entries: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(300), // 5 min
            retry: 1,
            max_entries: 1024,
        }
    }
}

struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// Bounded TTL map for one kind of lookup.
struct TtlMap<T> {
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    /// Bumped by every invalidation.
    epoch: AtomicU64,
}

impl<T: Clone> TtlMap<T> {
    fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Cached value for a key. `None` if expired or missing.
    fn get(&self, key: &str) -> Option<T> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.get(key).is_some_and(|e| e.inserted_at.elapsed() >= self.ttl) {
            entries.remove(key);
        }
        None
    }

    /// Invalidation epoch to pass to [`TtlMap::set`] after a fetch.
    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Store a value fetched while `epoch` was current. Dropped if an
    /// invalidation happened since.
    fn set(&self, key: &str, value: T, epoch: u64) {
        if self.ttl.is_zero() || self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(key, "lookup raced with a write, not caching");
            return;
        }

        let ttl = self.ttl;
        entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        entries.remove(key);
    }

    fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        entries.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub struct CachedBackend {
    inner: Arc<dyn Backend>,
    config: QueryConfig,
    profiles: TtlMap<Option<ProfileRow>>,
    settings: TtlMap<Option<SettingsRow>>,
}

impl CachedBackend {
    pub fn new(inner: Arc<dyn Backend>, config: QueryConfig) -> Self {
        Self {
            profiles: TtlMap::new(config.stale_time, config.max_entries),
            settings: TtlMap::new(config.stale_time, config.max_entries),
            inner,
            config,
        }
    }

    /// Run `op`, repeating it up to `retry` more times on transient errors.
    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Err(e) if e.is_transient() && attempt < self.config.retry => {
                    attempt += 1;
                    warn!("{} failed (attempt {}), retrying: {}", what, attempt, e);
                }
                other => return other,
            }
        }
    }
}

fn username_key(username: &str) -> String {
    format!("username:{}", username)
}

fn id_key(id: &str) -> String {
    format!("id:{}", id)
}

#[async_trait::async_trait]
impl Backend for CachedBackend {
    async fn profile_by_username(&self, username: &str) -> Result<Option<ProfileRow>, ApiError> {
        let key = username_key(username);
        if let Some(hit) = self.profiles.get(&key) {
            debug!(username, "profile cache hit");
            return Ok(hit);
        }
        let epoch = self.profiles.epoch();
        let inner = &self.inner;
        let row = self
            .with_retry("profile lookup", move || inner.profile_by_username(username))
            .await?;
        self.profiles.set(&key, row.clone(), epoch);
        Ok(row)
    }

    async fn profile_by_id(&self, id: &str) -> Result<Option<ProfileRow>, ApiError> {
        let key = id_key(id);
        if let Some(hit) = self.profiles.get(&key) {
            debug!(id, "profile cache hit");
            return Ok(hit);
        }
        let epoch = self.profiles.epoch();
        let inner = &self.inner;
        let row = self
            .with_retry("profile lookup", move || inner.profile_by_id(id))
            .await?;
        self.profiles.set(&key, row.clone(), epoch);
        Ok(row)
    }

    async fn settings_by_profile_id(&self, id: &str) -> Result<Option<SettingsRow>, ApiError> {
        if let Some(hit) = self.settings.get(id) {
            debug!(id, "settings cache hit");
            return Ok(hit);
        }
        let epoch = self.settings.epoch();
        let inner = &self.inner;
        let row = self
            .with_retry("settings lookup", move || inner.settings_by_profile_id(id))
            .await?;
        self.settings.set(id, row.clone(), epoch);
        Ok(row)
    }

    async fn update_profile(
        &self,
        access_token: &str,
        id: &str,
        patch: &ProfilePatch,
    ) -> Result<(), ApiError> {
        let result = self.inner.update_profile(access_token, id, patch).await;
        // Username-keyed entries cannot be found by id; drop them all.
        self.profiles.invalidate_all();
        result
    }

    async fn update_settings(
        &self,
        access_token: &str,
        id: &str,
        patch: &SettingsPatch,
    ) -> Result<(), ApiError> {
        let result = self.inner.update_settings(access_token, id, patch).await;
        self.settings.invalidate(id);
        result
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionGrant, ApiError> {
        self.inner.sign_in(email, password).await
    }
}
