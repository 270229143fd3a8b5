use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::revalidation::{CacheError, CacheInvalidator, PathScope};

use super::page::PageShell;

/// Entries kept before the oldest page is dropped to make room.
pub const DEFAULT_RENDER_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub page: PageShell,
    pub tags: BTreeSet<String>,
    pub rendered_at: DateTime<Utc>,
    sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidationTarget {
    Tag { tag: String },
    Path { path: String, scope: PathScope },
}

/// One entry of the invalidation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidationRecord {
    pub target: InvalidationTarget,
    pub evicted: usize,
    pub at: DateTime<Utc>,
}

#[derive(Default)]
struct RenderCacheState {
    pages: BTreeMap<(String, String), CachedPage>,
    history: Vec<InvalidationRecord>,
    next_sequence: u64,
}

/// Rendered page shells keyed by (clean host, path), holding at most
/// `capacity` entries. When full, the oldest stored page makes room.
pub struct InMemoryRenderCache {
    state: Mutex<RenderCacheState>,
    capacity: usize,
}

impl Default for InMemoryRenderCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RENDER_CACHE_CAPACITY)
    }
}

impl InMemoryRenderCache {
    /// A zero capacity disables caching.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(RenderCacheState::default()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, host: &str, path: &str) -> Option<CachedPage> {
        let key = (host.to_string(), path.to_string());
        let state = self.lock().ok()?;
        state.pages.get(&key).cloned()
    }

    pub fn store(
        &self,
        host: &str,
        path: &str,
        page: PageShell,
        tags: BTreeSet<String>,
    ) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Ok(());
        }

        let key = (host.to_string(), path.to_string());
        let mut state = self.lock()?;
        if !state.pages.contains_key(&key) && state.pages.len() >= self.capacity {
            let oldest = state
                .pages
                .iter()
                .min_by_key(|(_, cached)| cached.sequence)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                debug!(host = %oldest.0, path = %oldest.1, "render cache full; dropping oldest page");
                state.pages.remove(&oldest);
            }
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.pages.insert(
            key,
            CachedPage {
                page,
                tags,
                rendered_at: Utc::now(),
                sequence,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.pages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invalidations applied so far, oldest first.
    pub fn history(&self) -> Vec<InvalidationRecord> {
        self.lock()
            .map(|state| state.history.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, RenderCacheState>, CacheError> {
        self.state
            .lock()
            .map_err(|_| CacheError::Unavailable("render cache lock poisoned".to_string()))
    }

    fn evict<F>(&self, target: InvalidationTarget, matches: F) -> Result<(), CacheError>
    where
        F: Fn(&(String, String), &CachedPage) -> bool,
    {
        let mut state = self.lock()?;
        let before = state.pages.len();
        state.pages.retain(|key, page| !matches(key, &*page));
        let evicted = before - state.pages.len();

        debug!(?target, evicted, "render cache entries evicted");
        state.history.push(InvalidationRecord {
            target,
            evicted,
            at: Utc::now(),
        });
        Ok(())
    }
}

impl CacheInvalidator for InMemoryRenderCache {
    fn invalidate_tag(&self, tag: &str) -> Result<(), CacheError> {
        self.evict(
            InvalidationTarget::Tag {
                tag: tag.to_string(),
            },
            |_, page| page.tags.contains(tag),
        )
    }

    fn invalidate_path(&self, path: &str, scope: PathScope) -> Result<(), CacheError> {
        let target = InvalidationTarget::Path {
            path: path.to_string(),
            scope,
        };
        match scope {
            PathScope::Page => self.evict(target, |(_, cached), _| cached == path),
            PathScope::Layout => self.evict(target, |(_, cached), _| is_at_or_below(cached, path)),
        }
    }
}

fn is_at_or_below(path: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return true;
    }
    path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}
