use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, warn};

use super::context::TenantContext;
use super::directory::{DirectoryError, TenantDirectory};
use super::domain::Tenant;
use super::hostname::normalize_hostname;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no main tenant is configured")]
    MissingMainTenant,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Outcome of host resolution with the main-tenant fallback applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTenant {
    pub tenant: Tenant,
    /// False when no tenant claimed the host and the main tenant was substituted.
    pub matched: bool,
}

/// Hosts memoized before the oldest lookup is dropped.
pub const DEFAULT_MEMO_CAPACITY: usize = 4_096;

struct CachedLookup {
    stored_at: Instant,
    sequence: u64,
    tenant: Option<Tenant>,
}

/// Host-to-tenant resolution over an injected directory.
///
/// Successful lookups (including misses) are memoized per normalized host for
/// `cache_ttl`; a zero TTL disables the memo. Directory failures are never stored.
/// The memo holds at most `memo_capacity` hosts.
pub struct TenantResolver<D> {
    directory: Arc<D>,
    cache_ttl: Duration,
    memo_capacity: usize,
    cache: Mutex<HashMap<String, CachedLookup>>,
    next_sequence: AtomicU64,
}

impl<D> TenantResolver<D>
where
    D: TenantDirectory + 'static,
{
    pub fn new(directory: Arc<D>, cache_ttl: Duration) -> Self {
        Self {
            directory,
            cache_ttl,
            memo_capacity: DEFAULT_MEMO_CAPACITY,
            cache: Mutex::new(HashMap::new()),
            next_sequence: AtomicU64::new(0),
        }
    }

    pub fn with_memo_capacity(mut self, memo_capacity: usize) -> Self {
        self.memo_capacity = memo_capacity;
        self
    }

    pub fn uncached(directory: Arc<D>) -> Self {
        Self::new(directory, Duration::ZERO)
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    /// Active tenant claiming `host`, or `None`.
    ///
    /// A failing directory degrades to `None` so callers fall back to the main tenant.
    pub fn resolve_tenant(&self, host: &str) -> Option<Tenant> {
        let host = normalize_hostname(host);
        if host.is_empty() {
            return None;
        }

        if let Some(hit) = self.cached(&host) {
            return hit;
        }

        match self.directory.find_tenant_by_domain(&host) {
            Ok(found) => {
                let tenant = found.filter(Tenant::is_active);
                self.remember(&host, tenant.clone());
                tenant
            }
            Err(err) => {
                warn!(%host, error = %err, "tenant lookup failed; falling back to main tenant");
                None
            }
        }
    }

    pub fn resolve_main_tenant(&self) -> Result<Tenant, ResolveError> {
        self.directory
            .find_main_tenant()?
            .ok_or(ResolveError::MissingMainTenant)
    }

    pub fn resolve_or_main(&self, host: &str) -> Result<ResolvedTenant, ResolveError> {
        if let Some(tenant) = self.resolve_tenant(host) {
            return Ok(ResolvedTenant {
                tenant,
                matched: true,
            });
        }

        debug!(host, "no tenant claims host; using main tenant");
        let tenant = self.resolve_main_tenant()?;
        Ok(ResolvedTenant {
            tenant,
            matched: false,
        })
    }

    /// Request context for `clean_host`; a resolution failure is logged and leaves
    /// the tenant empty.
    pub fn context_for(&self, clean_host: &str) -> TenantContext {
        match self.resolve_or_main(clean_host) {
            Ok(resolved) => TenantContext {
                tenant: Some(resolved.tenant),
                clean_host: clean_host.to_string(),
                matched: resolved.matched,
            },
            Err(err) => {
                error!(host = clean_host, error = %err, "tenant resolution failed");
                TenantContext {
                    tenant: None,
                    clean_host: clean_host.to_string(),
                    matched: false,
                }
            }
        }
    }

    /// Hosts currently memoized, expired entries included until the next insert.
    pub fn memo_len(&self) -> usize {
        self.cache.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut guard) = self.cache.lock() {
            guard.clear();
        }
    }

    fn cached(&self, host: &str) -> Option<Option<Tenant>> {
        if self.cache_ttl.is_zero() {
            return None;
        }

        let guard = self.cache.lock().ok()?;
        guard
            .get(host)
            .filter(|entry| entry.stored_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.tenant.clone())
    }

    fn remember(&self, host: &str, tenant: Option<Tenant>) {
        if self.cache_ttl.is_zero() || self.memo_capacity == 0 {
            return;
        }

        if let Ok(mut guard) = self.cache.lock() {
            guard.retain(|_, entry| entry.stored_at.elapsed() < self.cache_ttl);
            if !guard.contains_key(host) && guard.len() >= self.memo_capacity {
                let oldest = guard
                    .iter()
                    .min_by_key(|(_, entry)| entry.sequence)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    guard.remove(&oldest);
                }
            }
            guard.insert(
                host.to_string(),
                CachedLookup {
                    stored_at: Instant::now(),
                    sequence: self.next_sequence.fetch_add(1, AtomicOrdering::Relaxed),
                    tenant,
                },
            );
        }
    }
}
