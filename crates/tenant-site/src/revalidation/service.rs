use std::sync::Arc;

use axum::http::HeaderMap;
use serde::Serialize;
use tracing::{info, warn};

use super::auth::{AuthError, Principal, SessionAuthenticator};
use super::invalidator::{CacheError, CacheInvalidator, PathScope, DEFAULT_TAGS, ROOT_LAYOUT_PATH};
use super::request::{plan_from_body, BodyError, BodyPolicy, RevalidationPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevalidatedScope {
    Path,
    Tag,
    All,
}

/// Success payload returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevalidationOutcome {
    pub success: bool,
    pub revalidated: RevalidatedScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RevalidationError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(AuthError),
    #[error("session check failed: {0}")]
    AuthUnavailable(AuthError),
    #[error(transparent)]
    InvalidBody(#[from] BodyError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Authenticated render-cache invalidation by tag, path, or the global defaults.
pub struct RevalidationService<A, C> {
    authenticator: Arc<A>,
    cache: Arc<C>,
    policy: BodyPolicy,
}

impl<A, C> RevalidationService<A, C>
where
    A: SessionAuthenticator + 'static,
    C: CacheInvalidator + 'static,
{
    pub fn new(authenticator: Arc<A>, cache: Arc<C>, policy: BodyPolicy) -> Self {
        Self {
            authenticator,
            cache,
            policy,
        }
    }

    pub fn policy(&self) -> BodyPolicy {
        self.policy
    }

    /// Authenticate, plan from the raw body, then invalidate.
    /// Nothing is invalidated unless both earlier steps succeed.
    pub fn revalidate(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<RevalidationOutcome, RevalidationError> {
        let principal = self.authenticate(headers)?;
        let plan = plan_from_body(body, self.policy)?;
        self.apply(&plan)?;

        info!(
            token_index = principal.token_index,
            source = ?principal.source,
            ?plan,
            "render cache revalidated"
        );

        Ok(outcome_for(plan))
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, RevalidationError> {
        match self.authenticator.authenticate(headers) {
            Ok(principal) => Ok(principal),
            Err(err @ AuthError::Unavailable(_)) => Err(RevalidationError::AuthUnavailable(err)),
            Err(err) => {
                warn!(error = %err, "revalidation request rejected");
                Err(RevalidationError::Unauthenticated(err))
            }
        }
    }

    fn apply(&self, plan: &RevalidationPlan) -> Result<(), CacheError> {
        match plan {
            RevalidationPlan::Path(path) => self.cache.invalidate_path(path, PathScope::Page),
            RevalidationPlan::Tag(tag) => self.cache.invalidate_tag(tag),
            RevalidationPlan::All => {
                for tag in DEFAULT_TAGS {
                    self.cache.invalidate_tag(tag)?;
                }
                self.cache
                    .invalidate_path(ROOT_LAYOUT_PATH, PathScope::Layout)
            }
        }
    }
}

fn outcome_for(plan: RevalidationPlan) -> RevalidationOutcome {
    let (revalidated, path, tag) = match plan {
        RevalidationPlan::Path(path) => (RevalidatedScope::Path, Some(path), None),
        RevalidationPlan::Tag(tag) => (RevalidatedScope::Tag, None, Some(tag)),
        RevalidationPlan::All => (RevalidatedScope::All, None, None),
    };

    RevalidationOutcome {
        success: true,
        revalidated,
        path,
        tag,
    }
}
