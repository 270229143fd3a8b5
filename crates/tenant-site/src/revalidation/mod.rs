//! Authenticated invalidation of rendered output by tag or path.
//!
//! Authoring hooks and operators call `POST /api/revalidate`. The endpoint
//! authenticates through a [`SessionAuthenticator`], turns the body into a
//! [`RevalidationPlan`] under the configured [`BodyPolicy`], and drives a
//! [`CacheInvalidator`]. Tag and path values are passed through as given.

pub mod auth;
pub mod invalidator;
pub mod request;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, CredentialSource, Principal, SessionAuthenticator, StaticTokenAuthenticator};
pub use invalidator::{CacheError, CacheInvalidator, PathScope, DEFAULT_TAGS, ROOT_LAYOUT_PATH};
pub use request::{plan_from_body, BodyError, BodyPolicy, RevalidateRequest, RevalidationPlan};
pub use router::{revalidation_router, REVALIDATE_PATH};
pub use service::{RevalidatedScope, RevalidationError, RevalidationOutcome, RevalidationService};
