use super::common::*;
use axum::http::HeaderMap;
use std::sync::Arc;

use crate::revalidation::invalidator::PathScope;
use crate::revalidation::request::{BodyError, BodyPolicy};
use crate::revalidation::service::{RevalidatedScope, RevalidationError, RevalidationService};

#[test]
fn path_request_invalidates_only_that_page() {
    let (service, cache) = build_service(BodyPolicy::Lenient);

    let outcome = service
        .revalidate(&authorized_headers(), br#"{"type":"path","path":"/about"}"#)
        .expect("revalidation succeeds");

    assert!(outcome.success);
    assert_eq!(outcome.revalidated, RevalidatedScope::Path);
    assert_eq!(outcome.path.as_deref(), Some("/about"));
    assert_eq!(
        cache.calls(),
        vec![Call::Path("/about".to_string(), PathScope::Page)]
    );
}

#[test]
fn tag_request_invalidates_only_that_tag() {
    let (service, cache) = build_service(BodyPolicy::Lenient);

    let outcome = service
        .revalidate(&authorized_headers(), br#"{"type":"tag","tag":"posts"}"#)
        .expect("revalidation succeeds");

    assert_eq!(outcome.revalidated, RevalidatedScope::Tag);
    assert_eq!(outcome.tag.as_deref(), Some("posts"));
    assert_eq!(cache.calls(), vec![Call::Tag("posts".to_string())]);
}

#[test]
fn empty_body_invalidates_global_defaults() {
    let (service, cache) = build_service(BodyPolicy::Lenient);

    let outcome = service
        .revalidate(&authorized_headers(), b"{}")
        .expect("revalidation succeeds");

    assert_eq!(outcome.revalidated, RevalidatedScope::All);
    assert!(outcome.path.is_none() && outcome.tag.is_none());
    assert_eq!(cache.calls(), default_calls());
}

#[test]
fn missing_credentials_never_touch_the_cache() {
    let (service, cache) = build_service(BodyPolicy::Lenient);

    let err = service
        .revalidate(&HeaderMap::new(), br#"{"type":"tag","tag":"posts"}"#)
        .expect_err("unauthenticated");

    assert!(matches!(err, RevalidationError::Unauthenticated(_)));
    assert!(cache.calls().is_empty());
}

#[test]
fn strict_policy_rejects_before_invalidating() {
    let (service, cache) = build_service(BodyPolicy::Strict);

    let err = service
        .revalidate(&authorized_headers(), br#"{"type":"path"}"#)
        .expect_err("incomplete body");

    assert!(matches!(
        err,
        RevalidationError::InvalidBody(BodyError::MissingValue { .. })
    ));
    assert!(cache.calls().is_empty());
}

#[test]
fn cache_failure_surfaces_as_error() {
    let service = RevalidationService::new(
        Arc::new(authenticator()),
        Arc::new(FailingCache),
        BodyPolicy::Lenient,
    );

    let err = service
        .revalidate(&authorized_headers(), b"")
        .expect_err("cache offline");
    assert!(matches!(err, RevalidationError::Cache(_)));
}

#[test]
fn unavailable_session_store_is_not_an_auth_rejection() {
    let cache = Arc::new(RecordingCache::default());
    let service = RevalidationService::new(Arc::new(UnavailableAuth), cache.clone(), BodyPolicy::Lenient);

    let err = service
        .revalidate(&authorized_headers(), b"{}")
        .expect_err("auth offline");
    assert!(matches!(err, RevalidationError::AuthUnavailable(_)));
    assert!(cache.calls().is_empty());
}
