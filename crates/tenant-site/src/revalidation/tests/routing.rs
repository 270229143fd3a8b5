use super::common::*;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::revalidation::invalidator::PathScope;
use crate::revalidation::request::BodyPolicy;
use crate::revalidation::router::{revalidate_handler, revalidation_router, REVALIDATE_PATH};
use crate::revalidation::service::RevalidationService;
use crate::revalidation::StaticTokenAuthenticator;

fn post(body: &'static str, authorized: bool) -> Request<Body> {
    let mut builder = Request::post(REVALIDATE_PATH).header(header::CONTENT_TYPE, "application/json");
    if authorized {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {OPERATOR_TOKEN}"));
    }
    builder.body(Body::from(body)).expect("request builds")
}

#[tokio::test]
async fn path_revalidation_echoes_path() {
    let (service, cache) = build_service(BodyPolicy::Lenient);
    let router = revalidation_router(Arc::new(service));

    let response = router
        .oneshot(post(r#"{"type":"path","path":"/about"}"#, true))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({ "success": true, "revalidated": "path", "path": "/about" })
    );
    assert_eq!(
        cache.calls(),
        vec![Call::Path("/about".to_string(), PathScope::Page)]
    );
}

#[tokio::test]
async fn empty_object_revalidates_everything() {
    let (service, cache) = build_service(BodyPolicy::Lenient);
    let router = revalidation_router(Arc::new(service));

    let response = router
        .oneshot(post("{}", true))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload, json!({ "success": true, "revalidated": "all" }));
    assert_eq!(cache.calls(), default_calls());
}

#[tokio::test]
async fn unauthenticated_post_is_rejected() {
    let (service, cache) = build_service(BodyPolicy::Lenient);
    let router = revalidation_router(Arc::new(service));

    let response = router
        .oneshot(post(r#"{"type":"tag","tag":"posts"}"#, false))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(cache.calls().is_empty());
}

#[tokio::test]
async fn non_post_methods_are_not_allowed() {
    let (service, cache) = build_service(BodyPolicy::Lenient);
    let router = revalidation_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get(REVALIDATE_PATH)
                .header(header::AUTHORIZATION, format!("Bearer {OPERATOR_TOKEN}"))
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(cache.calls().is_empty());
}

#[tokio::test]
async fn strict_policy_returns_bad_request() {
    let (service, cache) = build_service(BodyPolicy::Strict);
    let router = revalidation_router(Arc::new(service));

    let response = router
        .oneshot(post("definitely not json", true))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .contains("not valid JSON"));
    assert!(cache.calls().is_empty());
}

#[tokio::test]
async fn cache_failure_returns_plain_text_error() {
    let service = Arc::new(RevalidationService::new(
        Arc::new(authenticator()),
        Arc::new(FailingCache),
        BodyPolicy::Lenient,
    ));

    let response = revalidate_handler::<StaticTokenAuthenticator, FailingCache>(
        State(service),
        authorized_headers(),
        Bytes::from_static(br#"{"type":"tag","tag":"posts"}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/plain; charset=utf-8")
    );
    let body = read_body(response).await;
    assert_eq!(body, b"Error revalidating");
}

#[tokio::test]
async fn session_store_outage_is_a_server_error() {
    let cache = Arc::new(RecordingCache::default());
    let service = Arc::new(RevalidationService::new(
        Arc::new(UnavailableAuth),
        cache.clone(),
        BodyPolicy::Lenient,
    ));

    let response = revalidate_handler::<UnavailableAuth, RecordingCache>(
        State(service),
        HeaderMap::new(),
        Bytes::new(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(cache.calls().is_empty());
}
