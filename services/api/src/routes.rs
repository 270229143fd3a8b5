use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{middleware, Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tenant_site::revalidation::{
    revalidation_router, CacheInvalidator, RevalidationService, SessionAuthenticator,
};
use tenant_site::site::{site_router, SiteRenderer};
use tenant_site::tenancy::{propagate_tenant_host, TenantDirectory};

/// Full edge router: revalidation, operational endpoints, and the tenant site
/// fallback, all behind host propagation.
pub(crate) fn edge_router<D, A, C>(
    renderer: Arc<SiteRenderer<D>>,
    revalidation: Arc<RevalidationService<A, C>>,
) -> Router
where
    D: TenantDirectory + 'static,
    A: SessionAuthenticator + 'static,
    C: CacheInvalidator + 'static,
{
    revalidation_router(revalidation)
        .merge(site_router(renderer))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .layer(middleware::from_fn(propagate_tenant_host))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
