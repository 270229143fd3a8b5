use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;
use tracing::error;

use super::auth::SessionAuthenticator;
use super::invalidator::CacheInvalidator;
use super::service::{RevalidationError, RevalidationService};

pub const REVALIDATE_PATH: &str = "/api/revalidate";

/// Router exposing `POST /api/revalidate`; other methods get `405`.
pub fn revalidation_router<A, C>(service: Arc<RevalidationService<A, C>>) -> Router
where
    A: SessionAuthenticator + 'static,
    C: CacheInvalidator + 'static,
{
    Router::new()
        .route(REVALIDATE_PATH, post(revalidate_handler::<A, C>))
        .with_state(service)
}

pub(crate) async fn revalidate_handler<A, C>(
    State(service): State<Arc<RevalidationService<A, C>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    A: SessionAuthenticator + 'static,
    C: CacheInvalidator + 'static,
{
    match service.revalidate(&headers, &body) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(RevalidationError::Unauthenticated(err)) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
        Err(RevalidationError::InvalidBody(err)) => {
            let payload = json!({
                "error": err.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            error!(error = %other, "revalidation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                "Error revalidating",
            )
                .into_response()
        }
    }
}
