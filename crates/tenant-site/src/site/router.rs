use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::json;
use tracing::{error, warn};

use crate::tenancy::{clean_host_from, is_tenant_scoped_path, TenantDirectory, TenantResolver};

use super::cache::InMemoryRenderCache;
use super::page::{page_tags, PageShell};

pub const RENDER_CACHE_HEADER: HeaderName = HeaderName::from_static("x-render-cache");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page: PageShell,
    pub cache: CacheStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no tenant available for host '{0}'")]
    NoTenant(String),
}

/// Render layer: resolves the tenant for a clean host and serves page shells
/// through the render cache.
pub struct SiteRenderer<D> {
    resolver: Arc<TenantResolver<D>>,
    cache: Arc<InMemoryRenderCache>,
    site_url: Option<String>,
}

impl<D> SiteRenderer<D>
where
    D: TenantDirectory + 'static,
{
    pub fn new(
        resolver: Arc<TenantResolver<D>>,
        cache: Arc<InMemoryRenderCache>,
        site_url: Option<String>,
    ) -> Self {
        Self {
            resolver,
            cache,
            site_url,
        }
    }

    pub fn render(&self, clean_host: &str, path: &str) -> Result<RenderedPage, RenderError> {
        if let Some(cached) = self.cache.get(clean_host, path) {
            return Ok(RenderedPage {
                page: cached.page,
                cache: CacheStatus::Hit,
            });
        }

        let context = self.resolver.context_for(clean_host);
        let page = PageShell::from_context(&context, path, self.site_url.as_deref())
            .ok_or_else(|| RenderError::NoTenant(clean_host.to_string()))?;

        // Fallback renders are keyed by a client-chosen host, so only pages for
        // hosts a tenant actually claims are kept.
        if let Some(tenant) = context.tenant.as_ref().filter(|_| context.matched) {
            if let Err(err) = self
                .cache
                .store(clean_host, path, page.clone(), page_tags(tenant))
            {
                warn!(error = %err, path, "rendered page not cached");
            }
        }

        Ok(RenderedPage {
            page,
            cache: CacheStatus::Miss,
        })
    }
}

/// Fallback router serving every tenant-scoped path not claimed elsewhere.
pub fn site_router<D>(renderer: Arc<SiteRenderer<D>>) -> Router
where
    D: TenantDirectory + 'static,
{
    Router::new()
        .fallback(render_handler::<D>)
        .with_state(renderer)
}

pub(crate) async fn render_handler<D>(
    State(renderer): State<Arc<SiteRenderer<D>>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response
where
    D: TenantDirectory + 'static,
{
    let path = uri.path();
    if !is_tenant_scoped_path(path) {
        let payload = json!({ "error": "not found" });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    }

    let clean_host = clean_host_from(&headers).unwrap_or_default();
    match renderer.render(clean_host, path) {
        Ok(rendered) => (
            StatusCode::OK,
            [(RENDER_CACHE_HEADER, rendered.cache.label())],
            axum::Json(rendered.page),
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, path, "page render failed");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
