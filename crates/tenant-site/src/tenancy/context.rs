use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::trace;

use super::domain::Tenant;
use super::hostname::normalize_hostname;

pub const TENANT_HOST_HEADER: HeaderName = HeaderName::from_static("x-tenant-host");
pub const TENANT_CLEAN_HOST_HEADER: HeaderName = HeaderName::from_static("x-tenant-clean-host");

const EXCLUDED_PREFIXES: [&str; 5] = ["/admin", "/api", "/_next", "/favicon", "/media"];

/// Whether `path` is rendered per tenant. Admin, API, framework assets, media,
/// and anything that looks like a file are not.
pub fn is_tenant_scoped_path(path: &str) -> bool {
    if path.contains('.') {
        return false;
    }
    !EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Host values attached to a tenant-scoped request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantHostHeaders {
    pub host: String,
    pub clean_host: String,
}

/// Headers to attach for `path`, derived only from the incoming host value.
/// `None` means the request passes through untouched.
pub fn tenant_host_headers(path: &str, host: Option<&str>) -> Option<TenantHostHeaders> {
    if !is_tenant_scoped_path(path) {
        return None;
    }

    let host = host.unwrap_or_default();
    Some(TenantHostHeaders {
        host: host.to_string(),
        clean_host: normalize_hostname(host),
    })
}

impl TenantHostHeaders {
    /// Write both headers, replacing any value a client may have sent.
    pub fn apply(&self, headers: &mut HeaderMap) {
        // Host values outside visible ASCII cannot round-trip; leave them empty.
        let raw = HeaderValue::from_str(&self.host).unwrap_or(HeaderValue::from_static(""));
        let clean =
            HeaderValue::from_str(&self.clean_host).unwrap_or(HeaderValue::from_static(""));
        headers.insert(TENANT_HOST_HEADER, raw);
        headers.insert(TENANT_CLEAN_HOST_HEADER, clean);
    }
}

/// Clean host previously attached by [`propagate_tenant_host`].
pub fn clean_host_from(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(&TENANT_CLEAN_HOST_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Middleware annotating tenant-scoped requests with `x-tenant-host` and
/// `x-tenant-clean-host`. It performs no tenant lookup.
pub async fn propagate_tenant_host(mut request: Request, next: Next) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| request.uri().authority().map(|authority| authority.to_string()));

    if let Some(headers) = tenant_host_headers(request.uri().path(), host.as_deref()) {
        trace!(clean_host = %headers.clean_host, path = %request.uri().path(), "tenant host attached");
        headers.apply(request.headers_mut());
    }

    next.run(request).await
}

/// Per-request view handed to render code once the tenant has been resolved.
/// `tenant` is `None` only when neither the host nor the main tenant resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant: Option<Tenant>,
    pub clean_host: String,
    pub matched: bool,
}
