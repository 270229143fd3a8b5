use crate::cli::ServeArgs;
use crate::infra::{load_directory, AppState};
use crate::routes::edge_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tenant_site::config::AppConfig;
use tenant_site::error::AppError;
use tenant_site::revalidation::{RevalidationService, StaticTokenAuthenticator};
use tenant_site::site::{InMemoryRenderCache, SiteRenderer};
use tenant_site::telemetry::{self, LogOutput};
use tenant_site::tenancy::TenantResolver;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogOutput::Service)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(load_directory(config.tenancy.seed_path.as_deref())?);
    let resolver = Arc::new(
        TenantResolver::new(directory, config.tenancy.cache_ttl)
            .with_memo_capacity(config.tenancy.memo_capacity),
    );
    let render_cache = Arc::new(InMemoryRenderCache::with_capacity(
        config.render_cache_capacity,
    ));
    let renderer = Arc::new(SiteRenderer::new(
        resolver,
        render_cache.clone(),
        config.site_url.clone(),
    ));

    if config.revalidation.tokens.is_empty() {
        warn!("REVALIDATE_TOKENS is empty; every revalidation request will be rejected");
    }
    let authenticator = Arc::new(StaticTokenAuthenticator::new(
        config.revalidation.tokens.iter().cloned(),
        config.revalidation.session_cookie.clone(),
    ));
    let revalidation = Arc::new(RevalidationService::new(
        authenticator,
        render_cache,
        config.revalidation.body_policy,
    ));

    let app = edge_router(renderer, revalidation)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        body_policy = %config.revalidation.body_policy,
        "tenant site edge ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
