use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tenant_site::error::AppError;
use tenant_site::tenancy::InMemoryTenantDirectory;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the tenant directory from the seed file, or an empty one when no seed is configured.
pub(crate) fn load_directory(seed: Option<&Path>) -> Result<InMemoryTenantDirectory, AppError> {
    let Some(path) = seed else {
        warn!("no tenant seed configured; every host will fail to resolve");
        return Ok(InMemoryTenantDirectory::default());
    };

    let directory = InMemoryTenantDirectory::from_path(path)?;
    info!(seed = %path.display(), tenants = directory.len(), "tenant directory loaded");
    Ok(directory)
}

#[cfg(test)]
pub(crate) fn sample_seed() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/seed/tenants.json"))
}
