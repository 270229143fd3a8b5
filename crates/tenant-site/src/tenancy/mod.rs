//! Host-based tenant resolution and request annotation.

pub mod context;
pub mod directory;
pub mod domain;
mod hostname;
pub mod resolver;

pub use context::{
    clean_host_from, is_tenant_scoped_path, propagate_tenant_host, tenant_host_headers,
    TenantContext, TenantHostHeaders, TENANT_CLEAN_HOST_HEADER, TENANT_HOST_HEADER,
};
pub use directory::{DirectoryError, InMemoryTenantDirectory, TenantDirectory};
pub use domain::{
    Branding, SeoDefaults, Tenant, TenantDomain, TenantId, TenantKind, TenantStatus,
    TenantSummary,
};
pub use hostname::normalize_hostname;
pub use resolver::{ResolveError, ResolvedTenant, TenantResolver, DEFAULT_MEMO_CAPACITY};
