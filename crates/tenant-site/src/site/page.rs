use std::collections::BTreeSet;

use serde::Serialize;

use crate::revalidation::DEFAULT_TAGS;
use crate::tenancy::{Branding, SeoDefaults, Tenant, TenantContext, TenantSummary};

/// Tenant-specific frame every page is rendered into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageShell {
    pub tenant: TenantSummary,
    pub host: String,
    pub path: String,
    /// False when the host was unknown and the main tenant stood in.
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    pub branding: Branding,
    pub seo: SeoDefaults,
}

impl PageShell {
    /// `None` when the context carries no tenant.
    pub fn from_context(context: &TenantContext, path: &str, site_url: Option<&str>) -> Option<Self> {
        let tenant = context.tenant.as_ref()?;

        let seo = SeoDefaults {
            site_name: tenant
                .seo
                .site_name
                .clone()
                .or_else(|| Some(tenant.name.clone())),
            description: tenant.seo.description.clone(),
        };

        Some(Self {
            tenant: tenant.summary(),
            host: context.clean_host.clone(),
            path: path.to_string(),
            matched: context.matched,
            canonical_url: canonical_url(tenant, path, site_url),
            branding: tenant.branding.clone(),
            seo,
        })
    }
}

fn canonical_url(tenant: &Tenant, path: &str, site_url: Option<&str>) -> Option<String> {
    match tenant.primary_domain() {
        Some(domain) => Some(format!("https://{}{}", domain.domain, path)),
        None => site_url.map(|base| format!("{}{}", base.trim_end_matches('/'), path)),
    }
}

/// Cache tags attached to a page rendered for `tenant`.
pub fn page_tags(tenant: &Tenant) -> BTreeSet<String> {
    DEFAULT_TAGS
        .iter()
        .map(|tag| tag.to_string())
        .chain(std::iter::once(format!("tenant:{}", tenant.slug)))
        .collect()
}
