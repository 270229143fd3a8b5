use crate::infra::load_directory;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tenant_site::config::AppConfig;
use tenant_site::error::AppError;
use tenant_site::telemetry::{self, LogOutput};
use tenant_site::tenancy::{
    normalize_hostname, ResolvedTenant, Tenant, TenantDirectory, TenantResolver,
};

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// Tenant seed file (defaults to TENANT_SEED_PATH)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    /// Host header value to resolve, port and `www.` allowed
    pub(crate) host: String,
    #[command(flatten)]
    pub(crate) seed: SeedArgs,
    /// Print the resolution as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

fn prepare(seed: SeedArgs) -> Result<Option<PathBuf>, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogOutput::Command)?;
    Ok(seed.seed.or(config.tenancy.seed_path))
}

pub(crate) fn run_tenants_list(args: SeedArgs) -> Result<(), AppError> {
    let seed = prepare(args)?;
    let directory = load_directory(seed.as_deref())?;
    let tenants = directory.tenants()?;
    print!("{}", render_tenant_listing(&tenants));
    Ok(())
}

pub(crate) fn run_tenants_resolve(args: ResolveArgs) -> Result<(), AppError> {
    let ResolveArgs { host, seed, json } = args;
    let seed = prepare(seed)?;
    let directory = Arc::new(load_directory(seed.as_deref())?);
    let resolver = TenantResolver::uncached(directory);
    let resolved = resolver.resolve_or_main(&host)?;

    if json {
        match serde_json::to_string_pretty(&resolved) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Resolution payload unavailable: {err}"),
        }
    } else {
        print!("{}", render_resolution(&host, &resolved));
    }
    Ok(())
}

pub(crate) fn render_tenant_listing(tenants: &[Tenant]) -> String {
    let mut out = String::new();
    if tenants.is_empty() {
        out.push_str("No tenants seeded\n");
        return out;
    }

    let _ = writeln!(out, "Tenants ({})", tenants.len());
    for tenant in tenants {
        let mut flags = vec![tenant.status.label()];
        if tenant.is_main() {
            flags.insert(0, "main");
        }
        let _ = writeln!(
            out,
            "- {} {} [{}]",
            tenant.slug,
            tenant.name,
            flags.join(", ")
        );
        for domain in &tenant.domains {
            let mut notes = Vec::new();
            if domain.primary {
                notes.push("primary");
            }
            if domain.verified {
                notes.push("verified");
            }
            if notes.is_empty() {
                let _ = writeln!(out, "    {}", domain.domain);
            } else {
                let _ = writeln!(out, "    {} ({})", domain.domain, notes.join(", "));
            }
        }
    }
    out
}

pub(crate) fn render_resolution(host: &str, resolved: &ResolvedTenant) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Host: {host}");
    let _ = writeln!(out, "Clean host: {}", normalize_hostname(host));
    let _ = writeln!(
        out,
        "Tenant: {} ({}, id {})",
        resolved.tenant.name, resolved.tenant.slug, resolved.tenant.id
    );
    if resolved.matched {
        out.push_str("Match: domain\n");
    } else {
        out.push_str("Match: none, fell back to main tenant\n");
    }
    out
}
