use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::domain::{Tenant, TenantId};
use super::hostname::normalize_hostname;

/// Read-only query capability over the tenant records held by the content store.
pub trait TenantDirectory: Send + Sync {
    /// Tenant owning `domain`, compared against normalized domain entries.
    fn find_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DirectoryError>;
    fn find_main_tenant(&self) -> Result<Option<Tenant>, DirectoryError>;
    fn tenants(&self) -> Result<Vec<Tenant>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("domain '{domain}' is claimed by tenants {first} and {second}")]
    DuplicateDomain {
        domain: String,
        first: TenantId,
        second: TenantId,
    },
    #[error("tenants {first} and {second} are both flagged as main")]
    MultipleMainTenants { first: TenantId, second: TenantId },
    #[error("failed to read tenant seed {}: {source}", path.display())]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tenant seed: {0}")]
    SeedFormat(#[from] serde_json::Error),
    #[error("content store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Deserialize)]
struct TenantSeed {
    #[serde(default)]
    tenants: Vec<Tenant>,
}

/// Tenant directory built once from seed records; lookups never block.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTenantDirectory {
    tenants: Vec<Tenant>,
    by_domain: HashMap<String, usize>,
    main: Option<usize>,
}

impl InMemoryTenantDirectory {
    pub fn new(tenants: Vec<Tenant>) -> Result<Self, DirectoryError> {
        let mut by_domain: HashMap<String, usize> = HashMap::new();
        let mut main: Option<usize> = None;

        for (index, tenant) in tenants.iter().enumerate() {
            if tenant.is_main() {
                if let Some(existing) = main {
                    return Err(DirectoryError::MultipleMainTenants {
                        first: tenants[existing].id.clone(),
                        second: tenant.id.clone(),
                    });
                }
                main = Some(index);
            }

            for entry in &tenant.domains {
                let domain = normalize_hostname(&entry.domain);
                if domain.is_empty() {
                    continue;
                }
                match by_domain.get(&domain).copied() {
                    Some(owner) if owner != index => {
                        return Err(DirectoryError::DuplicateDomain {
                            domain,
                            first: tenants[owner].id.clone(),
                            second: tenant.id.clone(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        by_domain.insert(domain, index);
                    }
                }
            }
        }

        Ok(Self {
            tenants,
            by_domain,
            main,
        })
    }

    /// Parse a `{ "tenants": [...] }` seed document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let seed: TenantSeed = serde_json::from_reader(reader)?;
        Self::new(seed.tenants)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DirectoryError::SeedIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

impl TenantDirectory for InMemoryTenantDirectory {
    fn find_tenant_by_domain(&self, domain: &str) -> Result<Option<Tenant>, DirectoryError> {
        let key = normalize_hostname(domain);
        Ok(self
            .by_domain
            .get(&key)
            .map(|&index| self.tenants[index].clone()))
    }

    fn find_main_tenant(&self) -> Result<Option<Tenant>, DirectoryError> {
        Ok(self.main.map(|index| self.tenants[index].clone()))
    }

    fn tenants(&self) -> Result<Vec<Tenant>, DirectoryError> {
        Ok(self.tenants.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenancy::domain::{TenantDomain, TenantKind};

    fn harbor() -> Tenant {
        Tenant::new("t-harbor", "Harbor Homes", "harbor-homes")
            .with_domain(TenantDomain::new("www.HarborHomes.com").primary())
    }

    fn main_tenant() -> Tenant {
        Tenant::new("t-main", "Summit Realty", "summit").with_kind(TenantKind::Main)
    }

    #[test]
    fn domains_are_indexed_in_normalized_form() {
        let directory = InMemoryTenantDirectory::new(vec![main_tenant(), harbor()])
            .expect("directory builds");

        let found = directory
            .find_tenant_by_domain("harborhomes.com")
            .expect("lookup succeeds")
            .expect("tenant found");
        assert_eq!(found.slug, "harbor-homes");

        let found = directory
            .find_tenant_by_domain("WWW.harborhomes.com:443")
            .expect("lookup succeeds");
        assert!(found.is_some());
    }

    #[test]
    fn rejects_domain_claimed_twice() {
        let rival = Tenant::new("t-rival", "Rival", "rival")
            .with_domain(TenantDomain::new("harborhomes.com"));

        let err = InMemoryTenantDirectory::new(vec![harbor(), rival]).expect_err("duplicate");
        assert!(matches!(err, DirectoryError::DuplicateDomain { ref domain, .. } if domain == "harborhomes.com"));
    }

    #[test]
    fn rejects_second_main_tenant() {
        let second = Tenant::new("t-main-2", "Other", "other").with_kind(TenantKind::Main);

        let err =
            InMemoryTenantDirectory::new(vec![main_tenant(), second]).expect_err("two mains");
        assert!(matches!(err, DirectoryError::MultipleMainTenants { .. }));
    }

    #[test]
    fn same_tenant_may_list_a_domain_twice() {
        let tenant = harbor().with_domain(TenantDomain::new("harborhomes.com"));
        let directory = InMemoryTenantDirectory::new(vec![tenant]).expect("directory builds");
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn seed_document_parses() {
        let seed = r#"{
            "tenants": [
                { "id": "t-main", "name": "Summit Realty", "slug": "summit", "kind": "main" },
                { "id": "t-harbor", "name": "Harbor Homes", "slug": "harbor-homes",
                  "domains": [{ "domain": "harborhomes.com", "primary": true, "verified": true }] }
            ]
        }"#;

        let directory =
            InMemoryTenantDirectory::from_reader(seed.as_bytes()).expect("seed parses");
        let main = directory
            .find_main_tenant()
            .expect("lookup succeeds")
            .expect("main tenant present");
        assert_eq!(main.id.as_str(), "t-main");
    }

    #[test]
    fn malformed_seed_is_reported() {
        let err = InMemoryTenantDirectory::from_reader("{ not json".as_bytes())
            .expect_err("invalid seed");
        assert!(matches!(err, DirectoryError::SeedFormat(_)));
    }
}
