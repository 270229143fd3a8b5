use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a tenant record in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle toggle. Tenants are never hard-deleted, only deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    #[default]
    Active,
    Inactive,
}

impl TenantStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TenantStatus::Active => "active",
            TenantStatus::Inactive => "inactive",
        }
    }
}

/// The single `Main` tenant is the fallback for hosts no other tenant claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantKind {
    Main,
    #[default]
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDomain {
    pub domain: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

impl TenantDomain {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            primary: false,
            verified: false,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }
}

/// Colour values applied by the page shell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Branding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeoDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A brand served by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub status: TenantStatus,
    #[serde(default)]
    pub kind: TenantKind,
    #[serde(default)]
    pub domains: Vec<TenantDomain>,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub seo: SeoDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: TenantId::new(id),
            name: name.into(),
            slug: slug.into(),
            status: TenantStatus::Active,
            kind: TenantKind::Standard,
            domains: Vec::new(),
            branding: Branding::default(),
            seo: SeoDefaults::default(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_kind(mut self, kind: TenantKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_status(mut self, status: TenantStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_domain(mut self, domain: TenantDomain) -> Self {
        self.domains.push(domain);
        self
    }

    pub fn is_main(&self) -> bool {
        self.kind == TenantKind::Main
    }

    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }

    /// The domain flagged primary, or the first listed one.
    pub fn primary_domain(&self) -> Option<&TenantDomain> {
        self.domains
            .iter()
            .find(|domain| domain.primary)
            .or_else(|| self.domains.first())
    }

    pub fn summary(&self) -> TenantSummary {
        TenantSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
        }
    }
}

/// Identity fields exposed in rendered responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantSummary {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
}
