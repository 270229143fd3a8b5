use serde::Serialize;

/// Tags every rendered page carries for the shared header and footer globals.
pub const DEFAULT_TAGS: [&str; 2] = ["global_header", "global_footer"];
pub const ROOT_LAYOUT_PATH: &str = "/";

/// `Page` drops one path; `Layout` drops the path and everything below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathScope {
    Page,
    Layout,
}

/// Cache primitive the revalidation endpoint drives.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_tag(&self, tag: &str) -> Result<(), CacheError>;
    fn invalidate_path(&self, path: &str, scope: PathScope) -> Result<(), CacheError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("render cache unavailable: {0}")]
    Unavailable(String),
}
