//! Tenant-scoped page shells served through the in-process render cache.

pub mod cache;
pub mod page;
pub mod router;

pub use cache::{
    CachedPage, InMemoryRenderCache, InvalidationRecord, InvalidationTarget,
    DEFAULT_RENDER_CACHE_CAPACITY,
};
pub use page::{page_tags, PageShell};
pub use router::{
    site_router, CacheStatus, RenderError, RenderedPage, SiteRenderer, RENDER_CACHE_HEADER,
};
