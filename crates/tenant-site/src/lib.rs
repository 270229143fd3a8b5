//! Request-edge core of the multi-tenant real-estate site: host-based tenant
//! resolution, tenant header propagation, render-cache revalidation, and the
//! page shell renderer that ties them together.

pub mod config;
pub mod error;
pub mod revalidation;
pub mod site;
pub mod telemetry;
pub mod tenancy;
