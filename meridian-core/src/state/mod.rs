// ABOUTME: Tenant scoping primitives shared by every store-backed component
// ABOUTME: A single dimension of scope (tenant vs global), not a hierarchy

mod scope;

pub use scope::TenantScope;
