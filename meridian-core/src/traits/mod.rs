mod tenant_scoped;

pub use tenant_scoped::TenantScoped;
