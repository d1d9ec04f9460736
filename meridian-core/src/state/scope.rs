use std::fmt;

/// Namespacing scope used by every tenant-owned store (vector index, graph,
/// session table, ESS binding cache). Exactly one scoping dimension: the
/// enum carries only `Global` (administrative operations that cross
/// tenants, e.g. the tenant registry itself) and `Tenant`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TenantScope {
    /// Administrative scope: not bound to any single tenant's rows.
    Global,
    /// Normal request scope, bound to exactly one tenant.
    Tenant(String),
}

impl TenantScope {
    /// Deterministic namespace prefix applied to graph objects and storage
    /// keys so two tenants' data can never collide under the same root.
    #[must_use]
    pub fn prefix(&self) -> String {
        match self {
            Self::Global => String::new(),
            Self::Tenant(id) => format!("tenant:{id}:"),
        }
    }

    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Tenant(id) => Some(id.as_str()),
        }
    }

    #[must_use]
    pub const fn is_tenant(&self) -> bool {
        matches!(self, Self::Tenant(_))
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Tenant(id) => write!(f, "tenant:{id}"),
        }
    }
}

impl From<&str> for TenantScope {
    fn from(tenant_id: &str) -> Self {
        Self::Tenant(tenant_id.to_string())
    }
}

impl From<String> for TenantScope {
    fn from(tenant_id: String) -> Self {
        Self::Tenant(tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_deterministic_per_tenant() {
        let a = TenantScope::from("acme");
        let b = TenantScope::from("acme");
        assert_eq!(a.prefix(), b.prefix());
        assert_eq!(a.prefix(), "tenant:acme:");
    }

    #[test]
    fn global_has_empty_prefix() {
        assert_eq!(TenantScope::Global.prefix(), "");
        assert!(!TenantScope::Global.is_tenant());
    }

    #[test]
    fn distinct_tenants_have_distinct_prefixes() {
        let acme = TenantScope::from("acme");
        let globex = TenantScope::from("globex");
        assert_ne!(acme.prefix(), globex.prefix());
    }
}
