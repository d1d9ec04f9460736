// ABOUTME: Verified request context attached downstream after authenticate()
// ABOUTME: tenant_id is never optional here; every operation in this system is tenant-scoped

use serde::{Deserialize, Serialize};

/// The result of a successful `authenticate()` call. `tenant_id` is never
/// optional: every operation in this system is tenant-scoped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub tenant_id: String,
    pub user_id: String,
    pub permissions: Vec<String>,
    pub session_id: Option<String>,
}

impl AuthContext {
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            permissions: Vec::new(),
            session_id: None,
        }
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// `"admin"` grants all; a required permission `a:b:c` is satisfied by
    /// exact match, by any prefix wildcard (`a:*`, `a:b:*`), or by `admin`.
    #[must_use]
    pub fn has_permission(&self, required: &str) -> bool {
        self.permissions.iter().any(|granted| {
            granted == "admin" || granted == required || Self::is_wildcard_match(granted, required)
        })
    }

    fn is_wildcard_match(granted: &str, required: &str) -> bool {
        let Some(prefix) = granted.strip_suffix(":*") else {
            return false;
        };
        required == prefix || required.starts_with(&format!("{prefix}:"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(perms: &[&str]) -> AuthContext {
        AuthContext::new("acme", "alice")
            .with_permissions(perms.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn admin_grants_all() {
        assert!(ctx(&["admin"]).has_permission("documents:delete"));
    }

    #[test]
    fn exact_match_satisfies() {
        assert!(ctx(&["documents:read"]).has_permission("documents:read"));
        assert!(!ctx(&["documents:read"]).has_permission("documents:write"));
    }

    #[test]
    fn prefix_wildcard_satisfies_nested_permission() {
        assert!(ctx(&["documents:*"]).has_permission("documents:write:bulk"));
        assert!(ctx(&["documents:*"]).has_permission("documents:write"));
        assert!(!ctx(&["documents:*"]).has_permission("tenants:write"));
    }

    #[test]
    fn top_level_wildcard_satisfies_everything_under_it() {
        assert!(ctx(&["a:*"]).has_permission("a:b:c"));
    }
}
