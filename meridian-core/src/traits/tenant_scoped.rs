// ABOUTME: Async tenant-scoping trait implemented by every stateful adapter
// ABOUTME: Lets adapters assert/verify the scope they are currently bound to

use crate::state::TenantScope;
use async_trait::async_trait;

/// A resource that can be scoped to a specific tenant. Backends implement
/// this so callers (and tests) can assert isolation without reaching into
/// backend-private state.
#[async_trait]
pub trait TenantScoped: Send + Sync {
    /// The scope this resource is currently bound to.
    fn scope(&self) -> &TenantScope;

    /// The tenant id this resource belongs to, or `None` for `Global` scope.
    fn tenant_id(&self) -> Option<&str> {
        self.scope().tenant_id()
    }
}
