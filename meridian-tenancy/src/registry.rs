// ABOUTME: Tenant CRUD + cascade delete, cached dashmap in front of a sled-backed store
// ABOUTME: Cache-in-front-of-store shape mirrors the ESS binding cache (meridian-ess)

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use meridian_core::error::{MeridianError, Result};
use meridian_core::state::TenantScope;
use meridian_storage::{SledBackend, TenantKv};

use crate::types::{Tenant, TenantQuotas, TenantStatus};

const REGISTRY_PREFIX: &str = "tenant_record:";

/// Single source of truth for tenant existence and status. Every other
/// component treats a missing or non-active tenant as `TenantUnavailable`.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    kv: TenantKv,
    cache: std::sync::Arc<DashMap<String, Tenant>>,
}

impl TenantRegistry {
    #[must_use]
    pub fn new(backend: SledBackend) -> Self {
        Self {
            kv: TenantKv::new(backend, TenantScope::Global),
            cache: std::sync::Arc::new(DashMap::new()),
        }
    }

    fn key(tenant_id: &str) -> String {
        format!("{REGISTRY_PREFIX}{tenant_id}")
    }

    /// # Errors
    /// `AlreadyExists` if `id` is already registered, `ValidationFailed` if
    /// `id` does not match the tenant-id shape.
    pub async fn create(
        &self,
        id: &str,
        name: &str,
        quotas: TenantQuotas,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<Tenant> {
        if !Tenant::is_valid_id(id) {
            return Err(MeridianError::ValidationFailed(format!(
                "invalid tenant id: {id}"
            )));
        }
        if self.get(id).await?.is_some() {
            return Err(MeridianError::AlreadyExists(id.to_string()));
        }
        let now = Utc::now();
        let tenant = Tenant {
            id: id.to_string(),
            name: name.to_string(),
            status: TenantStatus::Active,
            quotas,
            metadata,
            created_at: now,
            updated_at: now,
        };
        self.persist(&tenant).await?;
        tracing::info!(tenant_id = %id, "tenant created");
        Ok(tenant)
    }

    async fn persist(&self, tenant: &Tenant) -> Result<()> {
        self.kv
            .set(&Self::key(&tenant.id), tenant)
            .await
            .map_err(|e| MeridianError::Internal(e.to_string()))?;
        self.cache.insert(tenant.id.clone(), tenant.clone());
        Ok(())
    }

    /// # Errors
    /// Propagates storage errors as `Internal`.
    pub async fn get(&self, id: &str) -> Result<Option<Tenant>> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(Some(cached.clone()));
        }
        let loaded: Option<Tenant> = self
            .kv
            .get(&Self::key(id))
            .await
            .map_err(|e| MeridianError::Internal(e.to_string()))?;
        if let Some(t) = &loaded {
            self.cache.insert(id.to_string(), t.clone());
        }
        Ok(loaded)
    }

    /// Returns `TenantUnavailable` unless the tenant exists and is active.
    /// Every component other than the registry itself should call this
    /// rather than `get` before doing tenant-scoped work.
    ///
    /// # Errors
    /// `TenantUnavailable` if missing or not active.
    pub async fn require_active(&self, id: &str) -> Result<Tenant> {
        match self.get(id).await? {
            Some(t) if t.is_active() => Ok(t),
            Some(_) => Err(MeridianError::TenantUnavailable(id.to_string())),
            None => Err(MeridianError::TenantUnavailable(id.to_string())),
        }
    }

    /// # Errors
    /// Propagates storage errors as `Internal`.
    pub async fn list(&self, status: Option<TenantStatus>) -> Result<Vec<Tenant>> {
        let rows: Vec<(String, Tenant)> = self
            .kv
            .scan(REGISTRY_PREFIX)
            .await
            .map_err(|e| MeridianError::Internal(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|(_, t)| t)
            .filter(|t| status.map_or(true, |s| s == t.status))
            .collect())
    }

    /// # Errors
    /// `NotFound` if `id` does not exist.
    pub async fn update_status(&self, id: &str, status: TenantStatus) -> Result<Tenant> {
        let mut tenant = self
            .get(id)
            .await?
            .ok_or_else(|| MeridianError::NotFound(id.to_string()))?;
        tenant.status = status;
        tenant.updated_at = Utc::now();
        self.persist(&tenant).await?;
        tracing::info!(tenant_id = %id, %status, "tenant status updated");
        Ok(tenant)
    }

    /// Deletes the tenant record. This crate has no visibility into the
    /// vector store, graph store, sessions, or ESS bindings other crates
    /// hold per tenant, so it cannot cascade those itself; callers own that
    /// cascade and are expected to run it immediately after this call
    /// succeeds, using `owns_data` to decide whether one is needed at all.
    ///
    /// # Errors
    /// `NotFound` if `id` does not exist. `ValidationFailed` if `force` is
    /// false and the caller indicates (via `owns_data`) the tenant still
    /// owns data in another backend.
    pub async fn delete(&self, id: &str, force: bool, owns_data: bool) -> Result<()> {
        if self.get(id).await?.is_none() {
            return Err(MeridianError::NotFound(id.to_string()));
        }
        if owns_data && !force {
            return Err(MeridianError::ValidationFailed(format!(
                "tenant {id} owns data; pass force=true to cascade delete"
            )));
        }
        self.kv
            .delete(&Self::key(id))
            .await
            .map_err(|e| MeridianError::Internal(e.to_string()))?;
        self.cache.remove(id);
        tracing::warn!(tenant_id = %id, force, "tenant deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TenantRegistry {
        TenantRegistry::new(SledBackend::temporary().unwrap())
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let reg = registry();
        reg.create("acme", "Acme Corp", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap();
        let fetched = reg.get("acme").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Acme Corp");
        assert!(fetched.is_active());
    }

    #[tokio::test]
    async fn duplicate_create_fails_already_exists() {
        let reg = registry();
        reg.create("acme", "Acme", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap();
        let err = reg
            .create("acme", "Acme Again", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MeridianError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn invalid_id_is_rejected() {
        let reg = registry();
        let err = reg
            .create("AB", "Bad", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MeridianError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn suspended_tenant_is_unavailable() {
        let reg = registry();
        reg.create("acme", "Acme", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap();
        reg.update_status("acme", TenantStatus::Suspended)
            .await
            .unwrap();
        let err = reg.require_active("acme").await.unwrap_err();
        assert!(matches!(err, MeridianError::TenantUnavailable(_)));
    }

    #[tokio::test]
    async fn delete_without_force_refuses_when_owning_data() {
        let reg = registry();
        reg.create("acme", "Acme", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap();
        let err = reg.delete("acme", false, true).await.unwrap_err();
        assert!(matches!(err, MeridianError::ValidationFailed(_)));
        assert!(reg.get("acme").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_with_force_cascades() {
        let reg = registry();
        reg.create("acme", "Acme", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap();
        reg.delete("acme", true, true).await.unwrap();
        assert!(reg.get("acme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let reg = registry();
        reg.create("acme", "Acme", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap();
        reg.create("globex", "Globex", TenantQuotas::default(), HashMap::new())
            .await
            .unwrap();
        reg.update_status("globex", TenantStatus::Suspended)
            .await
            .unwrap();

        let active = reg.list(Some(TenantStatus::Active)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "acme");

        let all = reg.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
