// ABOUTME: Session records backing the optional session_id claim
// ABOUTME: Persisted in TenantKv so session validity survives process restarts

use chrono::{DateTime, Utc};
use meridian_core::state::TenantScope;
use meridian_storage::{SledBackend, TenantKv};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub tenant_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Stores and validates sessions, one `TenantKv` per tenant so a session
/// lookup can never cross a tenant boundary even under a programming error.
#[derive(Debug, Clone)]
pub struct SessionStore {
    backend: SledBackend,
}

impl SessionStore {
    #[must_use]
    pub fn new(backend: SledBackend) -> Self {
        Self { backend }
    }

    fn kv(&self, tenant_id: &str) -> TenantKv {
        TenantKv::new(self.backend.clone(), TenantScope::Tenant(tenant_id.to_string()))
    }

    pub async fn create(
        &self,
        tenant_id: &str,
        user_id: &str,
        ttl: chrono::Duration,
    ) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + ttl,
        };
        self.kv(tenant_id)
            .set(&format!("session:{}", session.session_id), &session)
            .await?;
        Ok(session)
    }

    /// Looks up a session and confirms it belongs to `tenant_id` and has
    /// not expired. A session-bound token is rejected the moment either
    /// condition fails.
    pub async fn validate(&self, tenant_id: &str, session_id: &str) -> Result<bool> {
        let session: Option<Session> = self
            .kv(tenant_id)
            .get(&format!("session:{session_id}"))
            .await?;
        Ok(match session {
            Some(s) => s.tenant_id == tenant_id && !s.is_expired(),
            None => false,
        })
    }

    pub async fn revoke(&self, tenant_id: &str, session_id: &str) -> Result<()> {
        self.kv(tenant_id)
            .delete(&format!("session:{session_id}"))
            .await?;
        Ok(())
    }

    /// Removes every session for `tenant_id`. Used for tenant cascade delete.
    pub async fn clear_tenant(&self, tenant_id: &str) -> Result<usize> {
        Ok(self.kv(tenant_id).clear_scope().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_session_validates() {
        let store = SessionStore::new(SledBackend::temporary().unwrap());
        let session = store
            .create("acme", "alice", chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(store.validate("acme", &session.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn expired_session_fails_validation() {
        let store = SessionStore::new(SledBackend::temporary().unwrap());
        let session = store
            .create("acme", "alice", chrono::Duration::seconds(-1))
            .await
            .unwrap();
        assert!(!store.validate("acme", &session.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn session_is_invisible_from_other_tenant() {
        let store = SessionStore::new(SledBackend::temporary().unwrap());
        let session = store
            .create("acme", "alice", chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(!store.validate("globex", &session.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn revoked_session_fails_validation() {
        let store = SessionStore::new(SledBackend::temporary().unwrap());
        let session = store
            .create("acme", "alice", chrono::Duration::hours(1))
            .await
            .unwrap();
        store.revoke("acme", &session.session_id).await.unwrap();
        assert!(!store.validate("acme", &session.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn clear_tenant_removes_only_that_tenants_sessions() {
        let store = SessionStore::new(SledBackend::temporary().unwrap());
        let acme = store.create("acme", "alice", chrono::Duration::hours(1)).await.unwrap();
        let globex = store.create("globex", "bob", chrono::Duration::hours(1)).await.unwrap();

        let removed = store.clear_tenant("acme").await.unwrap();
        assert_eq!(removed, 1);
        assert!(!store.validate("acme", &acme.session_id).await.unwrap());
        assert!(store.validate("globex", &globex.session_id).await.unwrap());
    }
}
