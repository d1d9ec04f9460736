// ABOUTME: Tenant-scoped async KV facade over SledBackend
// ABOUTME: Every key is namespaced under its tenant_id so two tenants can never collide in the same tree

use crate::backend::SledBackend;
use crate::error::Result;
use meridian_core::state::TenantScope;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A tenant-namespaced (or global) view over a shared [`SledBackend`].
/// Every key is prefixed with `scope.prefix()` so that two tenants can
/// never collide, matching the scoping discipline every other adapter in
/// this workspace follows.
#[derive(Clone, Debug)]
pub struct TenantKv {
    backend: SledBackend,
    scope: TenantScope,
}

impl TenantKv {
    #[must_use]
    pub fn new(backend: SledBackend, scope: TenantScope) -> Self {
        Self { backend, scope }
    }

    fn namespaced_key(&self, key: &str) -> Vec<u8> {
        format!("{}{key}", self.scope.prefix()).into_bytes()
    }

    /// # Errors
    /// Propagates sled/serialization/join errors.
    pub async fn set<T: Serialize + Send + 'static>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        let full_key = self.namespaced_key(key);
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || backend.insert(&full_key, bytes)).await?
    }

    /// # Errors
    /// Propagates sled/serialization/join errors.
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.namespaced_key(key);
        let backend = self.backend.clone();
        let raw = tokio::task::spawn_blocking(move || backend.get(&full_key)).await??;
        match raw {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    /// Propagates sled/join errors.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let full_key = self.namespaced_key(key);
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || backend.remove(&full_key)).await?
    }

    /// List every value in this scope whose key has the given local
    /// (unprefixed) prefix, deserialized as `T`. Used for tenant-wide scans
    /// (e.g. "list all sessions for this tenant").
    ///
    /// # Errors
    /// Propagates sled/serialization/join errors.
    pub async fn scan<T: DeserializeOwned + Send + 'static>(
        &self,
        local_prefix: &str,
    ) -> Result<Vec<(String, T)>> {
        let full_prefix = self.namespaced_key(local_prefix);
        let scope_prefix_len = self.scope.prefix().len();
        let backend = self.backend.clone();
        let rows = tokio::task::spawn_blocking(move || backend.scan_prefix(&full_prefix)).await??;
        rows.into_iter()
            .map(|(k, v)| {
                let key_str = String::from_utf8_lossy(&k)[scope_prefix_len..].to_string();
                let value: T = serde_json::from_slice(&v)?;
                Ok((key_str, value))
            })
            .collect()
    }

    /// Delete every key in this scope (used for cascade tenant deletion).
    ///
    /// # Errors
    /// Propagates sled/join errors.
    pub async fn clear_scope(&self) -> Result<usize> {
        let prefix = self.scope.prefix().into_bytes();
        let backend = self.backend.clone();
        tokio::task::spawn_blocking(move || backend.remove_prefix(&prefix)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Widget {
        name: String,
    }

    fn memory_backend() -> SledBackend {
        SledBackend::temporary().unwrap()
    }

    #[tokio::test]
    async fn set_and_get_roundtrip() {
        let kv = TenantKv::new(memory_backend(), TenantScope::from("acme"));
        kv.set(
            "widget:1",
            &Widget {
                name: "sprocket".into(),
            },
        )
        .await
        .unwrap();
        let got: Option<Widget> = kv.get("widget:1").await.unwrap();
        assert_eq!(got, Some(Widget { name: "sprocket".into() }));
    }

    #[tokio::test]
    async fn tenants_do_not_see_each_others_keys() {
        let backend = memory_backend();
        let acme = TenantKv::new(backend.clone(), TenantScope::from("acme"));
        let globex = TenantKv::new(backend, TenantScope::from("globex"));

        acme.set("secret", &Widget { name: "42".into() })
            .await
            .unwrap();

        let leaked: Option<Widget> = globex.get("secret").await.unwrap();
        assert_eq!(leaked, None);
    }

    #[tokio::test]
    async fn clear_scope_only_removes_that_tenant() {
        let backend = memory_backend();
        let acme = TenantKv::new(backend.clone(), TenantScope::from("acme"));
        let globex = TenantKv::new(backend, TenantScope::from("globex"));

        acme.set("x", &Widget { name: "a".into() }).await.unwrap();
        globex.set("x", &Widget { name: "b".into() }).await.unwrap();

        let removed = acme.clear_scope().await.unwrap();
        assert_eq!(removed, 1);

        let acme_x: Option<Widget> = acme.get("x").await.unwrap();
        let globex_x: Option<Widget> = globex.get("x").await.unwrap();
        assert_eq!(acme_x, None);
        assert_eq!(globex_x, Some(Widget { name: "b".into() }));
    }

    #[tokio::test]
    async fn scan_returns_only_matching_local_prefix() {
        let kv = TenantKv::new(memory_backend(), TenantScope::from("acme"));
        kv.set("doc:1", &Widget { name: "one".into() }).await.unwrap();
        kv.set("doc:2", &Widget { name: "two".into() }).await.unwrap();
        kv.set("other:1", &Widget { name: "skip".into() })
            .await
            .unwrap();

        let mut docs: Vec<(String, Widget)> = kv.scan("doc:").await.unwrap();
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "doc:1");
    }
}
