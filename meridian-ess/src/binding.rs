// ABOUTME: Document-set lifecycle: ensure_document_set with persisted per-tenant cache
// ABOUTME: Cache-in-front-of-store shape mirrors the tenant registry's dashmap-over-sled pattern

use chrono::Utc;
use meridian_core::state::TenantScope;
use meridian_storage::{SledBackend, TenantKv};
use reqwest::StatusCode;
use serde_json::json;

use crate::client::EssHttpClient;
use crate::error::Result;
use crate::types::{CcPairStatus, EssBinding};

const BINDING_KEY: &str = "ess_binding";

#[derive(Debug, Clone)]
pub struct DocumentSetManager {
    client: EssHttpClient,
    backend: SledBackend,
}

impl DocumentSetManager {
    #[must_use]
    pub fn new(client: EssHttpClient, backend: SledBackend) -> Self {
        Self { client, backend }
    }

    fn kv(&self, tenant_id: &str) -> TenantKv {
        TenantKv::new(self.backend.clone(), TenantScope::Tenant(tenant_id.to_string()))
    }

    pub async fn verify_cc_pair(&self, cc_pair_id: i64) -> Result<CcPairStatus> {
        let value = self
            .client
            .get_json(&format!("/api/manage/admin/cc-pair/{cc_pair_id}"))
            .await?;
        Ok(serde_json::from_value(value).unwrap_or(CcPairStatus {
            status: "UNKNOWN".to_string(),
            access_type: "unknown".to_string(),
            num_docs_indexed: 0,
            indexing: true,
        }))
    }

    /// Step 1: return the cached binding if present and the CC-pair still
    /// reports readiness. Step 2-4: otherwise verify readiness (logging a
    /// warning rather than failing if not ready — some corpora are indexed
    /// out-of-band), create a document set (falling back from the admin
    /// endpoint to the non-admin one on 404/405), and persist the binding.
    pub async fn ensure_document_set(&self, tenant_id: &str, cc_pair_id: i64) -> Result<String> {
        let kv = self.kv(tenant_id);
        if let Some(binding) = kv.get::<EssBinding>(BINDING_KEY).await? {
            if binding.cc_pair_id == cc_pair_id {
                if let Ok(status) = self.verify_cc_pair(cc_pair_id).await {
                    if status.is_ready() {
                        return Ok(binding.document_set_id);
                    }
                } else {
                    return Ok(binding.document_set_id);
                }
            }
        }

        match self.verify_cc_pair(cc_pair_id).await {
            Ok(status) if !status.is_ready() => {
                tracing::warn!(tenant_id, cc_pair_id, "cc-pair not reporting ready, proceeding anyway");
            }
            Err(e) => {
                tracing::warn!(tenant_id, cc_pair_id, error = %e, "could not verify cc-pair readiness, proceeding anyway");
            }
            _ => {}
        }

        let document_set_id = self.create_document_set(cc_pair_id, tenant_id).await?;

        let binding = EssBinding {
            cc_pair_id,
            document_set_id: document_set_id.clone(),
            created_at: Utc::now(),
        };
        kv.set(BINDING_KEY, &binding).await?;

        Ok(document_set_id)
    }

    async fn create_document_set(&self, cc_pair_id: i64, tenant_id: &str) -> Result<String> {
        let payload = json!({
            "name": format!("meridian-{tenant_id}"),
            "description": "auto-provisioned by meridian",
            "cc_pair_ids": [cc_pair_id],
        });

        let (status, body) = self
            .client
            .post_json_raw("/api/manage/admin/document-set", &payload)
            .await?;

        if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED {
            let fallback = self.client.post_json("/api/manage/document-set", &payload).await?;
            return Ok(extract_id(&fallback));
        }

        Ok(extract_id(&body))
    }

    /// Removes the persisted document-set binding for `tenant_id`. Used for
    /// tenant cascade delete; the document set itself is left in the
    /// external service, only the local binding is forgotten.
    pub async fn clear_tenant(&self, tenant_id: &str) -> Result<usize> {
        Ok(self.kv(tenant_id).clear_scope().await?)
    }
}

fn extract_id(value: &serde_json::Value) -> String {
    if let Some(id) = value.as_i64() {
        return id.to_string();
    }
    value
        .get("id")
        .map(std::string::ToString::to_string)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_id_from_bare_number() {
        assert_eq!(extract_id(&json!(42)), "42");
    }

    #[test]
    fn extract_id_from_object_field() {
        assert_eq!(extract_id(&json!({"id": 7})), "7");
    }

    #[test]
    fn extract_id_from_string_field() {
        assert_eq!(extract_id(&json!({"id": "abc-123"})), "abc-123");
    }

    #[test]
    fn extract_id_missing_is_empty() {
        assert_eq!(extract_id(&json!({"other": 1})), "");
    }
}
