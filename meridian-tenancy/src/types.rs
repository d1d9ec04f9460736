// ABOUTME: Tenant record and quota types
// ABOUTME: Quotas default to unbounded (None) and are enforced by the ingestion coordinator, not this crate

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    Suspended,
    Deleted,
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

/// Resource quotas enforced by the ingestion coordinator. Unbounded (`None`)
/// by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantQuotas {
    pub max_documents: Option<u64>,
    pub max_storage_mb: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub status: TenantStatus,
    pub quotas: TenantQuotas,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status, TenantStatus::Active)
    }

    /// Valid tenant ids are lowercase alphanumeric plus `_`/`-`, 3-50 chars.
    #[must_use]
    pub fn is_valid_id(id: &str) -> bool {
        (3..=50).contains(&id.len())
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids_accept_lowercase_alnum_dash_underscore() {
        assert!(Tenant::is_valid_id("acme-corp_1"));
        assert!(!Tenant::is_valid_id("AB"));
        assert!(!Tenant::is_valid_id("ab"));
        assert!(!Tenant::is_valid_id("has space"));
        assert!(!Tenant::is_valid_id(&"x".repeat(51)));
    }
}
