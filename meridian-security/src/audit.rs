// ABOUTME: Structured audit trail for authentication and authorization decisions
// ABOUTME: Background task draining an mpsc channel of audit entries

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    LoginSucceeded { tenant_id: String, user_id: String },
    LoginFailed { tenant_id: String, user_id: String, reason: String },
    RateLimited { tenant_id: String, user_id: String, retry_after_secs: u64 },
    TokenRefreshed { tenant_id: String, user_id: String },
    RefreshReuseDetected { tenant_id: String, user_id: String, jti: String },
    PermissionDenied { tenant_id: String, user_id: String, permission: String },
    IsolationViolation { component: String, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: AuditEvent,
}

/// Fire-and-forget audit sink: callers push events onto an unbounded
/// channel, a background task drains them and emits structured `tracing`
/// records with `audit = true` so log pipelines can filter on it. Keeps
/// the decision (auth gate deciding to allow/deny) off the hot path from
/// the recording (the drain task writing the record).
#[derive(Debug, Clone)]
pub struct AuditLogger {
    sender: mpsc::UnboundedSender<AuditEntry>,
}

impl AuditLogger {
    #[must_use]
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AuditEntry>();
        tokio::spawn(async move {
            while let Some(entry) = receiver.recv().await {
                Self::emit(&entry);
            }
        });
        Self { sender }
    }

    fn emit(entry: &AuditEntry) {
        let payload = serde_json::to_string(entry).unwrap_or_default();
        match &entry.event {
            AuditEvent::IsolationViolation { component, message } => {
                tracing::error!(audit = true, component = %component, message = %message, payload = %payload, "isolation violation");
            }
            AuditEvent::LoginFailed { .. } | AuditEvent::RateLimited { .. } | AuditEvent::RefreshReuseDetected { .. } | AuditEvent::PermissionDenied { .. } => {
                tracing::warn!(audit = true, payload = %payload, "security audit event");
            }
            _ => {
                tracing::info!(audit = true, payload = %payload, "security audit event");
            }
        }
    }

    pub fn record(&self, event: AuditEvent) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            event,
        };
        // An audit event that fails to send means the receiver task has
        // already been dropped; there is nowhere left to report that loss.
        let _ = self.sender.send(entry);
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_does_not_panic_with_no_subscriber() {
        let logger = AuditLogger::new();
        logger.record(AuditEvent::LoginSucceeded {
            tenant_id: "acme".into(),
            user_id: "alice".into(),
        });
        tokio::task::yield_now().await;
    }
}
