// ABOUTME: Token issuance, verification, and refresh rotation for the auth gate
// ABOUTME: JWT access/refresh pair backed by a rate limiter, session store, and audit log

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use meridian_config::AuthConfig;
use meridian_storage::{SledBackend, TenantKv};
use meridian_core::state::TenantScope;
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditLogger};
use crate::claims::{Claims, TokenType};
use crate::context::AuthContext;
use crate::error::{Result, SecurityError};
use crate::rate_limit::RateLimiter;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// The single entry point for token issuance, verification, session
/// binding, refresh rotation with reuse detection, rate limiting, and
/// audit logging. Downstream code (the HTTP edge, the agent runtime)
/// only ever calls into `AuthGate`.
#[derive(Clone)]
pub struct AuthGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_hours: i64,
    refresh_ttl_days: i64,
    sessions: SessionStore,
    used_refresh_jtis: SledBackend,
    rate_limiter: std::sync::Arc<RateLimiter>,
    audit: AuditLogger,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    #[must_use]
    pub fn new(config: &AuthConfig, backend: SledBackend, audit: AuditLogger) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl_hours: config.token_ttl_hours,
            refresh_ttl_days: config.refresh_ttl_days,
            sessions: SessionStore::new(backend.clone()),
            used_refresh_jtis: backend,
            rate_limiter: std::sync::Arc::new(RateLimiter::new(
                config.rate_limit_max_failures,
                config.rate_limit_window_minutes,
            )),
            audit,
        }
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Issues a fresh access/refresh pair, optionally binding the access
    /// token to a session. Clears any outstanding rate-limit lockout for
    /// this principal, matching a successful login.
    pub async fn issue(
        &self,
        tenant_id: &str,
        user_id: &str,
        permissions: Vec<String>,
        bind_session: bool,
    ) -> Result<TokenPair> {
        self.rate_limiter.record_success(tenant_id, user_id);

        let session_id = if bind_session {
            Some(
                self.sessions
                    .create(tenant_id, user_id, Duration::hours(self.token_ttl_hours))
                    .await?
                    .session_id,
            )
        } else {
            None
        };

        let pair = self.mint_pair(tenant_id, user_id, permissions, session_id)?;
        self.audit.record(AuditEvent::LoginSucceeded {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(pair)
    }

    fn mint_pair(
        &self,
        tenant_id: &str,
        user_id: &str,
        permissions: Vec<String>,
        session_id: Option<String>,
    ) -> Result<TokenPair> {
        let now = Utc::now();
        let access_claims = Claims {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            permissions: permissions.clone(),
            session_id: session_id.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_ttl_hours)).timestamp(),
            token_type: TokenType::Access,
            jti: Uuid::new_v4().to_string(),
        };
        let refresh_claims = Claims {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            permissions,
            session_id,
            iat: now.timestamp(),
            exp: (now + Duration::days(self.refresh_ttl_days)).timestamp(),
            token_type: TokenType::Refresh,
            jti: Uuid::new_v4().to_string(),
        };
        Ok(TokenPair {
            access_token: self.encode_claims(&access_claims)?,
            refresh_token: self.encode_claims(&refresh_claims)?,
        })
    }

    /// Records a failed login attempt and returns the rate-limit error if
    /// the principal is now (or already) locked out.
    pub fn record_login_failure(&self, tenant_id: &str, user_id: &str, reason: &str) -> Result<()> {
        self.rate_limiter.record_failure(tenant_id, user_id);
        self.audit.record(AuditEvent::LoginFailed {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            reason: reason.to_string(),
        });
        if let Some(retry_after_secs) = self.rate_limiter.check(tenant_id, user_id) {
            self.audit.record(AuditEvent::RateLimited {
                tenant_id: tenant_id.to_string(),
                user_id: user_id.to_string(),
                retry_after_secs,
            });
            return Err(SecurityError::RateLimited { retry_after_secs });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_locked_out(&self, tenant_id: &str, user_id: &str) -> Option<u64> {
        self.rate_limiter.check(tenant_id, user_id)
    }

    /// Removes every session for `tenant_id`, invalidating any session-bound
    /// access token immediately. Used for tenant cascade delete.
    ///
    /// # Errors
    /// Propagates storage errors.
    pub async fn clear_tenant_sessions(&self, tenant_id: &str) -> Result<usize> {
        self.sessions.clear_tenant(tenant_id).await
    }

    /// Verifies an access token end to end: signature, expiry, token type,
    /// and — if the claim carries a `session_id` — that the session still
    /// exists, has not expired, and belongs to the claimed tenant.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthContext> {
        let claims = self.decode_claims(access_token)?;
        if claims.token_type != TokenType::Access {
            return Err(SecurityError::Unauthorized("not an access token".to_string()));
        }
        if let Some(session_id) = &claims.session_id {
            let valid = self.sessions.validate(&claims.tenant_id, session_id).await?;
            if !valid {
                return Err(SecurityError::Unauthorized("session invalid or expired".to_string()));
            }
        }
        let mut ctx = AuthContext::new(claims.tenant_id, claims.user_id).with_permissions(claims.permissions);
        if let Some(session_id) = claims.session_id {
            ctx = ctx.with_session_id(session_id);
        }
        Ok(ctx)
    }

    /// Rotates a refresh token into a fresh access/refresh pair. Reuse of a
    /// refresh token whose `jti` has already been consumed by a prior
    /// rotation is treated as a stolen-token signal: it fails with
    /// `Unauthorized` and is audited as `RefreshReuseDetected` rather than
    /// silently succeeding.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.decode_claims(refresh_token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(SecurityError::Unauthorized("not a refresh token".to_string()));
        }

        let kv = TenantKv::new(self.used_refresh_jtis.clone(), TenantScope::Tenant(claims.tenant_id.clone()));
        let already_used: Option<bool> = kv.get(&format!("refresh_used:{}", claims.jti)).await?;
        if already_used.unwrap_or(false) {
            self.audit.record(AuditEvent::RefreshReuseDetected {
                tenant_id: claims.tenant_id.clone(),
                user_id: claims.user_id.clone(),
                jti: claims.jti.clone(),
            });
            return Err(SecurityError::Unauthorized("refresh token already used".to_string()));
        }
        kv.set(&format!("refresh_used:{}", claims.jti), &true).await?;

        let pair = self.mint_pair(
            &claims.tenant_id,
            &claims.user_id,
            claims.permissions,
            claims.session_id,
        )?;
        self.audit.record(AuditEvent::TokenRefreshed {
            tenant_id: claims.tenant_id,
            user_id: claims.user_id,
        });
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthGate {
        AuthGate::new(&AuthConfig::default(), SledBackend::temporary().unwrap(), AuditLogger::new())
    }

    #[tokio::test]
    async fn issued_access_token_authenticates() {
        let gate = gate();
        let pair = gate
            .issue("acme", "alice", vec!["documents:read".to_string()], false)
            .await
            .unwrap();
        let ctx = gate.authenticate(&pair.access_token).await.unwrap();
        assert_eq!(ctx.tenant_id, "acme");
        assert_eq!(ctx.user_id, "alice");
        assert!(ctx.has_permission("documents:read"));
    }

    #[tokio::test]
    async fn refresh_token_cannot_authenticate_as_access() {
        let gate = gate();
        let pair = gate.issue("acme", "alice", vec![], false).await.unwrap();
        assert!(gate.authenticate(&pair.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn session_bound_token_fails_once_session_is_revoked() {
        let gate = gate();
        let pair = gate.issue("acme", "alice", vec![], true).await.unwrap();
        let ctx = gate.authenticate(&pair.access_token).await.unwrap();
        let session_id = ctx.session_id.unwrap();
        gate.sessions.revoke("acme", &session_id).await.unwrap();
        assert!(gate.authenticate(&pair.access_token).await.is_err());
    }

    #[tokio::test]
    async fn refresh_rotates_and_old_token_reuse_is_rejected() {
        let gate = gate();
        let pair = gate.issue("acme", "alice", vec![], false).await.unwrap();
        let rotated = gate.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        let reuse = gate.refresh(&pair.refresh_token).await;
        assert!(reuse.is_err());
    }

    #[tokio::test]
    async fn lockout_triggers_after_max_failures() {
        let gate = gate();
        for _ in 0..4 {
            gate.record_login_failure("acme", "alice", "bad password").unwrap();
        }
        let result = gate.record_login_failure("acme", "alice", "bad password");
        assert!(result.is_err());
        assert!(gate.is_locked_out("acme", "alice").is_some());
    }
}
