// ABOUTME: JWT claim shape carried by access and refresh tokens

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by every issued token:
/// `{tenant_id, user_id, permissions, session_id?, iat, exp, type}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub tenant_id: String,
    pub user_id: String,
    pub permissions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// JWT ID — unique per issued token, used to detect refresh-token reuse
    /// after rotation (Testable Property 6).
    pub jti: String,
}
