// ABOUTME: Tool trait and descriptor: the fixed registry is data, never reflection-discovered
// ABOUTME: Tools are pure functions of their arguments plus the request's AuthContext

use async_trait::async_trait;
use meridian_security::AuthContext;
use serde_json::Value;

use crate::error::Result;

/// Static metadata describing a tool to the LLM collaborator. `input_schema`
/// is a JSON Schema object; it never mentions `tenant_id` because the
/// runtime substitutes the authenticated tenant rather than letting the
/// model supply one.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    /// Executes the tool. `auth.tenant_id` is the only source of tenant
    /// scoping; `args` is whatever the model supplied, validated against
    /// `descriptor().input_schema` by the caller before this runs.
    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value>;
}
