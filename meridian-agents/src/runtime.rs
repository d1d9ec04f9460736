// ABOUTME: Tool-call loop: assemble prompt, call the LLM, execute tool calls, repeat until terminal or budget exhausted
// ABOUTME: Cancellation is checked before every LLM call and around every in-flight tool call

use std::sync::Arc;

use meridian_providers::{ChatMessage, ChatRequest, ChatResponse, ChatRole, LlmClient};
use meridian_security::AuthContext;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};
use crate::registry::ToolRegistry;

/// The loop runs until the model returns a terminal message or this many
/// tool-call steps have been taken, whichever comes first.
pub const DEFAULT_STEP_BUDGET: usize = 5;

#[derive(Debug, Clone)]
pub struct AgentRuntimeConfig {
    pub step_budget: usize,
}

impl Default for AgentRuntimeConfig {
    fn default() -> Self {
        Self {
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }
}

/// One executed tool call, recorded regardless of whether it succeeded, so
/// a caller can audit exactly what the runtime did on the tenant's behalf.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
    pub result: Value,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AgentTurn {
    pub text: String,
    pub steps_taken: usize,
    pub tool_calls: Vec<ToolCallRecord>,
}

pub struct AgentRuntime {
    registry: Arc<ToolRegistry>,
    llm: Arc<dyn LlmClient>,
    config: AgentRuntimeConfig,
}

impl std::fmt::Debug for AgentRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl AgentRuntime {
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, llm: Arc<dyn LlmClient>, config: AgentRuntimeConfig) -> Self {
        Self { registry, llm, config }
    }

    /// Runs the tool-call loop to completion for a single user turn.
    ///
    /// # Errors
    /// Returns `AgentError::Cancelled` if `cancel` fires before a terminal
    /// response is produced, `AgentError::Llm` if the collaborator itself
    /// errors, and `AgentError::StepBudgetExhausted` if the model never
    /// stops requesting tool calls within the configured budget. A failing
    /// or unknown *tool* call never aborts the loop: its error is captured
    /// as a structured result and handed back to the model, which may
    /// recover by trying something else.
    pub async fn run(
        &self,
        system_prompt: &str,
        user_query: &str,
        auth: &AuthContext,
        cancel: &CancellationToken,
    ) -> Result<AgentTurn> {
        let mut messages = vec![
            ChatMessage::new(ChatRole::System, system_prompt),
            ChatMessage::new(ChatRole::User, user_query),
        ];
        let mut tool_calls = Vec::new();
        let tool_specs = self.registry.specs();

        for step in 0..self.config.step_budget {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            let request = ChatRequest {
                messages: messages.clone(),
                tools: tool_specs.clone(),
            };

            let response = tokio::select! {
                () = cancel.cancelled() => return Err(AgentError::Cancelled),
                result = self.llm.chat(request) => result.map_err(|e| AgentError::Llm(e.to_string()))?,
            };

            match response {
                ChatResponse::Message(text) => {
                    return Ok(AgentTurn {
                        text,
                        steps_taken: step + 1,
                        tool_calls,
                    });
                }
                ChatResponse::ToolCalls(calls) => {
                    messages.push(ChatMessage::new(
                        ChatRole::Assistant,
                        format!("requested {} tool call(s)", calls.len()),
                    ));

                    for call in calls {
                        if cancel.is_cancelled() {
                            return Err(AgentError::Cancelled);
                        }

                        let result = self.invoke_tool(&call.name, call.arguments.clone(), auth, cancel).await?;
                        messages.push(ChatMessage::new(ChatRole::Tool, format!("{}: {}", call.name, result)));
                        tool_calls.push(ToolCallRecord {
                            name: call.name,
                            arguments: call.arguments,
                            result,
                        });
                    }
                }
            }
        }

        Err(AgentError::StepBudgetExhausted(self.config.step_budget))
    }

    /// Executes one tool call, racing it against cancellation. A tool that
    /// doesn't exist or returns an error yields a `{"error": ...}` value
    /// rather than propagating, except when cancellation itself fires.
    async fn invoke_tool(&self, name: &str, args: Value, auth: &AuthContext, cancel: &CancellationToken) -> Result<Value> {
        let Ok(tool) = self.registry.require(name) else {
            return Ok(json!({ "error": format!("unknown tool: {name}") }));
        };
        let tool = tool.clone();

        let outcome = tokio::select! {
            () = cancel.cancelled() => return Err(AgentError::Cancelled),
            result = tool.call(args, auth) => result,
        };

        Ok(outcome.unwrap_or_else(|e| json!({ "error": e.to_string() })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{Tool, ToolDescriptor};
    use async_trait::async_trait;
    use meridian_providers::ToolCall;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// A scripted LLM: returns each queued response in order, one per `chat` call.
    struct ScriptedLlm {
        responses: Mutex<Vec<ChatResponse>>,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat(&self, _request: ChatRequest) -> meridian_providers::Result<ChatResponse> {
            let mut responses = self.responses.lock().unwrap();
            Ok(responses.remove(0))
        }
    }

    struct CountingTool {
        descriptor: ToolDescriptor,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn call(&self, _args: Value, _auth: &AuthContext) -> Result<Value> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(json!({ "calls": n }))
        }
    }

    fn auth() -> AuthContext {
        AuthContext::new("acme", "alice")
    }

    #[tokio::test]
    async fn terminal_message_on_first_step_skips_tool_calls() {
        let registry = Arc::new(ToolRegistry::new());
        let llm = Arc::new(ScriptedLlm {
            responses: Mutex::new(vec![ChatResponse::Message("done".to_string())]),
        });
        let runtime = AgentRuntime::new(registry, llm, AgentRuntimeConfig::default());

        let turn = runtime
            .run("system", "hello", &auth(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(turn.text, "done");
        assert_eq!(turn.steps_taken, 1);
        assert!(turn.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn tool_call_result_is_recorded_then_loop_continues_to_terminal_message() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CountingTool {
            descriptor: ToolDescriptor {
                name: "count",
                description: "increments a counter",
                input_schema: json!({"type": "object"}),
            },
            calls: AtomicUsize::new(0),
        }));
        let llm = Arc::new(ScriptedLlm {
            responses: Mutex::new(vec![
                ChatResponse::ToolCalls(vec![ToolCall {
                    name: "count".to_string(),
                    arguments: json!({}),
                }]),
                ChatResponse::Message("final answer".to_string()),
            ]),
        });
        let runtime = AgentRuntime::new(Arc::new(registry), llm, AgentRuntimeConfig::default());

        let turn = runtime
            .run("system", "hello", &auth(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(turn.text, "final answer");
        assert_eq!(turn.steps_taken, 2);
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "count");
        assert_eq!(turn.tool_calls[0].result, json!({"calls": 1}));
    }

    #[tokio::test]
    async fn unknown_tool_call_yields_error_result_without_aborting_loop() {
        let registry = Arc::new(ToolRegistry::new());
        let llm = Arc::new(ScriptedLlm {
            responses: Mutex::new(vec![
                ChatResponse::ToolCalls(vec![ToolCall {
                    name: "nonexistent".to_string(),
                    arguments: json!({}),
                }]),
                ChatResponse::Message("recovered".to_string()),
            ]),
        });
        let runtime = AgentRuntime::new(registry, llm, AgentRuntimeConfig::default());

        let turn = runtime
            .run("system", "hello", &auth(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(turn.text, "recovered");
        assert_eq!(turn.tool_calls[0].result["error"], json!("unknown tool: nonexistent"));
    }

    #[tokio::test]
    async fn step_budget_exhaustion_is_reported() {
        let registry = Arc::new(ToolRegistry::new());
        let endless_tool_calls: Vec<ChatResponse> = (0..DEFAULT_STEP_BUDGET)
            .map(|_| {
                ChatResponse::ToolCalls(vec![ToolCall {
                    name: "nonexistent".to_string(),
                    arguments: json!({}),
                }])
            })
            .collect();
        let llm = Arc::new(ScriptedLlm {
            responses: Mutex::new(endless_tool_calls),
        });
        let runtime = AgentRuntime::new(registry, llm, AgentRuntimeConfig::default());

        let result = runtime.run("system", "hello", &auth(), &CancellationToken::new()).await;

        assert!(matches!(result, Err(AgentError::StepBudgetExhausted(n)) if n == DEFAULT_STEP_BUDGET));
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits_before_any_llm_call() {
        let registry = Arc::new(ToolRegistry::new());
        let llm = Arc::new(ScriptedLlm {
            responses: Mutex::new(vec![ChatResponse::Message("should not be reached".to_string())]),
        });
        let runtime = AgentRuntime::new(registry, llm, AgentRuntimeConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = runtime.run("system", "hello", &auth(), &cancel).await;

        assert!(matches!(result, Err(AgentError::Cancelled)));
    }
}
