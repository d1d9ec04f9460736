// ABOUTME: POST /chat and POST /chat/stream: both run the agent runtime's tool-call loop for one turn
// ABOUTME: Neither the LLM collaborator nor the orchestrator streams tokens, so /chat/stream frames a completed turn

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures::Stream;
use meridian_agents::{AgentTurn, DEFAULT_SYSTEM_PROMPT};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::auth::{require_permission, Authenticated};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<ChatRequest>,
) -> Result<Json<AgentTurn>, ApiError> {
    require_permission(&ctx, "chat:query")?;
    let cancel = CancellationToken::new();
    let turn = state.agents.run(DEFAULT_SYSTEM_PROMPT, &req.query, &ctx, &cancel).await?;
    Ok(Json(turn))
}

/// Frames: `status | tool_call | tool_result | text | complete | error`.
/// The whole turn runs to completion first; frames are emitted from that
/// one result rather than from a live token stream.
pub async fn chat_stream(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    require_permission(&ctx, "chat:query")?;
    let cancel = CancellationToken::new();

    let mut events = vec![Event::default().event("status").data("running")];
    match state.agents.run(DEFAULT_SYSTEM_PROMPT, &req.query, &ctx, &cancel).await {
        Ok(turn) => {
            for call in &turn.tool_calls {
                events.push(
                    Event::default()
                        .event("tool_call")
                        .data(json!({ "name": call.name, "arguments": call.arguments }).to_string()),
                );
                events.push(
                    Event::default()
                        .event("tool_result")
                        .data(json!({ "name": call.name, "result": call.result }).to_string()),
                );
            }
            for word in turn.text.split_whitespace() {
                events.push(Event::default().event("text").data(word.to_string()));
            }
            events.push(Event::default().event("complete").data(
                serde_json::to_string(&turn).unwrap_or_else(|_| "{}".to_string()),
            ));
        }
        Err(err) => {
            let api_err = ApiError::from(err);
            events.push(Event::default().event("error").data(api_err.0.to_string()));
        }
    }

    Ok(Sse::new(futures::stream::iter(events.into_iter().map(Ok))))
}
