// ABOUTME: Embedding and LLM egress contracts: external collaborators, not in scope to host
// ABOUTME: EmbeddingProvider/LlmClient are the seams; HttpEmbeddingProvider/HttpLlmClient are reference implementations

#![warn(missing_debug_implementations)]

mod embedding;
mod error;
mod llm;

pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider};
pub use error::{ProviderError, Result};
pub use llm::{ChatMessage, ChatRequest, ChatResponse, ChatRole, HttpLlmClient, LlmClient, ToolCall, ToolSpec};

pub mod prelude {
    pub use crate::{ChatRequest, ChatResponse, EmbeddingProvider, LlmClient, Result};
}
