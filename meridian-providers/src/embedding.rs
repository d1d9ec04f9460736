// ABOUTME: EmbeddingProvider trait and an OpenAI-compatible HTTP reference implementation
// ABOUTME: A single-purpose embed call: one HTTP round trip per batch, no provider-switching logic here

use async_trait::async_trait;
use meridian_core::types::Embedding;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of texts, returning one embedding per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    fn dimension(&self) -> usize;
}

#[derive(Debug, Clone)]
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl HttpEmbeddingProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimension: usize, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            dimension,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponseRow {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedResponseRow>,
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?
            .error_for_status()?;

        let parsed: EmbedResponse = response.json().await?;
        if parsed.data.len() != texts.len() {
            return Err(ProviderError::UnexpectedResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        parsed
            .data
            .into_iter()
            .map(|row| {
                if row.embedding.len() != self.dimension {
                    return Err(ProviderError::DimensionMismatch {
                        expected: self.dimension,
                        got: row.embedding.len(),
                    });
                }
                Ok(Embedding::new(row.embedding))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
