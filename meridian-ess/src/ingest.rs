// ABOUTME: File-upload ingestion: format, metadata header, multipart upload, retry/backoff
// ABOUTME: Grounded on examples/original_source/ingestion/onyx_ingest.py's OnyxDocumentFormatter/_upload_with_retry

use std::time::Duration;

use serde_json::{json, Value};

use crate::client::EssHttpClient;
use crate::error::{EssError, Result};
use crate::types::{EssDocument, IngestResult};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: `base * 2^attempt`, matching `_upload_with_retry`'s
    /// `retry_delay * (2 ** attempt)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

#[derive(Debug, Clone)]
pub struct IngestClient {
    client: EssHttpClient,
    policy: RetryPolicy,
}

struct FormattedDocument {
    semantic_identifier: String,
    full_content: String,
}

impl IngestClient {
    #[must_use]
    pub fn new(client: EssHttpClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    fn format(document: &EssDocument) -> FormattedDocument {
        let semantic_identifier = derive_semantic_identifier(&document.source, &document.title);
        let sections = chunk_into_sections(&document.content, &document.source);
        let metadata = json!({
            "title": document.title,
            "source": document.source,
            "upload_method": "file_api",
        });
        let metadata_header = format!("#ONYX_METADATA={metadata}\n\n");
        let body: String = sections.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("\n\n");
        FormattedDocument {
            semantic_identifier,
            full_content: format!("{metadata_header}{body}"),
        }
    }

    /// No retry on 4xx except 408/429, exponential backoff on transient
    /// failures up to `max_retries + 1` total attempts, 401/403 fatal.
    pub async fn ingest(&self, document: &EssDocument) -> Result<IngestResult> {
        let formatted = Self::format(document);
        let sections_count = formatted.full_content.matches("\n\n").count().max(1);
        let filename = format!("{}.md", formatted.semantic_identifier);

        let mut last_err: Option<EssError> = None;
        for attempt in 0..=self.policy.max_retries {
            match self
                .client
                .upload_multipart("/api/user/file/upload", filename.clone(), formatted.full_content.clone())
                .await
            {
                Ok(value) => {
                    let document_id = first_document_id(&value).unwrap_or_else(|| formatted.semantic_identifier.clone());
                    return Ok(IngestResult {
                        document_id,
                        sections_count,
                        attempts: attempt + 1,
                    });
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "ess upload attempt failed");
                    last_err = Some(e);
                    if attempt < self.policy.max_retries {
                        tokio::time::sleep(self.policy.delay_for_attempt(attempt)).await;
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| EssError::Transient("upload exhausted retries".to_string())))
    }
}

fn derive_semantic_identifier(source: &str, title: &str) -> String {
    let base = source.rsplit('/').next().unwrap_or(source);
    let base = base.strip_suffix(".md").unwrap_or(base);
    if title.trim().is_empty() {
        base.to_string()
    } else {
        format!("{base}-{}", slugify(title))
    }
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn chunk_into_sections(content: &str, source: &str) -> Vec<String> {
    let chunks = meridian_rag::chunk_fixed_size(content, &meridian_rag::ChunkingConfig::default());
    if chunks.is_empty() {
        return vec![content.to_string()];
    }
    chunks
        .into_iter()
        .map(|c| format!("{}\n[source: {source}#chunk_{}]", c.content, c.chunk_index))
        .collect()
}

fn first_document_id(value: &Value) -> Option<String> {
    let item = value.as_array().and_then(|arr| arr.first()).unwrap_or(value);
    item.get("document_id").and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_semantic_identifier_from_source_and_title() {
        let id = derive_semantic_identifier("docs/readme.md", "Release Notes");
        assert_eq!(id, "readme-release-notes");
    }

    #[test]
    fn derives_semantic_identifier_without_title() {
        let id = derive_semantic_identifier("docs/readme.md", "");
        assert_eq!(id, "readme");
    }

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(8));
    }

    #[test]
    fn first_document_id_unwraps_array_response() {
        let value = json!([{"document_id": "doc-1"}]);
        assert_eq!(first_document_id(&value).as_deref(), Some("doc-1"));
    }

    #[test]
    fn first_document_id_handles_bare_object() {
        let value = json!({"document_id": "doc-2"});
        assert_eq!(first_document_id(&value).as_deref(), Some("doc-2"));
    }
}
