// ABOUTME: Targeted search with retry, fallback chat (§4.5.4)
// ABOUTME: Payload shapes grounded on examples/original_source/onyx/service.py's search_with_document_set_validated

use std::time::Duration;

use serde_json::{json, Value};

use crate::client::EssHttpClient;
use crate::error::Result;
use crate::types::{SearchOutcome, SourceDoc};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct SearchClient {
    client: EssHttpClient,
    default_persona_id: i64,
}

impl SearchClient {
    #[must_use]
    pub fn new(client: EssHttpClient, default_persona_id: i64) -> Self {
        Self { client, default_persona_id }
    }

    async fn create_session(&self, title: &str, persona_id: i64) -> Result<String> {
        let payload = json!({
            "title": title,
            "persona_id": persona_id,
        });
        let response = self.client.post_json("/api/chat/create-chat-session", &payload).await?;
        Ok(response
            .get("chat_session_id")
            .map(std::string::ToString::to_string)
            .unwrap_or_default()
            .trim_matches('"')
            .to_string())
    }

    /// A fresh chat session per attempt, linear backoff between attempts,
    /// structured failure rather than an error after exhaustion.
    pub async fn search(
        &self,
        query: &str,
        document_set_id: &str,
        max_retries: u32,
        persona_id: Option<i64>,
    ) -> SearchOutcome {
        let persona_id = persona_id.unwrap_or(self.default_persona_id);
        for attempt in 1..=max_retries.max(1) {
            match self.attempt(query, document_set_id, attempt, persona_id).await {
                Ok(Some((answer, source_docs))) => {
                    return SearchOutcome::Success { answer, source_docs, attempt };
                }
                Ok(None) => {
                    tracing::warn!(attempt, "ess search returned no answer");
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "ess search attempt failed");
                    if !e.is_retryable() {
                        return SearchOutcome::Failure { error: e.to_string() };
                    }
                }
            }
            if attempt < max_retries {
                tokio::time::sleep(DEFAULT_RETRY_DELAY).await;
            }
        }
        SearchOutcome::Failure {
            error: format!("search exhausted {max_retries} attempts with no answer"),
        }
    }

    async fn attempt(
        &self,
        query: &str,
        document_set_id: &str,
        attempt: u32,
        persona_id: i64,
    ) -> Result<Option<(String, Vec<SourceDoc>)>> {
        let session_id = self.create_session(&format!("search attempt {attempt}"), persona_id).await?;
        if session_id.is_empty() {
            return Ok(None);
        }

        let payload = json!({
            "chat_session_id": session_id,
            "message": query,
            "parent_message_id": Value::Null,
            "file_descriptors": [],
            "prompt_id": Value::Null,
            "search_doc_ids": Value::Null,
            "retrieval_options": {
                "run_search": "always",
                "real_time": false,
                "enable_auto_detect_filters": false,
                "document_set_ids": [document_set_id],
            },
        });

        let body = self.client.post_json_text("/api/chat/send-message", &payload).await?;
        let Some(result) = parse_last_json(&body) else {
            return Ok(None);
        };

        let answer = result
            .get("answer")
            .or_else(|| result.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();

        let source_docs = extract_source_docs(&result);

        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some((answer, source_docs)))
        }
    }

    /// Single message, no document-set constraint; used as the degraded
    /// fallback when targeted search comes up empty.
    pub async fn simple_chat(&self, query: &str, persona_id: Option<i64>) -> Result<String> {
        let payload = json!({
            "message": query,
            "persona_id": persona_id.unwrap_or(self.default_persona_id),
        });
        let response = self
            .client
            .post_json("/api/chat/send-message-simple-api", &payload)
            .await?;
        Ok(response.get("answer").and_then(Value::as_str).unwrap_or_default().to_string())
    }
}

/// Parse the body as a single JSON document; if that fails, scan lines in
/// reverse for the last one that parses (ESS streams newline-delimited
/// fragments and only the final fragment carries the complete answer).
fn parse_last_json(body: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str(body) {
        return Some(v);
    }
    body.lines()
        .rev()
        .filter(|l| !l.trim().is_empty())
        .find_map(|line| serde_json::from_str(line.trim()).ok())
}

fn extract_source_docs(result: &Value) -> Vec<SourceDoc> {
    let Some(docs) = result.get("context_docs").and_then(|c| c.get("top_documents")).and_then(Value::as_array) else {
        return Vec::new();
    };
    docs.iter()
        .map(|d| SourceDoc {
            title: d
                .get("semantic_identifier")
                .and_then(Value::as_str)
                .unwrap_or("untitled")
                .to_string(),
            link: d.get("link").and_then(Value::as_str).map(str::to_string),
            snippet: d.get("blurb").and_then(Value::as_str).unwrap_or_default().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_last_json_handles_single_document() {
        let body = r#"{"answer": "hi"}"#;
        let parsed = parse_last_json(body).unwrap();
        assert_eq!(parsed.get("answer").unwrap(), "hi");
    }

    #[test]
    fn parse_last_json_scans_ndjson_for_last_valid_line() {
        let body = "{\"partial\": true}\nnot json\n{\"answer\": \"final\"}\n";
        let parsed = parse_last_json(body).unwrap();
        assert_eq!(parsed.get("answer").unwrap(), "final");
    }

    #[test]
    fn parse_last_json_none_when_nothing_parses() {
        assert!(parse_last_json("not json\nstill not json").is_none());
    }

    #[test]
    fn extract_source_docs_reads_top_documents() {
        let result = json!({
            "context_docs": {
                "top_documents": [
                    {"semantic_identifier": "Doc A", "link": "https://x", "blurb": "snip"}
                ]
            }
        });
        let docs = extract_source_docs(&result);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Doc A");
        assert_eq!(docs[0].link.as_deref(), Some("https://x"));
    }

    #[test]
    fn extract_source_docs_empty_when_missing() {
        assert!(extract_source_docs(&json!({})).is_empty());
    }
}
