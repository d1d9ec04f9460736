// ABOUTME: Low-level HTTP calls against the enterprise search service
// ABOUTME: One pooled reqwest::Client per adapter instance, cloned cheaply across calls

use meridian_config::EssConfig;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{EssError, Result};

#[derive(Debug, Clone)]
pub struct EssHttpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EssHttpClient {
    #[must_use]
    pub fn new(config: &EssConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn classify_error(response: reqwest::Response) -> EssError {
        let status = response.status();
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await.unwrap_or_default();
        EssError::classify(status, retry_after_secs, &body)
    }

    pub async fn get_json(&self, path: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(Self::classify_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// Returns `(status, body)` rather than an error on a 404/405 so admin
    /// endpoints that don't exist by design can fall back without the
    /// caller unwrapping an error type. Every other non-2xx status
    /// (including other 4xx) is classified and returned as an error instead
    /// of being silently passed through.
    pub async fn post_json_raw(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let is_fallback_trigger = status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED;
        if !status.is_success() && !is_fallback_trigger {
            return Err(Self::classify_error(response).await);
        }
        let parsed: Value = response.json().await.unwrap_or(Value::Null);
        Ok((status, parsed))
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// POST a raw body (used for search responses that may be NDJSON
    /// instead of a single JSON document).
    pub async fn post_json_text(&self, path: &str, body: &Value) -> Result<String> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }
        Ok(response.text().await?)
    }

    pub async fn upload_multipart(&self, path: &str, filename: String, body: String) -> Result<Value> {
        let part = reqwest::multipart::Part::text(body)
            .file_name(filename)
            .mime_str("text/markdown")
            .unwrap_or_else(|_| reqwest::multipart::Part::text(String::new()));
        let form = reqwest::multipart::Form::new().part("files", part);
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::classify_error(response).await);
        }
        Ok(response.json().await?)
    }
}
