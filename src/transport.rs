use async_trait::async_trait;
use reqwest::Client;

use crate::error::{OperatorError, Result};
use crate::models::{GenerateContentRequest, GenerateContentResponse};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

/// Gemini `generateContent` client. Single attempt per call: failures go back to
/// the caller, which decides what the operator sees.
pub struct GeminiTransport {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiTransport {
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(OperatorError::Config("API Key not found".to_string()));
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(
        &self,
        model: &str,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model);
        tracing::debug!(%url, turns = req.contents.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OperatorError::Gateway(format!(
                "Gemini API returned {status}: {body}"
            )));
        }

        response.json().await.map_err(|e| {
            OperatorError::Gateway(format!("Failed to parse Gemini API response: {e}"))
        })
    }
}
