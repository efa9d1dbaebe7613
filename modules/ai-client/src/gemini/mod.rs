mod client;
pub(crate) mod types;

use async_trait::async_trait;

use crate::error::{AiError, Result};
use crate::traits::{Completion, TextModel};

use client::GeminiClient;
use types::*;

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

// =============================================================================
// Gemini Model
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    max_output_tokens: u32,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }
}

// =============================================================================
// TextModel Implementation
// =============================================================================

#[async_trait]
impl TextModel for Gemini {
    fn model(&self) -> &str {
        &self.model
    }

    async fn count_tokens(&self, text: &str) -> Result<u32> {
        let request = CountTokensRequest {
            contents: vec![Content::user(text)],
        };
        let response = self.client().count_tokens(&self.model, &request).await?;
        Ok(response.total_tokens)
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<Completion> {
        let request = GenerateRequest::new(prompt)
            .temperature(temperature)
            .max_output_tokens(self.max_output_tokens);

        let response = self.client().generate(&self.model, &request).await?;

        let text = response
            .text()
            .ok_or_else(|| AiError::EmptyResponse(format!("no text from {}", self.model)))?;

        Ok(Completion {
            text,
            finish_reason: response.finish_reason(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_new() {
        let ai = Gemini::new("test-key", "gemini-2.0-flash");
        assert_eq!(ai.model(), "gemini-2.0-flash");
        assert_eq!(ai.api_key(), "test-key");
        assert_eq!(ai.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
    }

    #[test]
    fn test_gemini_with_base_url() {
        let ai = Gemini::new("test-key", "gemini-2.0-flash").with_base_url("https://proxy.local/v1beta");
        assert_eq!(ai.base_url, Some("https://proxy.local/v1beta".to_string()));
    }
}
