use async_trait::async_trait;

use crate::error::Result;

// =============================================================================
// Completion
// =============================================================================

/// Text produced by a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub finish_reason: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: None,
        }
    }
}

// =============================================================================
// TextModel Trait
// =============================================================================

/// A hosted model that can generate text and count tokens for the same
/// tokenizer it generates with.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn model(&self) -> &str;

    async fn count_tokens(&self, text: &str) -> Result<u32>;

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<Completion>;
}
