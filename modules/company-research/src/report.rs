//! LLM-backed report generation.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use ai_client::TextModel;

use crate::traits::{GeneratedReport, ReportWriter};

const TEMPERATURE: f32 = 0.7;

const PROMPT_HEADER: &str = "\
You are a business analyst. Generate a comprehensive company report based on the following data.
Focus on key insights about the company's:
1. Overview and core business
2. Products and services
3. Market presence and performance
4. Key personnel and organization
5. Financial metrics and funding
6. Technology stack and digital presence
7. Recent developments and news

Make it professional but easy to read. Use bullet points where appropriate. \
Give the report in a markdown format. Only give the report, no other text.
";

/// Embed `data` as indented JSON in the report prompt.
pub fn build_prompt(data: &Value) -> Result<String> {
    let json = serde_json::to_string_pretty(data)?;
    Ok(format!("{PROMPT_HEADER}\nData: {json}\n"))
}

/// Writes reports with any `TextModel`, counting prompt and reply tokens
/// with the same model.
pub struct LlmReportWriter<M> {
    model: M,
}

impl<M: TextModel> LlmReportWriter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<M: TextModel> ReportWriter for LlmReportWriter<M> {
    async fn write_report(&self, data: &Value) -> Result<GeneratedReport> {
        let prompt = build_prompt(data)?;

        let input_tokens = self.model.count_tokens(&prompt).await?;
        let completion = self.model.generate(&prompt, TEMPERATURE).await?;
        let output_tokens = self.model.count_tokens(&completion.text).await?;

        info!(
            model = self.model.model(),
            input_tokens,
            output_tokens,
            finish_reason = completion.finish_reason.as_deref().unwrap_or("unknown"),
            "Report generated"
        );

        Ok(GeneratedReport {
            text: completion.text,
            tokens_used: input_tokens + output_tokens,
        })
    }
}
