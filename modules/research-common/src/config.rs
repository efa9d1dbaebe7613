use std::str::FromStr;

use anyhow::Result;

use crate::error::ResearchError;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_STORE_NAME: &str = "agent-data";
const DEFAULT_EXPORT_KEY: &str = "company-report.csv";

/// How the sanitizer decides that a nested container is a back-reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SanitizeMode {
    /// Omit a child exactly when it is the container being copied or one of
    /// its ancestors on the current path.
    #[default]
    Strict,
    /// Check children against the ancestors of the container being copied,
    /// excluding the container itself. A direct self-reference is copied one
    /// level deep before it is pruned.
    Legacy,
}

impl FromStr for SanitizeMode {
    type Err = ResearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SanitizeMode::Strict),
            "legacy" => Ok(SanitizeMode::Legacy),
            other => Err(ResearchError::Config(format!(
                "SANITIZER_MODE must be 'strict' or 'legacy', got '{other}'"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Job runner
    pub apify_token: String,
    pub default_dataset_id: Option<String>,
    pub default_key_value_store_id: Option<String>,

    // LLM
    pub google_api_key: String,
    pub gemini_model: String,

    // Output
    pub output_store_name: String,
    pub report_export_key: String,

    pub sanitize_mode: SanitizeMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            apify_token: required_env("APIFY_TOKEN")?,
            default_dataset_id: optional_env("APIFY_DEFAULT_DATASET_ID"),
            default_key_value_store_id: optional_env("APIFY_DEFAULT_KEY_VALUE_STORE_ID"),
            google_api_key: required_env("GOOGLE_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            output_store_name: optional_env("OUTPUT_STORE_NAME")
                .unwrap_or_else(|| DEFAULT_STORE_NAME.to_string()),
            report_export_key: optional_env("REPORT_EXPORT_KEY")
                .unwrap_or_else(|| DEFAULT_EXPORT_KEY.to_string()),
            sanitize_mode: optional_env("SANITIZER_MODE")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{}...({} chars)", head, val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) => v.clone(),
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  APIFY_TOKEN: {}", preview(&self.apify_token));
        tracing::info!("  GOOGLE_API_KEY: {}", preview(&self.google_api_key));
        tracing::info!("  GEMINI_MODEL: {}", self.gemini_model);
        tracing::info!("  APIFY_DEFAULT_DATASET_ID: {}", preview_opt(&self.default_dataset_id));
        tracing::info!(
            "  APIFY_DEFAULT_KEY_VALUE_STORE_ID: {}",
            preview_opt(&self.default_key_value_store_id)
        );
        tracing::info!("  OUTPUT_STORE_NAME: {}", self.output_store_name);
        tracing::info!("  SANITIZER_MODE: {:?}", self.sanitize_mode);
    }
}

fn required_env(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| ResearchError::Config(format!("{key} environment variable is required")).into())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
