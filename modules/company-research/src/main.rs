use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::Gemini;
use apify_client::ApifyClient;
use research_common::{AppConfig, ResearchError, RunOutcome};

use company_research::aggregator::Aggregator;
use company_research::pipeline::Pipeline;
use company_research::publisher::ApifyPublisher;
use company_research::report::LlmReportWriter;
use company_research::sources::SourceClient;
use company_research::traits::ResultPublisher;

#[derive(Parser, Debug)]
#[command(name = "company-research", about = "Research a company from its domain name")]
struct Cli {
    /// Company domain or URL. Falls back to the `domain` field of the INPUT record.
    #[arg(long, env = "DOMAIN")]
    domain: Option<String>,

    /// Print the outcome instead of publishing it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(serde::Deserialize)]
struct ActorInput {
    domain: Option<String>,
}

/// Print-only publisher for `--dry-run`.
struct StdoutPublisher;

#[async_trait::async_trait]
impl ResultPublisher for StdoutPublisher {
    async fn publish(&self, outcome: &RunOutcome) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("company_research=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let domain = match cli.domain {
        Some(domain) => domain,
        None => input_domain(&config).await?,
    };

    let sources = SourceClient::new(ApifyClient::new(config.apify_token.clone()));
    let writer = LlmReportWriter::new(Gemini::new(
        config.google_api_key.clone(),
        config.gemini_model.clone(),
    ));

    let outcome = if cli.dry_run {
        Pipeline::new(Aggregator::new(sources), writer, StdoutPublisher)
            .with_sanitize_mode(config.sanitize_mode)
            .run(&domain)
            .await?
    } else {
        let publisher = ApifyPublisher::new(
            ApifyClient::new(config.apify_token.clone()),
            config.default_dataset_id.clone(),
            config.output_store_name.clone(),
            config.report_export_key.clone(),
        );
        Pipeline::new(Aggregator::new(sources), writer, publisher)
            .with_sanitize_mode(config.sanitize_mode)
            .run(&domain)
            .await?
    };

    info!(error = outcome.is_error(), "Run finished");
    Ok(())
}

/// Read the domain from the run's INPUT record. A missing record or field
/// yields an empty domain, which the pipeline reports as a validation error.
async fn input_domain(config: &AppConfig) -> Result<String> {
    let Some(ref store_id) = config.default_key_value_store_id else {
        return Err(ResearchError::Config(
            "no --domain given and APIFY_DEFAULT_KEY_VALUE_STORE_ID is not set".to_string(),
        )
        .into());
    };

    let client = ApifyClient::new(config.apify_token.clone());
    let input: Option<ActorInput> = client.get_record(store_id, "INPUT").await?;
    Ok(input.and_then(|i| i.domain).unwrap_or_default())
}
