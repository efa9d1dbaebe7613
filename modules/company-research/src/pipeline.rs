//! One research run: validate, collect, sanitize, report, publish.

use anyhow::Result;
use tracing::{error, info};

use research_common::{CompanyRecord, RunOutcome, SanitizeMode};

use crate::aggregator::Aggregator;
use crate::domain::Domain;
use crate::sanitize::sanitize_serializable;
use crate::traits::{JobRunner, ReportWriter, ResultPublisher};

pub struct Pipeline<R, W, P> {
    aggregator: Aggregator<R>,
    writer: W,
    publisher: P,
    sanitize_mode: SanitizeMode,
}

impl<R, W, P> Pipeline<R, W, P>
where
    R: JobRunner,
    W: ReportWriter,
    P: ResultPublisher,
{
    pub fn new(aggregator: Aggregator<R>, writer: W, publisher: P) -> Self {
        Self {
            aggregator,
            writer,
            publisher,
            sanitize_mode: SanitizeMode::default(),
        }
    }

    pub fn with_sanitize_mode(mut self, mode: SanitizeMode) -> Self {
        self.sanitize_mode = mode;
        self
    }

    pub fn aggregator(&self) -> &Aggregator<R> {
        &self.aggregator
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Validate `raw_domain`, collect its data and attach a generated report.
    pub async fn research(&self, raw_domain: &str) -> Result<CompanyRecord> {
        let domain = Domain::parse(raw_domain)?;
        info!(%domain, "Researching company");

        let mut record = self.aggregator.collect(&domain).await?;

        let data = sanitize_serializable(&record, self.sanitize_mode)?;
        let report = self.writer.write_report(&data).await?;

        record.report = Some(report.text);
        record.tokens_used = Some(report.tokens_used);
        Ok(record)
    }

    /// Run `research` and turn its result into the outcome record without
    /// publishing it.
    pub async fn outcome(&self, raw_domain: &str) -> RunOutcome {
        match self.research(raw_domain).await {
            Ok(record) => RunOutcome::Report {
                domain: record.domain,
                generated_report: record.report.unwrap_or_default(),
                tokens_used: record.tokens_used.unwrap_or_default(),
            },
            Err(e) => {
                error!(error = format!("{e:#}"), "Company research failed");
                RunOutcome::error(format!("{e:#}"))
            }
        }
    }

    /// Produce the outcome and publish it. Only a publishing failure is
    /// returned as an error.
    pub async fn run(&self, raw_domain: &str) -> Result<RunOutcome> {
        let outcome = self.outcome(raw_domain).await;
        self.publisher.publish(&outcome).await?;
        if !outcome.is_error() {
            info!("Company research completed successfully");
        }
        Ok(outcome)
    }
}
