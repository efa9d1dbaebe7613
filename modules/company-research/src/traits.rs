// Trait seams for everything that leaves the process.
//
// JobRunner: the remote scraping job runner (submit, wait, read records).
// ReportWriter: turns a sanitized company record into narrative text.
// ResultStore: named datasets and key-value records the outcome lands in.
// ResultPublisher: persists the final record of a run.
//
// Production implementations talk to Apify and Gemini; `testing` has
// deterministic in-memory versions.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::warn;

use apify_client::{ApifyClient, ExportFormat};
use research_common::RunOutcome;

/// A single result record as returned by a job.
pub type Record = Map<String, Value>;

/// Identifies a submitted job and where its results will land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: String,
    pub dataset_id: String,
}

// ---------------------------------------------------------------------------
// JobRunner
// ---------------------------------------------------------------------------

#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Submit a job. `None` means the runner refused to start it.
    async fn start_job(&self, job_type: &str, input: &Value) -> Result<Option<JobHandle>>;

    /// Suspend until the job reaches a terminal state.
    async fn wait_for_job(&self, job: &JobHandle) -> Result<JobHandle>;

    /// Read the job's result records in dataset order.
    async fn job_items(&self, job: &JobHandle) -> Result<Vec<Record>>;
}

#[async_trait]
impl JobRunner for ApifyClient {
    async fn start_job(&self, job_type: &str, input: &Value) -> Result<Option<JobHandle>> {
        match self.start_run(job_type, input).await {
            Ok(run) => Ok(Some(JobHandle {
                id: run.id,
                dataset_id: run.default_dataset_id,
            })),
            Err(e) if e.is_rejection() => {
                warn!(job_type, error = %e, "Job runner rejected submission");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn wait_for_job(&self, job: &JobHandle) -> Result<JobHandle> {
        let run = self.wait_for_run(&job.id).await?;
        Ok(JobHandle {
            id: run.id,
            dataset_id: run.default_dataset_id,
        })
    }

    async fn job_items(&self, job: &JobHandle) -> Result<Vec<Record>> {
        Ok(self.get_dataset_items(&job.dataset_id).await?)
    }
}

// ---------------------------------------------------------------------------
// ReportWriter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReport {
    pub text: String,
    /// Prompt tokens plus reply tokens.
    pub tokens_used: u32,
}

#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Generate a report from already-sanitized data.
    async fn write_report(&self, data: &Value) -> Result<GeneratedReport>;
}

// ---------------------------------------------------------------------------
// ResultPublisher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, outcome: &RunOutcome) -> Result<()>;
}

// ---------------------------------------------------------------------------
// ResultStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Id of the dataset called `name`, created on first use.
    async fn open_dataset(&self, name: &str) -> Result<String>;

    async fn push_item(&self, dataset_id: &str, item: &Value) -> Result<()>;

    /// Every item of the dataset rendered as CSV.
    async fn export_csv(&self, dataset_id: &str) -> Result<String>;

    /// Id of the key-value store called `name`, created on first use.
    async fn open_store(&self, name: &str) -> Result<String>;

    async fn write_record(&self, store_id: &str, key: &str, body: String, content_type: &str) -> Result<()>;
}

#[async_trait]
impl ResultStore for ApifyClient {
    async fn open_dataset(&self, name: &str) -> Result<String> {
        Ok(self.get_or_create_dataset(name).await?.id)
    }

    async fn push_item(&self, dataset_id: &str, item: &Value) -> Result<()> {
        Ok(self.push_items(dataset_id, item).await?)
    }

    async fn export_csv(&self, dataset_id: &str) -> Result<String> {
        Ok(self.export_dataset(dataset_id, ExportFormat::Csv).await?)
    }

    async fn open_store(&self, name: &str) -> Result<String> {
        Ok(self.get_or_create_key_value_store(name).await?.id)
    }

    async fn write_record(&self, store_id: &str, key: &str, body: String, content_type: &str) -> Result<()> {
        Ok(self.put_record(store_id, key, body, content_type).await?)
    }
}
