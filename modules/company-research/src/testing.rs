// Test doubles for the pipeline's trait boundaries.
//
// - MockRunner (JobRunner): job type (+ input match) → canned dataset, records submissions
// - FixedModel (TextModel): fixed reply, whitespace token counting
// - MockReportWriter (ReportWriter): fixed report, captures its input
// - MockPublisher (ResultPublisher): in-memory outcome log
// - MemoryStore (ResultStore): in-memory datasets, CSV export and records

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use ai_client::{Completion, TextModel};
use research_common::RunOutcome;

use crate::traits::{
    GeneratedReport, JobHandle, JobRunner, Record, ReportWriter, ResultPublisher, ResultStore,
};

// ---------------------------------------------------------------------------
// MockRunner
// ---------------------------------------------------------------------------

struct Registration {
    job_type: String,
    needle: Option<String>,
    items: Vec<Value>,
}

/// Returns canned datasets per job type. Submitting a job with no matching
/// registration is an error; earlier registrations win.
/// Builder pattern: `.on_job()`, `.on_job_matching()`, `.refuse()`.
#[derive(Default)]
pub struct MockRunner {
    registrations: Vec<Registration>,
    refused: HashSet<String>,
    submissions: Mutex<Vec<(String, Value)>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset for every submission of `job_type`.
    pub fn on_job(mut self, job_type: &str, items: Vec<Value>) -> Self {
        self.registrations.push(Registration {
            job_type: job_type.to_string(),
            needle: None,
            items,
        });
        self
    }

    /// Dataset for submissions of `job_type` whose JSON input contains `needle`.
    pub fn on_job_matching(mut self, job_type: &str, needle: &str, items: Vec<Value>) -> Self {
        self.registrations.push(Registration {
            job_type: job_type.to_string(),
            needle: Some(needle.to_string()),
            items,
        });
        self
    }

    /// Make `start_job` report "failed to start" for `job_type`.
    pub fn refuse(mut self, job_type: &str) -> Self {
        self.refused.insert(job_type.to_string());
        self
    }

    /// Every submission so far as (job type, input), in order.
    pub fn submissions(&self) -> Vec<(String, Value)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submitted(&self, job_type: &str) -> usize {
        self.submissions
            .lock()
            .unwrap()
            .iter()
            .filter(|(job, _)| job == job_type)
            .count()
    }

    fn find(&self, job_type: &str, input: &Value) -> Option<usize> {
        let text = input.to_string();
        self.registrations.iter().position(|r| {
            r.job_type == job_type && r.needle.as_ref().map_or(true, |n| text.contains(n.as_str()))
        })
    }
}

#[async_trait]
impl JobRunner for MockRunner {
    async fn start_job(&self, job_type: &str, input: &Value) -> Result<Option<JobHandle>> {
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push((job_type.to_string(), input.clone()));

        if self.refused.contains(job_type) {
            return Ok(None);
        }
        let Some(index) = self.find(job_type, input) else {
            bail!("MockRunner: no dataset registered for {job_type} with input {input}");
        };

        Ok(Some(JobHandle {
            id: format!("run-{}", submissions.len()),
            dataset_id: index.to_string(),
        }))
    }

    async fn wait_for_job(&self, job: &JobHandle) -> Result<JobHandle> {
        Ok(job.clone())
    }

    async fn job_items(&self, job: &JobHandle) -> Result<Vec<Record>> {
        let registration = job
            .dataset_id
            .parse::<usize>()
            .ok()
            .and_then(|index| self.registrations.get(index))
            .ok_or_else(|| anyhow!("MockRunner: unknown dataset {}", job.dataset_id))?;

        registration
            .items
            .iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record.clone()),
                other => Err(anyhow!("MockRunner: dataset item is not an object: {other}")),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FixedModel
// ---------------------------------------------------------------------------

/// Always replies with the same text. Tokens are whitespace-separated words.
pub struct FixedModel {
    reply: String,
}

impl FixedModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }

    pub fn tokens_in(text: &str) -> u32 {
        text.split_whitespace().count() as u32
    }
}

#[async_trait]
impl TextModel for FixedModel {
    fn model(&self) -> &str {
        "fixed"
    }

    async fn count_tokens(&self, text: &str) -> ai_client::Result<u32> {
        Ok(Self::tokens_in(text))
    }

    async fn generate(&self, _prompt: &str, _temperature: f32) -> ai_client::Result<Completion> {
        Ok(Completion::new(self.reply.clone()))
    }
}

// ---------------------------------------------------------------------------
// MockReportWriter
// ---------------------------------------------------------------------------

pub struct MockReportWriter {
    report: std::result::Result<GeneratedReport, String>,
    inputs: Mutex<Vec<Value>>,
}

impl MockReportWriter {
    pub fn new(text: &str, tokens_used: u32) -> Self {
        Self {
            report: Ok(GeneratedReport {
                text: text.to_string(),
                tokens_used,
            }),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            report: Err(message.to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Data passed to `write_report`, in call order.
    pub fn inputs(&self) -> Vec<Value> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportWriter for MockReportWriter {
    async fn write_report(&self, data: &Value) -> Result<GeneratedReport> {
        self.inputs.lock().unwrap().push(data.clone());
        self.report.clone().map_err(|message| anyhow!(message))
    }
}

// ---------------------------------------------------------------------------
// MockPublisher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockPublisher {
    published: Mutex<Vec<RunOutcome>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<RunOutcome> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultPublisher for MockPublisher {
    async fn publish(&self, outcome: &RunOutcome) -> Result<()> {
        self.published.lock().unwrap().push(outcome.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Named datasets get the id `dataset:<name>`, named stores `store:<name>`.
#[derive(Default)]
pub struct MemoryStore {
    datasets: Mutex<HashMap<String, Vec<Value>>>,
    records: Mutex<HashMap<(String, String), (String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items pushed to the dataset with id `dataset_id`.
    pub fn items(&self, dataset_id: &str) -> Vec<Value> {
        self.datasets
            .lock()
            .unwrap()
            .get(dataset_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Items pushed to the dataset called `name`.
    pub fn dataset_items(&self, name: &str) -> Vec<Value> {
        self.items(&format!("dataset:{name}"))
    }

    /// (body, content type) stored under `key` in the store called `name`.
    pub fn record(&self, name: &str, key: &str) -> Option<(String, String)> {
        self.records
            .lock()
            .unwrap()
            .get(&(format!("store:{name}"), key.to_string()))
            .cloned()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn open_dataset(&self, name: &str) -> Result<String> {
        let id = format!("dataset:{name}");
        self.datasets.lock().unwrap().entry(id.clone()).or_default();
        Ok(id)
    }

    async fn push_item(&self, dataset_id: &str, item: &Value) -> Result<()> {
        self.datasets
            .lock()
            .unwrap()
            .entry(dataset_id.to_string())
            .or_default()
            .push(item.clone());
        Ok(())
    }

    /// Header of every key seen, then one row per item.
    async fn export_csv(&self, dataset_id: &str) -> Result<String> {
        let items = self.items(dataset_id);
        let columns: BTreeSet<&str> = items
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|item| item.keys().map(String::as_str))
            .collect();

        let mut lines = vec![columns.iter().copied().collect::<Vec<_>>().join(",")];
        for item in &items {
            let row: Vec<String> = columns
                .iter()
                .map(|column| match item.get(*column) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                })
                .collect();
            lines.push(row.join(","));
        }
        Ok(lines.join("\n"))
    }

    async fn open_store(&self, name: &str) -> Result<String> {
        Ok(format!("store:{name}"))
    }

    async fn write_record(&self, store_id: &str, key: &str, body: String, content_type: &str) -> Result<()> {
        self.records.lock().unwrap().insert(
            (store_id.to_string(), key.to_string()),
            (body, content_type.to_string()),
        );
        Ok(())
    }
}
