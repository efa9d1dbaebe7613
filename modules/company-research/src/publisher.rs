//! Persisting run outcomes to Apify storage.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use apify_client::{ApifyClient, ExportFormat};
use research_common::RunOutcome;

use crate::traits::{ResultPublisher, ResultStore};

/// Routes outcomes into a `ResultStore`:
/// - every outcome goes to the run's default dataset, when there is one;
/// - reports also go to the named dataset, which is then exported as CSV
///   into the named key-value store;
/// - errors go to the named dataset only when there is no default dataset,
///   and are never exported.
pub struct ApifyPublisher<S = ApifyClient> {
    store: S,
    default_dataset_id: Option<String>,
    store_name: String,
    export_key: String,
}

impl<S: ResultStore> ApifyPublisher<S> {
    pub fn new(
        store: S,
        default_dataset_id: Option<String>,
        store_name: impl Into<String>,
        export_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            default_dataset_id,
            store_name: store_name.into(),
            export_key: export_key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Push to the named dataset and refresh its CSV export.
    async fn publish_report(&self, item: &Value) -> Result<()> {
        let dataset_id = self.store.open_dataset(&self.store_name).await?;
        self.store.push_item(&dataset_id, item).await?;

        let csv = self.store.export_csv(&dataset_id).await?;
        let store_id = self.store.open_store(&self.store_name).await?;
        self.store
            .write_record(&store_id, &self.export_key, csv, ExportFormat::Csv.content_type())
            .await?;

        info!(
            dataset_id = %dataset_id,
            store_id = %store_id,
            key = %self.export_key,
            "Report exported"
        );
        Ok(())
    }
}

#[async_trait]
impl<S: ResultStore> ResultPublisher for ApifyPublisher<S> {
    async fn publish(&self, outcome: &RunOutcome) -> Result<()> {
        let item = serde_json::to_value(outcome)?;

        if let Some(ref dataset_id) = self.default_dataset_id {
            self.store.push_item(dataset_id, &item).await?;
            info!(dataset_id = %dataset_id, error = outcome.is_error(), "Outcome pushed to default dataset");
        }

        match outcome {
            RunOutcome::Report { .. } => self.publish_report(&item).await,
            RunOutcome::Error { .. } if self.default_dataset_id.is_none() => {
                let dataset_id = self.store.open_dataset(&self.store_name).await?;
                self.store.push_item(&dataset_id, &item).await?;
                info!(dataset_id = %dataset_id, "Error outcome pushed to named dataset");
                Ok(())
            }
            RunOutcome::Error { .. } => Ok(()),
        }
    }
}
