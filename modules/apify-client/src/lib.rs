pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    DatasetInfo, ExportFormat, GoogleSearchInput, KeyValueStoreInfo, OrganicResult,
    ProfileScraperInput, RunData, SearchQuery, SearchResultPage,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for apify/google-search-scraper.
pub const GOOGLE_SEARCH_SCRAPER: &str = "apify~google-search-scraper";

/// Actor ID for pratikdani/linkedin-company-profile-scraper.
pub const LINKEDIN_COMPANY_SCRAPER: &str = "pratikdani~linkedin-company-profile-scraper";

/// Actor ID for pratikdani/crunchbase-companies-scraper.
pub const CRUNCHBASE_COMPANY_SCRAPER: &str = "pratikdani~crunchbase-companies-scraper";

/// Actor ID for pratikdani/pitchbook-companies-scraper.
pub const PITCHBOOK_COMPANY_SCRAPER: &str = "pratikdani~pitchbook-companies-scraper";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize + ?Sized>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let resp = ensure_success(resp).await?;
            let run = resp.json::<ApiResponse<RunData>>().await?.data;
            if run.status == "SUCCEEDED" {
                return Ok(run);
            }
            if run.is_terminal() {
                return Err(ApifyError::RunFailed(run.status));
            }
            tracing::debug!(run_id, status = %run.status, "Run still in progress");
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    // --- Storage ---

    /// Get a named dataset, creating it if it does not exist yet.
    pub async fn get_or_create_dataset(&self, name: &str) -> Result<DatasetInfo> {
        let url = format!("{}/datasets", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[("name", name)])
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let api_resp: ApiResponse<DatasetInfo> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Append one item (object) or many items (array) to a dataset.
    pub async fn push_items<T: Serialize + ?Sized>(&self, dataset_id: &str, items: &T) -> Result<()> {
        let url = format!("{}/datasets/{}/items", self.base_url, dataset_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(items)
            .send()
            .await?;

        ensure_success(resp).await?;
        tracing::debug!(dataset_id, "Pushed dataset items");
        Ok(())
    }

    /// Download every item of a dataset in the given format.
    pub async fn export_dataset(&self, dataset_id: &str, format: ExportFormat) -> Result<String> {
        let url = format!("{}/datasets/{}/items", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("format", format.as_str())])
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        Ok(resp.text().await?)
    }

    /// Get a named key-value store, creating it if it does not exist yet.
    pub async fn get_or_create_key_value_store(&self, name: &str) -> Result<KeyValueStoreInfo> {
        let url = format!("{}/key-value-stores", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[("name", name)])
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let api_resp: ApiResponse<KeyValueStoreInfo> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Store a record under `key`, replacing any previous value.
    pub async fn put_record(
        &self,
        store_id: &str,
        key: &str,
        body: String,
        content_type: &str,
    ) -> Result<()> {
        let url = format!("{}/key-value-stores/{}/records/{}", self.base_url, store_id, key);
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        ensure_success(resp).await?;
        tracing::debug!(store_id, key, "Stored key-value record");
        Ok(())
    }

    /// Read a JSON record. Returns `None` when the key does not exist.
    pub async fn get_record<T: DeserializeOwned>(&self, store_id: &str, key: &str) -> Result<Option<T>> {
        let url = format!("{}/key-value-stores/{}/records/{}", self.base_url, store_id, key);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let resp = ensure_success(resp).await?;
        Ok(Some(resp.json().await?))
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApifyError::Api {
        status: status.as_u16(),
        message: body,
    })
}
