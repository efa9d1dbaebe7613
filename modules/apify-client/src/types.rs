use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Scraper output uses `null` and absent keys interchangeably.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunData {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status.as_str(),
            "SUCCEEDED" | "FAILED" | "ABORTED" | "TIMED-OUT"
        )
    }
}

/// Metadata of a (possibly named) dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetInfo {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "itemCount", default)]
    pub item_count: u64,
}

/// Metadata of a (possibly named) key-value store.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyValueStoreInfo {
    pub id: String,
    pub name: Option<String>,
}

/// Export formats supported by the dataset items endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }
}

// --- Google search scraper ---

/// Input for the apify/google-search-scraper actor.
/// Multiple queries are newline-separated in `queries`.
#[derive(Debug, Clone, Serialize)]
pub struct GoogleSearchInput {
    pub queries: String,
    #[serde(rename = "maxPagesPerQuery")]
    pub max_pages_per_query: u32,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
}

/// One result page from the google-search-scraper dataset.
/// Each (query, page) pair is a separate dataset item.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResultPage {
    #[serde(rename = "searchQuery")]
    pub search_query: Option<SearchQuery>,
    #[serde(rename = "organicResults", default, deserialize_with = "null_as_default")]
    pub organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub page: Option<u32>,
}

/// A single organic search hit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "emphasizedKeywords", default, deserialize_with = "null_as_default")]
    pub emphasized_keywords: Vec<String>,
    pub date: Option<String>,
}

// --- Profile scrapers (LinkedIn / Crunchbase / PitchBook) ---

/// Input shared by the pratikdani/*-scraper actors: a single profile URL.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileScraperInput {
    pub url: String,
}
