//! Uniform access to the remote scraping jobs: submit, wait, read records.

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::{debug, info};

use apify_client::{
    GoogleSearchInput, OrganicResult, ProfileScraperInput, SearchResultPage,
    CRUNCHBASE_COMPANY_SCRAPER, GOOGLE_SEARCH_SCRAPER, LINKEDIN_COMPANY_SCRAPER,
    PITCHBOOK_COMPANY_SCRAPER,
};
use research_common::{NewsArticle, Platform, PlatformProfile, ResearchError};

use crate::domain::Domain;
use crate::profiles::profile_queries;
use crate::traits::{JobRunner, Record};

const NEWS_MAX_PAGES: u32 = 2;
const NEWS_RESULTS_PER_PAGE: u32 = 5;
/// Articles are read from the second result page.
const NEWS_RESULT_PAGE: usize = 1;

const PROFILE_MAX_PAGES: u32 = 1;
const PROFILE_RESULTS_PER_PAGE: u32 = 1;

/// Remote job type that scrapes a company profile on `platform`.
pub fn profile_job_type(platform: Platform) -> &'static str {
    match platform {
        Platform::LinkedIn => LINKEDIN_COMPANY_SCRAPER,
        Platform::Crunchbase => CRUNCHBASE_COMPANY_SCRAPER,
        Platform::PitchBook => PITCHBOOK_COMPANY_SCRAPER,
    }
}

pub struct SourceClient<R> {
    runner: R,
}

impl<R: JobRunner> SourceClient<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Submit a job, wait for it and return its records.
    async fn run_job(&self, job_type: &str, input: Value) -> Result<Vec<Record>> {
        let handle = self
            .runner
            .start_job(job_type, &input)
            .await?
            .ok_or_else(|| ResearchError::JobStart {
                job: job_type.to_string(),
            })?;
        info!(job_type, job_id = %handle.id, "Job started, waiting for completion");

        let finished = self.runner.wait_for_job(&handle).await?;
        let items = self.runner.job_items(&finished).await?;
        info!(job_type, job_id = %finished.id, count = items.len(), "Job finished");

        Ok(items)
    }

    /// Raw result pages, one record per (query, page) pair.
    async fn search(
        &self,
        queries: &[String],
        max_pages_per_query: u32,
        results_per_page: u32,
    ) -> Result<Vec<Record>> {
        let input = GoogleSearchInput {
            queries: queries.join("\n"),
            max_pages_per_query,
            results_per_page,
        };
        self.run_job(GOOGLE_SEARCH_SCRAPER, serde_json::to_value(&input)?)
            .await
    }

    /// Recent news about the company behind `domain`. Only the page that is
    /// read gets decoded.
    pub async fn search_news(&self, domain: &Domain) -> Result<Vec<NewsArticle>> {
        let query = format!("{} company news", domain.company_name());
        let mut pages = self
            .search(&[query], NEWS_MAX_PAGES, NEWS_RESULTS_PER_PAGE)
            .await?;

        let page_count = pages.len();
        if page_count <= NEWS_RESULT_PAGE {
            return Err(ResearchError::EmptyResultSet(format!(
                "news search for {domain} returned {page_count} result page(s)"
            ))
            .into());
        }
        let page = decode_page(pages.swap_remove(NEWS_RESULT_PAGE))?;

        let articles: Vec<NewsArticle> = page
            .organic_results
            .iter()
            .filter_map(news_article)
            .collect();
        debug!(%domain, count = articles.len(), "Collected news articles");

        Ok(articles)
    }

    /// One result page per site-scoped profile query.
    pub async fn search_profiles(&self, domain: &Domain) -> Result<Vec<SearchResultPage>> {
        self.search(
            &profile_queries(domain),
            PROFILE_MAX_PAGES,
            PROFILE_RESULTS_PER_PAGE,
        )
        .await?
        .into_iter()
        .map(decode_page)
        .collect()
    }

    /// Scrape a company profile. An empty `url` returns an empty payload
    /// without submitting a job.
    pub async fn fetch_profile(&self, platform: Platform, url: &str) -> Result<PlatformProfile> {
        if url.is_empty() {
            return Ok(PlatformProfile::from_record(platform, Map::new()));
        }

        let input = ProfileScraperInput {
            url: url.to_string(),
        };
        let items = self
            .run_job(profile_job_type(platform), serde_json::to_value(&input)?)
            .await?;

        let record = items.into_iter().next().unwrap_or_default();
        Ok(PlatformProfile::from_record(platform, record))
    }

    pub async fn fetch_linkedin(&self, url: &str) -> Result<PlatformProfile> {
        self.fetch_profile(Platform::LinkedIn, url).await
    }

    pub async fn fetch_crunchbase(&self, url: &str) -> Result<PlatformProfile> {
        self.fetch_profile(Platform::Crunchbase, url).await
    }

    pub async fn fetch_pitchbook(&self, url: &str) -> Result<PlatformProfile> {
        self.fetch_profile(Platform::PitchBook, url).await
    }
}

fn decode_page(record: Record) -> Result<SearchResultPage> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Articles need both a title and a URL.
fn news_article(result: &OrganicResult) -> Option<NewsArticle> {
    let title = result.title.as_deref().filter(|t| !t.is_empty())?;
    let url = result.url.as_deref().filter(|u| !u.is_empty())?;
    Some(NewsArticle {
        title: title.to_string(),
        url: url.to_string(),
        description: result.description.clone().unwrap_or_default(),
        emphasized_keywords: result.emphasized_keywords.clone(),
        date: result.date.clone().unwrap_or_default(),
    })
}
