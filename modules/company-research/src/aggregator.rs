//! Two-stage fan-out over the sources, merged into one `CompanyRecord`.

use anyhow::Result;
use futures::future::try_join_all;
use tracing::info;

use research_common::{CompanyRecord, FundingAnalysis, PlatformProfile};

use crate::domain::Domain;
use crate::funding::{funding_timeline, summarize, valuation};
use crate::profiles::resolve_profiles;
use crate::sources::SourceClient;
use crate::traits::JobRunner;

pub struct Aggregator<R> {
    sources: SourceClient<R>,
}

impl<R: JobRunner> Aggregator<R> {
    pub fn new(sources: SourceClient<R>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &SourceClient<R> {
        &self.sources
    }

    /// Collect everything known about `domain`.
    ///
    /// News and profile discovery run concurrently; once both finish, one
    /// scrape per resolved profile URL runs concurrently. Any failure aborts
    /// the whole collection.
    pub async fn collect(&self, domain: &Domain) -> Result<CompanyRecord> {
        let (news, profiles) = tokio::try_join!(
            self.sources.search_news(domain),
            resolve_profiles(&self.sources, domain)
        )?;

        let fetched = try_join_all(
            profiles
                .found()
                .map(|(platform, url)| self.sources.fetch_profile(platform, url)),
        )
        .await?;
        info!(%domain, news = news.len(), profiles = fetched.len(), "Sources collected");

        let mut record = CompanyRecord::new(domain.as_str());
        record.news = news;
        record.profiles = profiles;

        for profile in fetched {
            match profile {
                PlatformProfile::LinkedIn(p) => record.linkedin_data = Some(p),
                PlatformProfile::Crunchbase(p) => record.crunchbase_data = Some(p),
                PlatformProfile::PitchBook(p) => record.pitchbook_data = Some(p),
            }
        }

        record.funding_analysis = match record.crunchbase_data.as_mut() {
            Some(crunchbase) => {
                let timeline = funding_timeline(&crunchbase.data);
                crunchbase.funding_timeline = Some(timeline.clone());
                summarize(timeline, valuation(&crunchbase.data))
            }
            None => FundingAnalysis::default(),
        };

        info!(
            %domain,
            rounds = record.funding_analysis.rounds.len(),
            total_raised = record.funding_analysis.total_raised,
            "Company record assembled"
        );

        Ok(record)
    }
}
