use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Platforms ---

/// Professional/financial platforms a company profile can live on.
/// Declaration order is the order URL patterns are tested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    LinkedIn,
    Crunchbase,
    PitchBook,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::LinkedIn, Platform::Crunchbase, Platform::PitchBook];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::LinkedIn => "linkedin",
            Platform::Crunchbase => "crunchbase",
            Platform::PitchBook => "pitchbook",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- News ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub description: String,
    pub emphasized_keywords: Vec<String>,
    pub date: String,
}

// --- Profiles ---

/// Resolved profile URL per platform. Unresolved platforms hold an empty
/// string; each slot is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    pub linkedin: String,
    pub crunchbase: String,
    pub pitchbook: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crunchbase_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitchbook_description: Option<String>,
}

impl ProfileSet {
    pub fn url(&self, platform: Platform) -> &str {
        match platform {
            Platform::LinkedIn => &self.linkedin,
            Platform::Crunchbase => &self.crunchbase,
            Platform::PitchBook => &self.pitchbook,
        }
    }

    pub fn description(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::LinkedIn => self.linkedin_description.as_deref(),
            Platform::Crunchbase => self.crunchbase_description.as_deref(),
            Platform::PitchBook => self.pitchbook_description.as_deref(),
        }
    }

    pub fn is_filled(&self, platform: Platform) -> bool {
        !self.url(platform).is_empty()
    }

    /// Record a profile for `platform`. A filled slot is never overwritten;
    /// returns whether the slot was claimed.
    pub fn claim(&mut self, platform: Platform, url: String, description: String) -> bool {
        if self.is_filled(platform) || url.is_empty() {
            return false;
        }
        let (slot, desc) = match platform {
            Platform::LinkedIn => (&mut self.linkedin, &mut self.linkedin_description),
            Platform::Crunchbase => (&mut self.crunchbase, &mut self.crunchbase_description),
            Platform::PitchBook => (&mut self.pitchbook, &mut self.pitchbook_description),
        };
        *slot = url;
        *desc = Some(description);
        true
    }

    /// Platforms with a resolved URL, in pattern order.
    pub fn found(&self) -> impl Iterator<Item = (Platform, &str)> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.is_filled(*p))
            .map(|p| (p, self.url(p)))
    }

    pub fn is_empty(&self) -> bool {
        self.found().next().is_none()
    }
}

// --- Platform payloads ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "result_type", rename = "linkedin")]
pub struct LinkedInProfile {
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "result_type", rename = "crunchbase")]
pub struct CrunchbaseProfile {
    #[serde(flatten)]
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_timeline: Option<Vec<FundingRound>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "result_type", rename = "pitchbook")]
pub struct PitchBookProfile {
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// The payload of one platform fetch. Empty `data` means the scraper
/// returned no records for the profile URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlatformProfile {
    LinkedIn(LinkedInProfile),
    Crunchbase(CrunchbaseProfile),
    PitchBook(PitchBookProfile),
}

impl PlatformProfile {
    /// Wrap a raw scraper record as the payload of `platform`.
    /// `result_type` and `funding_timeline` keys already present in the
    /// record are discarded; both are written by the pipeline.
    pub fn from_record(platform: Platform, mut data: Map<String, Value>) -> Self {
        data.remove("result_type");
        data.remove("funding_timeline");
        match platform {
            Platform::LinkedIn => PlatformProfile::LinkedIn(LinkedInProfile { data }),
            Platform::Crunchbase => PlatformProfile::Crunchbase(CrunchbaseProfile {
                data,
                funding_timeline: None,
            }),
            Platform::PitchBook => PlatformProfile::PitchBook(PitchBookProfile { data }),
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            PlatformProfile::LinkedIn(_) => Platform::LinkedIn,
            PlatformProfile::Crunchbase(_) => Platform::Crunchbase,
            PlatformProfile::PitchBook(_) => Platform::PitchBook,
        }
    }

    pub fn data(&self) -> &Map<String, Value> {
        match self {
            PlatformProfile::LinkedIn(p) => &p.data,
            PlatformProfile::Crunchbase(p) => &p.data,
            PlatformProfile::PitchBook(p) => &p.data,
        }
    }
}

// --- Funding ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    /// ISO-8601 timestamp at midnight of the announcement day.
    pub date: String,
    /// USD.
    pub amount: f64,
    /// Lead investor names; unresolved entries are kept as `None`.
    pub investors: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingAnalysis {
    pub total_raised: f64,
    pub rounds: Vec<FundingRound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuation: Option<f64>,
}

// --- Aggregate ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyRecord {
    pub domain: String,
    pub news: Vec<NewsArticle>,
    pub profiles: ProfileSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_data: Option<LinkedInProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crunchbase_data: Option<CrunchbaseProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitchbook_data: Option<PitchBookProfile>,
    pub funding_analysis: FundingAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
}

impl CompanyRecord {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            news: Vec::new(),
            profiles: ProfileSet::default(),
            linkedin_data: None,
            crunchbase_data: None,
            pitchbook_data: None,
            funding_analysis: FundingAnalysis::default(),
            report: None,
            tokens_used: None,
        }
    }
}

// --- Output records ---

/// Final record pushed to the result store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RunOutcome {
    Report {
        domain: String,
        generated_report: String,
        tokens_used: u32,
    },
    Error {
        status: &'static str,
        message: String,
    },
}

impl RunOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        RunOutcome::Error {
            status: "error",
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RunOutcome::Error { .. })
    }
}
