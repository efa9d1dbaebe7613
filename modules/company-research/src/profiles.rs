//! Company profile discovery: site-scoped searches, then URL pattern matching.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::info;

use apify_client::SearchResultPage;
use research_common::{Platform, ProfileSet, ResearchError};

use crate::domain::Domain;
use crate::sources::SourceClient;
use crate::traits::JobRunner;

// =============================================================================
// Regex Patterns
// =============================================================================

static RE_LINKEDIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)linkedin\.com/company/[^/]+").unwrap());
static RE_CRUNCHBASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)crunchbase\.com/organization/[^/]+").unwrap());
static RE_PITCHBOOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pitchbook\.com/profiles/company/[^/]+").unwrap());

/// Canonical company-profile URL shape for `platform`.
pub fn profile_pattern(platform: Platform) -> &'static Regex {
    match platform {
        Platform::LinkedIn => &RE_LINKEDIN,
        Platform::Crunchbase => &RE_CRUNCHBASE,
        Platform::PitchBook => &RE_PITCHBOOK,
    }
}

/// Search queries, one per platform site.
pub fn profile_queries(domain: &Domain) -> Vec<String> {
    ["crunchbase.com", "linkedin.com", "pitchbook.com"]
        .iter()
        .map(|site| format!("site:{site} company {domain}"))
        .collect()
}

// =============================================================================
// Matching
// =============================================================================

/// Assign `url` to the first platform whose pattern matches and whose slot is
/// still empty. Returns the platform that claimed it, if any.
pub fn assign_profile(profiles: &mut ProfileSet, url: &str, description: &str) -> Option<Platform> {
    let url = url.to_lowercase();
    for platform in Platform::ALL {
        if profile_pattern(platform).is_match(&url) && !profiles.is_filled(platform) {
            profiles.claim(platform, url, description.to_string());
            return Some(platform);
        }
    }
    None
}

/// Build a `ProfileSet` from the first organic result of each query page.
/// A page with no organic results is an `EmptyResultSet` error.
pub fn extract_profiles(pages: &[SearchResultPage]) -> Result<ProfileSet, ResearchError> {
    let mut profiles = ProfileSet::default();

    for (index, page) in pages.iter().enumerate() {
        let first = page.organic_results.first().ok_or_else(|| {
            let term = page
                .search_query
                .as_ref()
                .and_then(|q| q.term.clone())
                .unwrap_or_else(|| format!("query #{index}"));
            ResearchError::EmptyResultSet(format!("no organic results for '{term}'"))
        })?;

        let url = first.url.as_deref().unwrap_or_default();
        let description = first.description.as_deref().unwrap_or_default();
        assign_profile(&mut profiles, url, description);
    }

    Ok(profiles)
}

/// Search for the company's LinkedIn, Crunchbase and PitchBook pages.
pub async fn resolve_profiles<R: JobRunner>(
    sources: &SourceClient<R>,
    domain: &Domain,
) -> Result<ProfileSet> {
    let pages = sources.search_profiles(domain).await?;
    let profiles = extract_profiles(&pages)?;

    info!(
        %domain,
        linkedin = !profiles.linkedin.is_empty(),
        crunchbase = !profiles.crunchbase.is_empty(),
        pitchbook = !profiles.pitchbook.is_empty(),
        "Resolved company profiles"
    );

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(url: &str, description: &str) -> SearchResultPage {
        serde_json::from_value(json!({
            "organicResults": [{ "url": url, "description": description }]
        }))
        .unwrap()
    }

    #[test]
    fn queries_are_site_scoped() {
        let domain = Domain::parse("acme.com").unwrap();
        assert_eq!(
            profile_queries(&domain),
            vec![
                "site:crunchbase.com company acme.com",
                "site:linkedin.com company acme.com",
                "site:pitchbook.com company acme.com",
            ]
        );
    }

    #[test]
    fn each_url_lands_in_its_platform_slot() {
        let pages = vec![
            page("https://www.linkedin.com/company/acme", "Acme on LinkedIn"),
            page("https://www.crunchbase.com/organization/acme", "Acme on Crunchbase"),
            page("https://www.pitchbook.com/profiles/company/acme-123", "Acme on PitchBook"),
        ];

        let profiles = extract_profiles(&pages).unwrap();

        assert_eq!(profiles.linkedin, "https://www.linkedin.com/company/acme");
        assert_eq!(profiles.crunchbase, "https://www.crunchbase.com/organization/acme");
        assert_eq!(profiles.pitchbook, "https://www.pitchbook.com/profiles/company/acme-123");
        assert_eq!(profiles.description(Platform::PitchBook), Some("Acme on PitchBook"));
        assert!(Platform::ALL.iter().all(|p| profiles.is_filled(*p)));
    }

    #[test]
    fn unmatched_url_leaves_other_slots_alone() {
        let pages = vec![
            page("https://www.linkedin.com/company/acme", ""),
            page("https://acme.com/about", "Acme homepage"),
            page("https://www.pitchbook.com/profiles/investor/acme", ""),
        ];

        let profiles = extract_profiles(&pages).unwrap();

        assert_eq!(profiles.linkedin, "https://www.linkedin.com/company/acme");
        assert_eq!(profiles.crunchbase, "");
        assert_eq!(profiles.pitchbook, "");
        assert!(profiles.crunchbase_description.is_none());
    }

    #[test]
    fn first_match_per_platform_wins() {
        let pages = vec![
            page("https://www.linkedin.com/company/acme", "first"),
            page("https://www.linkedin.com/company/acme-labs", "second"),
        ];

        let profiles = extract_profiles(&pages).unwrap();

        assert_eq!(profiles.linkedin, "https://www.linkedin.com/company/acme");
        assert_eq!(profiles.description(Platform::LinkedIn), Some("first"));
    }

    #[test]
    fn urls_are_matched_case_insensitively_and_stored_lowercase() {
        let mut profiles = ProfileSet::default();
        let claimed = assign_profile(&mut profiles, "https://www.LinkedIn.com/company/ACME", "");
        assert_eq!(claimed, Some(Platform::LinkedIn));
        assert_eq!(profiles.linkedin, "https://www.linkedin.com/company/acme");
    }

    #[test]
    fn pattern_needs_a_profile_segment() {
        let mut profiles = ProfileSet::default();
        assert_eq!(assign_profile(&mut profiles, "https://www.linkedin.com/company/", ""), None);
        assert_eq!(assign_profile(&mut profiles, "https://www.crunchbase.com/person/jane", ""), None);
        assert!(profiles.is_empty());
    }

    #[test]
    fn page_without_results_is_an_error() {
        let pages = vec![
            page("https://www.linkedin.com/company/acme", ""),
            serde_json::from_value(json!({
                "searchQuery": { "term": "site:pitchbook.com company acme.com" },
                "organicResults": []
            }))
            .unwrap(),
        ];

        let err = extract_profiles(&pages).unwrap_err();
        match err {
            ResearchError::EmptyResultSet(msg) => assert!(msg.contains("site:pitchbook.com")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_pages_yields_empty_profiles() {
        let profiles = extract_profiles(&[]).unwrap();
        assert!(profiles.is_empty());
    }
}
