//! Integration test: domain → searches → profile scrapes → report → publish.
//!
//! Runs the full pipeline against canned job datasets. Both searches go
//! through the same scraper, so datasets are matched on the query text.

use serde_json::{json, Value};

use apify_client::{
    CRUNCHBASE_COMPANY_SCRAPER, GOOGLE_SEARCH_SCRAPER, LINKEDIN_COMPANY_SCRAPER,
    PITCHBOOK_COMPANY_SCRAPER,
};
use company_research::aggregator::Aggregator;
use company_research::domain::Domain;
use company_research::pipeline::Pipeline;
use company_research::sources::SourceClient;
use company_research::testing::{MockPublisher, MockReportWriter, MockRunner};
use research_common::{FundingRound, RunOutcome, SanitizeMode};

fn news_pages() -> Vec<Value> {
    vec![
        json!({
            "searchQuery": { "term": "acme company news", "page": 1 },
            "organicResults": [{ "title": "Older story", "url": "https://news.example/old" }]
        }),
        json!({
            "searchQuery": { "term": "acme company news", "page": 2 },
            "organicResults": [
                { "title": "Acme closes Series A", "url": "https://news.example/series-a",
                  "description": "Acme raised $20M", "emphasizedKeywords": ["Acme"], "date": "Jun 15, 2022" }
            ]
        }),
    ]
}

fn profile_pages(urls: [&str; 3]) -> Vec<Value> {
    urls.iter()
        .map(|url| {
            json!({
                "searchQuery": { "term": "site:example.com company acme.com" },
                "organicResults": [{ "url": url, "description": "Acme profile" }]
            })
        })
        .collect()
}

fn crunchbase_record() -> Value {
    json!({
        "name": "Acme",
        "funding_rounds_list": [
            {
                "announced_on": "2022-06-15",
                "money_raised": { "value_usd": "20000000" },
                "lead_investors": [{ "names": null }]
            },
            {
                "announced_on": "2021-03-01",
                "money_raised": { "value_usd": 5000000 },
                "lead_investors": [{ "names": "Seed Fund" }]
            }
        ],
        "valuation": { "value_usd": 1000000000 }
    })
}

fn full_runner() -> MockRunner {
    MockRunner::new()
        .on_job_matching(GOOGLE_SEARCH_SCRAPER, "company news", news_pages())
        .on_job_matching(
            GOOGLE_SEARCH_SCRAPER,
            "site:",
            profile_pages([
                "https://www.crunchbase.com/organization/acme",
                "https://www.linkedin.com/company/acme",
                "https://pitchbook.com/profiles/company/12345-67",
            ]),
        )
        .on_job(LINKEDIN_COMPANY_SCRAPER, vec![json!({ "name": "Acme", "employees": 120 })])
        .on_job(CRUNCHBASE_COMPANY_SCRAPER, vec![crunchbase_record()])
        .on_job(PITCHBOOK_COMPANY_SCRAPER, vec![json!({ "name": "Acme Inc." })])
}

fn pipeline(
    runner: MockRunner,
    writer: MockReportWriter,
) -> Pipeline<MockRunner, MockReportWriter, MockPublisher> {
    Pipeline::new(
        Aggregator::new(SourceClient::new(runner)),
        writer,
        MockPublisher::new(),
    )
}

fn runner_of<'a>(
    pipeline: &'a Pipeline<MockRunner, MockReportWriter, MockPublisher>,
) -> &'a MockRunner {
    pipeline.aggregator().sources().runner()
}

fn writer_inputs(
    pipeline: &Pipeline<MockRunner, MockReportWriter, MockPublisher>,
) -> Vec<Value> {
    pipeline.writer().inputs()
}

#[tokio::test]
async fn full_run_collects_all_profiles_and_funding() {
    let pipeline = pipeline(full_runner(), MockReportWriter::new("Acme is growing.", 42));

    let record = pipeline.research("https://www.Acme.com/about").await.unwrap();

    assert_eq!(record.domain, "acme.com");
    assert_eq!(record.news.len(), 1);
    assert_eq!(record.news[0].title, "Acme closes Series A");
    assert_eq!(record.profiles.linkedin, "https://www.linkedin.com/company/acme");
    assert_eq!(record.profiles.crunchbase, "https://www.crunchbase.com/organization/acme");
    assert_eq!(record.profiles.pitchbook, "https://pitchbook.com/profiles/company/12345-67");

    assert_eq!(record.linkedin_data.as_ref().unwrap().data["employees"], 120);
    assert_eq!(record.pitchbook_data.as_ref().unwrap().data["name"], "Acme Inc.");

    let analysis = &record.funding_analysis;
    assert_eq!(analysis.total_raised, 25_000_000.0);
    assert_eq!(analysis.valuation, Some(1_000_000_000.0));
    assert_eq!(
        analysis.rounds,
        vec![
            FundingRound {
                date: "2021-03-01T00:00:00".to_string(),
                amount: 5_000_000.0,
                investors: vec![Some("Seed Fund".to_string())],
            },
            FundingRound {
                date: "2022-06-15T00:00:00".to_string(),
                amount: 20_000_000.0,
                investors: vec![None],
            },
        ]
    );
    let crunchbase = record.crunchbase_data.as_ref().unwrap();
    assert_eq!(crunchbase.funding_timeline.as_ref(), Some(&analysis.rounds));

    assert_eq!(record.report.as_deref(), Some("Acme is growing."));
    assert_eq!(record.tokens_used, Some(42));

    // 2 searches + 3 profile scrapes
    let runner = runner_of(&pipeline);
    assert_eq!(runner.submitted(GOOGLE_SEARCH_SCRAPER), 2);
    assert_eq!(runner.submissions().len(), 5);
}

#[tokio::test]
async fn report_writer_receives_tagged_record() {
    let writer = MockReportWriter::new("report", 1);
    let pipeline = pipeline(full_runner(), writer);

    pipeline.research("acme.com").await.unwrap();

    let inputs = writer_inputs(&pipeline);
    assert_eq!(inputs.len(), 1);
    let data = &inputs[0];
    assert_eq!(data["domain"], "acme.com");
    assert_eq!(data["linkedin_data"]["result_type"], "linkedin");
    assert_eq!(data["crunchbase_data"]["result_type"], "crunchbase");
    assert_eq!(data["pitchbook_data"]["result_type"], "pitchbook");
    assert_eq!(data["crunchbase_data"]["funding_timeline"][0]["amount"], json!(5_000_000.0));
    assert_eq!(data["funding_analysis"]["total_raised"], json!(25_000_000.0));
    assert!(data.get("report").is_none());
}

#[tokio::test]
async fn no_profiles_found_skips_scrapes() {
    let runner = MockRunner::new()
        .on_job_matching(GOOGLE_SEARCH_SCRAPER, "company news", news_pages())
        .on_job_matching(
            GOOGLE_SEARCH_SCRAPER,
            "site:",
            profile_pages([
                "https://acme.com/",
                "https://en.wikipedia.org/wiki/Acme",
                "https://www.linkedin.com/in/jane-doe",
            ]),
        );
    let pipeline = pipeline(runner, MockReportWriter::new("thin report", 3));

    let record = pipeline.research("acme.com").await.unwrap();

    assert!(record.profiles.is_empty());
    assert!(record.linkedin_data.is_none());
    assert!(record.crunchbase_data.is_none());
    assert!(record.pitchbook_data.is_none());
    assert_eq!(record.funding_analysis.total_raised, 0.0);
    assert!(record.funding_analysis.rounds.is_empty());
    assert!(record.funding_analysis.valuation.is_none());

    let runner = runner_of(&pipeline);
    assert_eq!(runner.submissions().len(), 2);
    assert_eq!(runner.submitted(GOOGLE_SEARCH_SCRAPER), 2);
}

#[tokio::test]
async fn collecting_twice_gives_the_same_record() {
    let aggregator = Aggregator::new(SourceClient::new(full_runner()));
    let domain = Domain::parse("acme.com").unwrap();

    let first = aggregator.collect(&domain).await.unwrap();
    let second = aggregator.collect(&domain).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn successful_run_publishes_report_record() {
    let pipeline = pipeline(full_runner(), MockReportWriter::new("Acme is growing.", 42));

    let outcome = pipeline.run("acme.com").await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Report {
            domain: "acme.com".to_string(),
            generated_report: "Acme is growing.".to_string(),
            tokens_used: 42,
        }
    );
    assert_eq!(pipeline.publisher().published(), vec![outcome.clone()]);
    assert_eq!(
        serde_json::to_value(&outcome).unwrap(),
        json!({ "domain": "acme.com", "generated_report": "Acme is growing.", "tokens_used": 42 })
    );
}

#[tokio::test]
async fn invalid_domain_publishes_error_without_jobs() {
    let pipeline = pipeline(full_runner(), MockReportWriter::new("unused", 0));

    let outcome = pipeline.run("not a domain").await.unwrap();

    let published = pipeline.publisher().published();
    assert_eq!(published.len(), 1);
    match &published[0] {
        RunOutcome::Error { status, message } => {
            assert_eq!(*status, "error");
            assert!(message.contains("Invalid domain"), "message: {message}");
        }
        other => panic!("expected error outcome, got {other:?}"),
    }
    assert!(outcome.is_error());
    assert!(runner_of(&pipeline).submissions().is_empty());
    assert!(writer_inputs(&pipeline).is_empty());
}

#[tokio::test]
async fn empty_domain_is_rejected() {
    let pipeline = pipeline(full_runner(), MockReportWriter::new("unused", 0));

    let outcome = pipeline.run("   ").await.unwrap();

    assert!(outcome.is_error());
    assert!(runner_of(&pipeline).submissions().is_empty());
}

#[tokio::test]
async fn refused_scrape_becomes_error_outcome() {
    let runner = full_runner().refuse(PITCHBOOK_COMPANY_SCRAPER);
    let pipeline = pipeline(runner, MockReportWriter::new("unused", 0));

    let outcome = pipeline.run("acme.com").await.unwrap();

    match outcome {
        RunOutcome::Error { message, .. } => {
            assert!(message.contains(PITCHBOOK_COMPANY_SCRAPER), "message: {message}");
        }
        other => panic!("expected error outcome, got {other:?}"),
    }
    assert!(writer_inputs(&pipeline).is_empty());
    assert_eq!(pipeline.publisher().published().len(), 1);
}

#[tokio::test]
async fn report_failure_becomes_error_outcome() {
    let pipeline = pipeline(full_runner(), MockReportWriter::failing("model overloaded"));

    let outcome = pipeline.run("acme.com").await.unwrap();

    assert_eq!(outcome, RunOutcome::error("model overloaded"));
    assert_eq!(pipeline.publisher().published(), vec![outcome]);
}

#[tokio::test]
async fn legacy_mode_sanitizes_acyclic_record_identically() {
    let strict = pipeline(full_runner(), MockReportWriter::new("r", 1));
    let legacy = pipeline(full_runner(), MockReportWriter::new("r", 1))
        .with_sanitize_mode(SanitizeMode::Legacy);

    strict.research("acme.com").await.unwrap();
    legacy.research("acme.com").await.unwrap();

    assert_eq!(writer_inputs(&strict), writer_inputs(&legacy));
}
