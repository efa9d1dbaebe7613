//! Funding round normalization into a chronological timeline.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use research_common::{FundingAnalysis, FundingRound};

const ANNOUNCED_ON_FORMAT: &str = "%Y-%m-%d";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Convert `funding_rounds_list` into rounds sorted by date. Rounds with a
/// missing or unparseable date, or an amount that is not a non-negative
/// number, are skipped.
pub fn funding_timeline(data: &Map<String, Value>) -> Vec<FundingRound> {
    let Some(rounds) = data.get("funding_rounds_list").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut timeline: Vec<FundingRound> = rounds.iter().filter_map(parse_round).collect();
    timeline.sort_by(|a, b| a.date.cmp(&b.date));
    timeline
}

fn parse_round(round: &Value) -> Option<FundingRound> {
    let announced_on = round.get("announced_on")?.as_str()?;
    let date = NaiveDate::parse_from_str(announced_on, ANNOUNCED_ON_FORMAT)
        .ok()?
        .and_hms_opt(0, 0, 0)?
        .format(ISO_FORMAT)
        .to_string();

    let amount = match round.get("money_raised") {
        None => 0.0,
        Some(Value::Object(money)) => match money.get("value_usd") {
            None => 0.0,
            Some(value) => coerce_amount(value)?,
        },
        Some(_) => return None,
    };

    let investors = match round.get("lead_investors") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(leads)) => leads.iter().map(investor_name).collect(),
        Some(_) => return None,
    };

    Some(FundingRound {
        date,
        amount,
        investors,
    })
}

fn investor_name(lead: &Value) -> Option<String> {
    match lead.get("names")? {
        Value::Null => None,
        Value::String(name) => Some(name.clone()),
        other => Some(other.to_string()),
    }
}

/// Numbers and numeric strings; anything else, negative or non-finite is
/// rejected.
fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

/// Optional `valuation.value_usd` from a Crunchbase payload.
pub fn valuation(data: &Map<String, Value>) -> Option<f64> {
    data.get("valuation")?.get("value_usd").and_then(coerce_amount)
}

pub fn summarize(rounds: Vec<FundingRound>, valuation: Option<f64>) -> FundingAnalysis {
    FundingAnalysis {
        total_raised: rounds.iter().map(|r| r.amount).sum(),
        rounds,
        valuation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn malformed_round_is_dropped() {
        let timeline = funding_timeline(&data(json!({
            "funding_rounds_list": [
                {
                    "announced_on": "2021-05-01",
                    "money_raised": { "value_usd": "1000000" },
                    "lead_investors": [{ "names": "A" }]
                },
                {
                    "announced_on": "bad-date",
                    "money_raised": { "value_usd": 5 },
                    "lead_investors": [{ "names": "B" }]
                }
            ]
        })));

        assert_eq!(
            timeline,
            vec![FundingRound {
                date: "2021-05-01T00:00:00".to_string(),
                amount: 1_000_000.0,
                investors: vec![Some("A".to_string())],
            }]
        );
    }

    #[test]
    fn rounds_are_sorted_by_date() {
        let timeline = funding_timeline(&data(json!({
            "funding_rounds_list": [
                { "announced_on": "2023-01-15", "money_raised": { "value_usd": 3 } },
                { "announced_on": "2019-07-30", "money_raised": { "value_usd": 1 } },
                { "announced_on": "2021-11-02", "money_raised": { "value_usd": 2 } }
            ]
        })));

        let dates: Vec<&str> = timeline.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2019-07-30T00:00:00", "2021-11-02T00:00:00", "2023-01-15T00:00:00"]
        );
        assert!(timeline.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn missing_amount_defaults_to_zero() {
        let timeline = funding_timeline(&data(json!({
            "funding_rounds_list": [
                { "announced_on": "2020-02-02" },
                { "announced_on": "2020-03-03", "money_raised": {} }
            ]
        })));

        assert_eq!(timeline.len(), 2);
        assert!(timeline.iter().all(|r| r.amount == 0.0 && r.investors.is_empty()));
    }

    #[test]
    fn bad_amounts_and_dates_are_dropped() {
        let timeline = funding_timeline(&data(json!({
            "funding_rounds_list": [
                { "money_raised": { "value_usd": 10 } },
                { "announced_on": null },
                { "announced_on": "2020-13-01" },
                { "announced_on": "2020-01-01", "money_raised": { "value_usd": "lots" } },
                { "announced_on": "2020-01-02", "money_raised": { "value_usd": null } },
                { "announced_on": "2020-01-03", "money_raised": { "value_usd": -5 } },
                { "announced_on": "2020-01-04", "money_raised": "1000" },
                { "announced_on": "2020-01-05", "money_raised": { "value_usd": 7.5 } }
            ]
        })));

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].date, "2020-01-05T00:00:00");
        assert_eq!(timeline[0].amount, 7.5);
    }

    #[test]
    fn unresolved_investors_are_kept() {
        let timeline = funding_timeline(&data(json!({
            "funding_rounds_list": [{
                "announced_on": "2022-06-01",
                "lead_investors": [{ "names": "Sequoia" }, {}, { "names": null }]
            }]
        })));

        assert_eq!(
            timeline[0].investors,
            vec![Some("Sequoia".to_string()), None, None]
        );
    }

    #[test]
    fn no_rounds_list_is_empty() {
        assert!(funding_timeline(&Map::new()).is_empty());
        assert!(funding_timeline(&data(json!({ "funding_rounds_list": null }))).is_empty());
    }

    #[test]
    fn valuation_is_optional() {
        assert_eq!(valuation(&data(json!({ "valuation": { "value_usd": "2500000000" } }))), Some(2.5e9));
        assert_eq!(valuation(&data(json!({ "valuation": {} }))), None);
        assert_eq!(valuation(&Map::new()), None);
    }

    #[test]
    fn summary_totals_amounts() {
        let rounds = vec![
            FundingRound { date: "2020-01-01T00:00:00".into(), amount: 1.5, investors: vec![] },
            FundingRound { date: "2021-01-01T00:00:00".into(), amount: 2.5, investors: vec![] },
        ];
        let analysis = summarize(rounds, None);
        assert_eq!(analysis.total_raised, 4.0);
        assert_eq!(analysis.rounds.len(), 2);
        assert!(analysis.valuation.is_none());
    }
}
