//! Ordered and filtered views over canonical broker records.
//!
//! Every view takes borrowed records (a slice or an earlier view) and uses a
//! stable sort, so records with identical keys keep their original relative
//! order. Floating-point
//! keys that cannot be compared are treated as equal.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::BrokerRecord;
use crate::regulator::extract_regulators;

/// Records scoring below this are part of the risk view.
pub const RISK_SCORE_THRESHOLD: f64 = 5.0;

/// Default size of the risk view.
pub const DEFAULT_RISKY_LIMIT: usize = 8;

/// Minimum score for a record to be recommended alongside another.
pub const RECOMMEND_MIN_SCORE: f64 = 6.0;

/// Size of the headline "top brokers" list.
pub const TOP_LIMIT: usize = 10;

/// Size of each themed home-page section.
pub const SECTION_LIMIT: usize = 5;

/// "15-20 years"
static RANGE_YEARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)\s*years?").expect("Invalid range-years regex"));

/// "15+ years" or "15 years"
static SINGLE_YEARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*\+?\s*years?").expect("Invalid single-years regex"));

/// Descending comparison on floats, equal when incomparable.
fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Estimate operating years from free text.
///
/// - "X-Y years" → midpoint `(X + Y) / 2`
/// - "X+ years" or "X years" → `X`
/// - anything else → `0.0`
pub fn operating_years(period: Option<&str>) -> f64 {
    let Some(period) = period else {
        return 0.0;
    };
    let period = period.trim().to_lowercase();

    if let Some(caps) = RANGE_YEARS.captures(&period) {
        let start: f64 = caps[1].parse().unwrap_or(0.0);
        let end: f64 = caps[2].parse().unwrap_or(0.0);
        return (start + end) / 2.0;
    }
    if let Some(caps) = SINGLE_YEARS.captures(&period) {
        return caps[1].parse().unwrap_or(0.0);
    }
    0.0
}

/// True when the record carries non-blank license text.
pub fn has_license(record: &BrokerRecord) -> bool {
    record
        .info
        .license_info
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty())
}

/// Records with license text, in input order.
pub fn licensed<'a>(records: impl IntoIterator<Item = &'a BrokerRecord>) -> Vec<&'a BrokerRecord> {
    records.into_iter().filter(|r| has_license(r)).collect()
}

/// Descending by score.
pub fn sort_by_score<'a>(records: impl IntoIterator<Item = &'a BrokerRecord>) -> Vec<&'a BrokerRecord> {
    let mut out: Vec<&BrokerRecord> = records.into_iter().collect();
    out.sort_by(|a, b| desc(a.info.total_score, b.info.total_score));
    out
}

/// Regulation strength ranking.
///
/// 1. More distinct regulators first
/// 2. Higher average regulator weight
/// 3. Higher score
pub fn sort_by_regulation<'a>(
    records: impl IntoIterator<Item = &'a BrokerRecord>,
) -> Vec<&'a BrokerRecord> {
    let mut keyed: Vec<(usize, f64, &BrokerRecord)> = records
        .into_iter()
        .map(|r| {
            let regulators = extract_regulators(r.info.license_info.as_deref());
            (regulators.len(), regulators.average_weight(), r)
        })
        .collect();

    keyed.sort_by(|(a_count, a_weight, a), (b_count, b_weight, b)| {
        b_count
            .cmp(a_count)
            .then_with(|| desc(*a_weight, *b_weight))
            .then_with(|| desc(a.info.total_score, b.info.total_score))
    });
    keyed.into_iter().map(|(_, _, r)| r).collect()
}

/// Experience ranking: longer operating history first, then higher score.
pub fn sort_by_experience<'a>(
    records: impl IntoIterator<Item = &'a BrokerRecord>,
) -> Vec<&'a BrokerRecord> {
    let mut keyed: Vec<(f64, &BrokerRecord)> = records
        .into_iter()
        .map(|r| (operating_years(r.info.operating_period.as_deref()), r))
        .collect();

    keyed.sort_by(|(a_years, a), (b_years, b)| {
        desc(*a_years, *b_years).then_with(|| desc(a.info.total_score, b.info.total_score))
    });
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// The risk view: low-scoring or unlicensed records, riskiest first.
///
/// Unlicensed records come before licensed ones; within each group the
/// lowest score comes first. At most `limit` records are returned.
pub fn risky_brokers<'a>(
    records: impl IntoIterator<Item = &'a BrokerRecord>,
    limit: usize,
) -> Vec<&'a BrokerRecord> {
    let mut risky: Vec<(bool, &BrokerRecord)> = records
        .into_iter()
        .map(|r| (has_license(r), r))
        .filter(|(has, r)| !has || r.info.total_score < RISK_SCORE_THRESHOLD)
        .collect();

    risky.sort_by(|(a_licensed, a), (b_licensed, b)| {
        a_licensed
            .cmp(b_licensed)
            .then_with(|| desc(b.info.total_score, a.info.total_score))
    });
    risky.truncate(limit);
    risky.into_iter().map(|(_, r)| r).collect()
}

/// The three named orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Score,
    Regulation,
    Experience,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Regulation => "regulation",
            Self::Experience => "experience",
        }
    }

    pub fn apply<'a>(
        &self,
        records: impl IntoIterator<Item = &'a BrokerRecord>,
    ) -> Vec<&'a BrokerRecord> {
        match self {
            Self::Score => sort_by_score(records),
            Self::Regulation => sort_by_regulation(records),
            Self::Experience => sort_by_experience(records),
        }
    }
}

/// Headline risk classification of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBadge {
    /// Licensed and assessed safe.
    Safe,
    /// Licensed, without a positive safety assessment.
    Regulated,
    /// No license text.
    Risky,
}

impl RiskBadge {
    pub fn for_record(record: &BrokerRecord) -> Self {
        let is_safe = record.safe.as_ref().is_some_and(|s| s.is_safe);
        match (has_license(record), is_safe) {
            (true, true) => Self::Safe,
            (true, false) => Self::Regulated,
            (false, _) => Self::Risky,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Regulated => "Regulated",
            Self::Risky => "Risky",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BrokerInfo, SafetyInfo};

    fn broker(code: &str, score: f64, license: Option<&str>, period: Option<&str>) -> BrokerRecord {
        BrokerRecord {
            info: BrokerInfo {
                code: code.into(),
                name: code.to_uppercase(),
                total_score: score,
                license_info: license.map(Into::into),
                operating_period: period.map(Into::into),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn codes(view: &[&BrokerRecord]) -> Vec<String> {
        view.iter().map(|r| r.info.code.clone()).collect()
    }

    // ── Operating years ──

    #[test]
    fn operating_years_range_midpoint() {
        assert_eq!(operating_years(Some("15-20 years")), 17.5);
        assert_eq!(operating_years(Some("5 - 10 Years")), 7.5);
    }

    #[test]
    fn operating_years_single_value() {
        assert_eq!(operating_years(Some("15+ years")), 15.0);
        assert_eq!(operating_years(Some("3 year")), 3.0);
        assert_eq!(operating_years(Some("Over 12 years")), 12.0);
    }

    #[test]
    fn operating_years_unparseable_is_zero() {
        assert_eq!(operating_years(Some("since inception")), 0.0);
        assert_eq!(operating_years(Some("")), 0.0);
        assert_eq!(operating_years(None), 0.0);
    }

    // ── Score ──

    #[test]
    fn score_descending_and_stable() {
        let records = vec![
            broker("a", 7.0, None, None),
            broker("b", 9.0, None, None),
            broker("c", 7.0, None, None),
        ];
        assert_eq!(codes(&sort_by_score(&records)), ["b", "a", "c"]);
    }

    #[test]
    fn empty_input_yields_empty_views() {
        let none: Vec<BrokerRecord> = Vec::new();
        assert!(sort_by_score(&none).is_empty());
        assert!(sort_by_regulation(&none).is_empty());
        assert!(sort_by_experience(&none).is_empty());
        assert!(risky_brokers(&none, DEFAULT_RISKY_LIMIT).is_empty());
    }

    // ── Regulation ──

    #[test]
    fn regulation_count_first() {
        let records = vec![
            broker("one", 9.9, Some("FCA"), None),
            broker("two", 5.0, Some("ASIC, CYSEC"), None),
        ];
        assert_eq!(codes(&sort_by_regulation(&records)), ["two", "one"]);
    }

    #[test]
    fn regulation_weight_breaks_count_tie() {
        let records = vec![
            broker("asic", 9.0, Some("ASIC Regulated"), None),
            broker("fca", 6.0, Some("FCA Regulated"), None),
        ];
        assert_eq!(codes(&sort_by_regulation(&records)), ["fca", "asic"]);
    }

    #[test]
    fn regulation_score_breaks_weight_tie() {
        let records = vec![
            broker("low", 6.0, Some("DFSA"), None),
            broker("high", 8.0, Some("BaFin"), None),
        ];
        assert_eq!(codes(&sort_by_regulation(&records)), ["high", "low"]);
    }

    #[test]
    fn regulation_sentinel_ranks_with_single_regulator_count() {
        // "Regulated" counts as one regulator with weight 30; no license counts zero.
        let records = vec![
            broker("none", 9.0, None, None),
            broker("vague", 4.0, Some("licensed offshore"), None),
            broker("fnra", 3.0, Some("FNRA"), None),
        ];
        assert_eq!(codes(&sort_by_regulation(&records)), ["fnra", "vague", "none"]);
    }

    // ── Experience ──

    #[test]
    fn experience_years_then_score() {
        let records = vec![
            broker("unknown", 9.5, None, Some("n/a")),
            broker("mid", 6.0, None, Some("15+ years")),
            broker("long", 5.0, None, Some("15-20 years")),
            broker("mid_hi", 8.0, None, Some("15 years")),
        ];
        assert_eq!(
            codes(&sort_by_experience(&records)),
            ["long", "mid_hi", "mid", "unknown"]
        );
    }

    // ── Risk view ──

    #[test]
    fn risky_unlicensed_before_low_score() {
        let records = vec![
            broker("low", 4.9, Some("FCA"), None),
            broker("nolicense", 8.0, None, None),
        ];
        assert_eq!(codes(&risky_brokers(&records, 8)), ["nolicense", "low"]);
    }

    #[test]
    fn risky_filters_and_orders_by_score_within_group() {
        let records = vec![
            broker("good", 8.0, Some("ASIC"), None),
            broker("blank_hi", 7.0, Some("   "), None),
            broker("low_b", 4.0, Some("MAS"), None),
            broker("blank_lo", 2.0, None, None),
            broker("low_a", 1.0, Some("SFC"), None),
            broker("edge", 5.0, Some("FSCA"), None),
        ];
        assert_eq!(
            codes(&risky_brokers(&records, 8)),
            ["blank_lo", "blank_hi", "low_a", "low_b"]
        );
    }

    #[test]
    fn risky_truncates_to_limit() {
        let records: Vec<BrokerRecord> = (0..12)
            .map(|i| broker(&format!("b{i}"), f64::from(i) / 10.0, None, None))
            .collect();
        let view = risky_brokers(&records, DEFAULT_RISKY_LIMIT);
        assert_eq!(view.len(), 8);
        assert_eq!(view[0].info.code, "b0");
        assert!(risky_brokers(&records, 0).is_empty());
    }

    // ── Helpers ──

    #[test]
    fn licensed_filter() {
        let records = vec![
            broker("a", 1.0, Some("FCA"), None),
            broker("b", 1.0, Some(""), None),
            broker("c", 1.0, None, None),
        ];
        assert_eq!(codes(&licensed(&records)), ["a"]);
    }

    #[test]
    fn sort_order_dispatch() {
        let records = vec![
            broker("fca", 5.0, Some("FCA"), Some("2 years")),
            broker("old", 9.0, None, Some("30 years")),
        ];
        assert_eq!(codes(&SortOrder::Score.apply(&records)), ["old", "fca"]);
        assert_eq!(codes(&SortOrder::Regulation.apply(&records)), ["fca", "old"]);
        assert_eq!(codes(&SortOrder::Experience.apply(&records)), ["old", "fca"]);
        assert_eq!(SortOrder::Regulation.as_str(), "regulation");
    }

    #[test]
    fn risk_badges() {
        let mut safe = broker("s", 8.0, Some("FCA"), None);
        safe.safe = Some(SafetyInfo {
            is_safe: true,
            reasons: vec![],
        });
        let regulated = broker("r", 8.0, Some("FCA"), None);
        let mut risky = broker("x", 8.0, None, None);
        risky.safe = safe.safe.clone();

        assert_eq!(RiskBadge::for_record(&safe), RiskBadge::Safe);
        assert_eq!(RiskBadge::for_record(&regulated), RiskBadge::Regulated);
        assert_eq!(RiskBadge::for_record(&risky), RiskBadge::Risky);
        assert_eq!(RiskBadge::Risky.as_str(), "Risky");
    }
}
