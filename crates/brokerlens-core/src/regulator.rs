//! Regulator extraction from free-text license descriptions.
//!
//! License text looks like "ASIC Regulated, CYSEC Regulated" or
//! "Authorised by the FCA (FRN 123456)". Known regulator tokens are matched
//! on ASCII word boundaries, case-insensitively, and reported in table order.
//!
//! # Weights
//!
//! Each regulator carries a fixed severity weight in `[30, 100]` used by the
//! regulation ranking: FCA 100 at the top, the generic `Regulated` sentinel
//! at 30, unknown codes at 0.

use once_cell::sync::Lazy;
use regex::RegexSet;

/// A recognised regulatory body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regulator {
    /// Canonical abbreviation as displayed.
    pub code: &'static str,
    /// Severity weight; higher means stricter oversight.
    pub weight: u32,
}

/// Known regulators, in match-priority order.
pub const REGULATORS: &[Regulator] = &[
    Regulator { code: "FCA", weight: 100 },
    Regulator { code: "ASIC", weight: 95 },
    Regulator { code: "CySEC", weight: 90 },
    Regulator { code: "SVFSC", weight: 80 },
    Regulator { code: "DFSA", weight: 85 },
    Regulator { code: "SC", weight: 70 },
    Regulator { code: "MAS", weight: 80 },
    Regulator { code: "FSCA", weight: 75 },
    Regulator { code: "NFA", weight: 75 },
    Regulator { code: "SEA", weight: 70 },
    Regulator { code: "BVI", weight: 55 },
    Regulator { code: "FSP", weight: 65 },
    Regulator { code: "FNRA", weight: 45 },
    Regulator { code: "iFSC", weight: 60 },
    Regulator { code: "VFSC", weight: 60 },
    Regulator { code: "SFC", weight: 85 },
    Regulator { code: "BaFin", weight: 85 },
    Regulator { code: "FCMC", weight: 50 },
];

/// Code reported when license text is present but names no known regulator.
pub const UNRECOGNIZED: &str = "Regulated";

/// Weight of the [`UNRECOGNIZED`] sentinel.
pub const UNRECOGNIZED_WEIGHT: u32 = 30;

/// One case-insensitive, ASCII-word-bounded pattern per [`REGULATORS`] entry.
///
/// ASCII boundaries keep "FCA監管" matching: CJK text counts as a boundary.
static PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(
        REGULATORS
            .iter()
            .map(|r| format!(r"(?i)(?-u:\b){}(?-u:\b)", regex::escape(r.code))),
    )
    .expect("regulator patterns are valid")
});

/// Ordered, duplicate-free set of regulator codes found in a license text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegulatorSet {
    codes: Vec<&'static str>,
}

impl RegulatorSet {
    pub fn codes(&self) -> &[&'static str] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// True when license text was present but no regulator was recognised.
    pub fn is_unrecognized(&self) -> bool {
        self.codes == [UNRECOGNIZED]
    }

    /// Arithmetic mean of the member weights; `0.0` for an empty set.
    pub fn average_weight(&self) -> f64 {
        if self.codes.is_empty() {
            return 0.0;
        }
        let total: u32 = self.codes.iter().map(|code| regulator_weight(code)).sum();
        f64::from(total) / self.codes.len() as f64
    }
}

/// Extract the regulators named in `license`.
///
/// - `None` or `""` → empty set
/// - text naming known regulators → those codes, in [`REGULATORS`] order
/// - any other text → `["Regulated"]`
pub fn extract_regulators(license: Option<&str>) -> RegulatorSet {
    let Some(text) = license.filter(|s| !s.is_empty()) else {
        return RegulatorSet::default();
    };

    // SetMatches iterates in pattern order, so output follows table order.
    let codes: Vec<&'static str> = PATTERNS
        .matches(text)
        .into_iter()
        .map(|i| REGULATORS[i].code)
        .collect();

    if codes.is_empty() {
        RegulatorSet {
            codes: vec![UNRECOGNIZED],
        }
    } else {
        RegulatorSet { codes }
    }
}

/// Severity weight for a regulator code; `0` for unknown codes.
pub fn regulator_weight(code: &str) -> u32 {
    if code == UNRECOGNIZED {
        return UNRECOGNIZED_WEIGHT;
    }
    REGULATORS
        .iter()
        .find(|r| r.code == code)
        .map(|r| r.weight)
        .unwrap_or(0)
}

/// Join codes for display: "FCA, ASIC". An empty set reads "Unknown".
pub fn format_regulators(set: &RegulatorSet) -> String {
    if set.is_empty() {
        return "Unknown".to_string();
    }
    set.codes().join(", ")
}

/// Short license label for a record's license text.
pub fn license_display(license: Option<&str>) -> String {
    format_regulators(&extract_regulators(license))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(text: &str) -> Vec<&'static str> {
        extract_regulators(Some(text)).codes().to_vec()
    }

    #[test]
    fn table_order_not_text_order() {
        assert_eq!(codes("FCA and ASIC regulated"), ["FCA", "ASIC"]);
        assert_eq!(codes("ASIC and FCA regulated"), ["FCA", "ASIC"]);
    }

    #[test]
    fn empty_and_missing_input() {
        assert!(extract_regulators(None).is_empty());
        assert!(extract_regulators(Some("")).is_empty());
    }

    #[test]
    fn unrecognized_text_yields_sentinel() {
        let set = extract_regulators(Some("some obscure body"));
        assert_eq!(set.codes(), ["Regulated"]);
        assert!(set.is_unrecognized());
        assert_eq!(codes("   "), ["Regulated"]);
    }

    #[test]
    fn case_insensitive_with_canonical_codes() {
        assert_eq!(codes("cysec regulated"), ["CySEC"]);
        assert_eq!(codes("BAFIN, ifsc"), ["iFSC", "BaFin"]);
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(codes("FCA (UK), FCA (branch), fca"), ["FCA"]);
    }

    #[test]
    fn word_boundaries_respected() {
        // "SC" must not match inside "CYSEC", "FSCA" or "SCAM".
        assert_eq!(codes("CYSEC Regulated"), ["CySEC"]);
        assert_eq!(codes("FSCA"), ["FSCA"]);
        assert_eq!(codes("SCAMMER LTD"), ["Regulated"]);
        assert_eq!(codes("SVFSC"), ["SVFSC"]);
    }

    #[test]
    fn cjk_neighbours_count_as_boundaries() {
        assert_eq!(codes("FCA监管"), ["FCA"]);
        assert_eq!(codes("澳洲ASIC监管"), ["ASIC"]);
    }

    #[test]
    fn weights() {
        assert_eq!(regulator_weight("FCA"), 100);
        assert_eq!(regulator_weight("ASIC"), 95);
        assert_eq!(regulator_weight("FNRA"), 45);
        assert_eq!(regulator_weight("Regulated"), 30);
        assert_eq!(regulator_weight("XYZ"), 0);
    }

    #[test]
    fn every_regulator_weight_in_range() {
        for r in REGULATORS {
            assert!((30..=100).contains(&r.weight), "{} out of range", r.code);
        }
    }

    #[test]
    fn average_weight() {
        let set = extract_regulators(Some("FCA, ASIC"));
        assert_eq!(set.average_weight(), 97.5);
        assert_eq!(extract_regulators(Some("none")).average_weight(), 30.0);
        assert_eq!(RegulatorSet::default().average_weight(), 0.0);
    }

    #[test]
    fn display_strings() {
        assert_eq!(license_display(Some("ASIC, FCA")), "FCA, ASIC");
        assert_eq!(license_display(Some("MAS")), "MAS");
        assert_eq!(license_display(None), "Unknown");
        assert_eq!(license_display(Some("offshore")), "Regulated");
    }
}
