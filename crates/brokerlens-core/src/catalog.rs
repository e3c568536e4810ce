//! In-memory catalog of canonical broker records.
//!
//! Built once from raw records; all lookups and views borrow from it.

use tracing::info;

use crate::normalize::normalize_all;
use crate::ranking::{self, DEFAULT_RISKY_LIMIT, RECOMMEND_MIN_SCORE, SECTION_LIMIT, TOP_LIMIT};
use crate::record::{BrokerRecord, RawBrokerRecord};
use crate::slug::broker_name_to_slug;

/// Normalised broker records in their original order.
#[derive(Debug, Clone, Default)]
pub struct BrokerCatalog {
    records: Vec<BrokerRecord>,
}

/// The ranked sections of the landing page.
pub struct HomeViews<'a> {
    pub top: Vec<&'a BrokerRecord>,
    /// Licensed records only, by regulation strength.
    pub best_regulated: Vec<&'a BrokerRecord>,
    pub highest_rated: Vec<&'a BrokerRecord>,
    pub most_experienced: Vec<&'a BrokerRecord>,
    pub risky: Vec<&'a BrokerRecord>,
}

impl BrokerCatalog {
    /// Normalise every raw record into a new catalog.
    pub fn from_raw(raws: &[RawBrokerRecord]) -> Self {
        let records = normalize_all(raws);
        info!(count = records.len(), "built broker catalog");
        Self { records }
    }

    pub fn from_records(records: Vec<BrokerRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[BrokerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by exact code, falling back to the slug of its name.
    pub fn find(&self, code_or_slug: &str) -> Option<&BrokerRecord> {
        self.records
            .iter()
            .find(|r| r.info.code == code_or_slug)
            .or_else(|| {
                self.records
                    .iter()
                    .find(|r| broker_name_to_slug(&r.info.name) == code_or_slug)
            })
    }

    /// Look up a record by display name (compared by slug).
    pub fn find_by_name(&self, name: &str) -> Option<&BrokerRecord> {
        self.find(&broker_name_to_slug(name))
    }

    /// Case-insensitive substring search over name, country and license text.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&BrokerRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let contains =
            |field: Option<&str>| field.is_some_and(|s| s.to_lowercase().contains(&query));

        self.records
            .iter()
            .filter(|r| {
                contains(Some(r.info.name.as_str()))
                    || contains(r.info.register_country.as_deref())
                    || contains(r.info.license_info.as_deref())
            })
            .collect()
    }

    /// Records to suggest next to `current_code`: other records scoring at
    /// least [`RECOMMEND_MIN_SCORE`], best first.
    pub fn recommended(&self, current_code: &str, count: usize) -> Vec<&BrokerRecord> {
        let mut out: Vec<&BrokerRecord> = ranking::sort_by_score(&self.records)
            .into_iter()
            .filter(|r| r.info.code != current_code && r.info.total_score >= RECOMMEND_MIN_SCORE)
            .collect();
        out.truncate(count);
        out
    }

    /// All landing-page sections.
    pub fn home(&self) -> HomeViews<'_> {
        let by_score = ranking::sort_by_score(&self.records);
        HomeViews {
            top: by_score.iter().copied().take(TOP_LIMIT).collect(),
            best_regulated: ranking::sort_by_regulation(ranking::licensed(&self.records))
                .into_iter()
                .take(SECTION_LIMIT)
                .collect(),
            highest_rated: by_score.iter().copied().take(SECTION_LIMIT).collect(),
            most_experienced: ranking::sort_by_experience(&self.records)
                .into_iter()
                .take(SECTION_LIMIT)
                .collect(),
            risky: ranking::risky_brokers(&self.records, DEFAULT_RISKY_LIMIT),
        }
    }
}
