//! Size-based filters over a cached result set.

use serde::{Deserialize, Serialize};

use crate::searcher::SearchResult;

const GIB: u64 = 1024 * 1024 * 1024;

/// A size threshold the user can narrow a result list with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeFilter {
    LessThan2Gb,
    MoreThan4Gb,
    MoreThan10Gb,
}

impl SizeFilter {
    /// All filters in the order they are offered.
    pub const ALL: [SizeFilter; 3] = [
        SizeFilter::LessThan2Gb,
        SizeFilter::MoreThan4Gb,
        SizeFilter::MoreThan10Gb,
    ];

    pub fn command(&self) -> &'static str {
        match self {
            SizeFilter::LessThan2Gb => "filter_less_size_2",
            SizeFilter::MoreThan4Gb => "filter_more_size_4",
            SizeFilter::MoreThan10Gb => "filter_more_size_10",
        }
    }

    pub fn from_command(command: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.command() == command)
    }

    /// Whether a result qualifies. Results without a size never do.
    pub fn matches(&self, result: &SearchResult) -> bool {
        let Some(size) = result.size_bytes else {
            return false;
        };
        match self {
            SizeFilter::LessThan2Gb => size < 2 * GIB,
            SizeFilter::MoreThan4Gb => size > 4 * GIB,
            SizeFilter::MoreThan10Gb => size > 10 * GIB,
        }
    }
}

/// A filter offered to the user for one cached result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterAffordance {
    pub filter: SizeFilter,
    pub label: String,
    /// Opaque callback payload, `<filter command>:<fingerprint>`.
    pub command: String,
}

impl FilterAffordance {
    pub fn new(filter: SizeFilter, fingerprint: &str) -> Self {
        Self {
            filter,
            label: crate::messages::filter_button(filter).to_string(),
            command: format!("{}:{}", filter.command(), fingerprint),
        }
    }

    /// Split callback data back into filter and fingerprint.
    pub fn parse_command(data: &str) -> Option<(SizeFilter, &str)> {
        let (command, fingerprint) = data.split_once(':')?;
        let filter = SizeFilter::from_command(command)?;
        if fingerprint.is_empty() {
            return None;
        }
        Some((filter, fingerprint))
    }
}

/// Filters that would split `results` into a non-empty proper subset.
pub fn suggest_filters(results: &[SearchResult], fingerprint: &str) -> Vec<FilterAffordance> {
    SizeFilter::ALL
        .into_iter()
        .filter(|filter| {
            let matching = results.iter().filter(|r| filter.matches(r)).count();
            matching > 0 && matching < results.len()
        })
        .map(|filter| FilterAffordance::new(filter, fingerprint))
        .collect()
}

/// Subset of `results` passing `filter`, in the original order.
pub fn apply_filter(results: &[SearchResult], filter: SizeFilter) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}
