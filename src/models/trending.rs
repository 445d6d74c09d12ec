use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-query search counter shown in the trending panel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingEntry {
    /// Exact query text the counter is keyed by
    pub search_term: String,
    pub count: u64,
    /// Catalog id of the first result when the entry was created
    pub movie_id: u64,
    pub poster_url: String,
    #[serde(default)]
    pub last_searched_at: Option<DateTime<Utc>>,
}

/// Sorts entries by descending count, breaking ties by search term so the
/// order is stable across stores.
pub fn rank_entries(entries: &mut [TrendingEntry]) {
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.search_term.cmp(&b.search_term))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(term: &str, count: u64) -> TrendingEntry {
        TrendingEntry {
            search_term: term.to_string(),
            count,
            movie_id: 1,
            poster_url: String::new(),
            last_searched_at: None,
        }
    }

    #[test]
    fn test_rank_entries_descending_count() {
        let mut entries = vec![entry("alien", 1), entry("batman", 5), entry("heat", 3)];
        rank_entries(&mut entries);
        let terms: Vec<_> = entries.iter().map(|e| e.search_term.as_str()).collect();
        assert_eq!(terms, vec!["batman", "heat", "alien"]);
    }

    #[test]
    fn test_rank_entries_ties_by_term() {
        let mut entries = vec![entry("zodiac", 2), entry("alien", 2)];
        rank_entries(&mut entries);
        assert_eq!(entries[0].search_term, "alien");
    }
}
