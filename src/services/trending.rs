//! Trending search counters
//!
//! Every non-empty search that returns at least one movie bumps a counter
//! keyed by the exact query text. The trending panel reads the top entries
//! back by descending count. Neither direction is allowed to disturb the
//! search flow: failures are logged at the call site and swallowed.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    error::AppResult,
    models::{MovieSummary, TrendingEntry},
};

/// One increment request for the counter store
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    pub search_term: String,
    pub movie_id: u64,
    pub poster_url: String,
}

impl SearchRecord {
    /// Builds the record for a query from the first movie it returned
    pub fn from_first_result(search_term: &str, movie: &MovieSummary, image_base: &str) -> Self {
        Self {
            search_term: search_term.to_string(),
            movie_id: movie.id,
            poster_url: movie.poster_url(image_base).unwrap_or_default(),
        }
    }
}

/// Storage for per-query search counters
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrendingStore: Send + Sync {
    /// Increments the counter for `record.search_term`, creating it with a
    /// count of 1 and the record's movie and poster if it does not exist.
    async fn record_search(&self, record: &SearchRecord) -> AppResult<()>;

    /// Returns at most `limit` entries ordered by descending count
    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Records a search on a detached task.
///
/// The caller never observes the outcome; errors stop at this task.
pub fn spawn_record_search(store: Arc<dyn TrendingStore>, record: SearchRecord) -> JoinHandle<()> {
    tokio::spawn(async move {
        match store.record_search(&record).await {
            Ok(()) => tracing::debug!(
                search_term = %record.search_term,
                movie_id = record.movie_id,
                store = store.name(),
                "Trending counter updated"
            ),
            Err(e) => tracing::error!(
                error = %e,
                search_term = %record.search_term,
                store = store.name(),
                "Failed to update trending counter"
            ),
        }
    })
}

/// Loads the trending panel. A failing store yields an empty panel.
pub async fn load_trending_panel(store: &dyn TrendingStore, limit: usize) -> Vec<TrendingEntry> {
    match store.top_trending(limit).await {
        Ok(entries) => {
            tracing::debug!(count = entries.len(), store = store.name(), "Trending panel loaded");
            entries
        }
        Err(e) => {
            tracing::error!(error = %e, store = store.name(), "Error fetching trending movies");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn batman() -> MovieSummary {
        MovieSummary {
            id: 268,
            title: "Batman".to_string(),
            poster_path: Some("/bat.jpg".to_string()),
            popularity: 10.0,
            vote_average: None,
            original_language: None,
            release_date: None,
        }
    }

    #[test]
    fn test_search_record_from_first_result() {
        let record = SearchRecord::from_first_result("bat", &batman(), "https://img/w500");
        assert_eq!(record.search_term, "bat");
        assert_eq!(record.movie_id, 268);
        assert_eq!(record.poster_url, "https://img/w500/bat.jpg");
    }

    #[test]
    fn test_search_record_without_poster() {
        let mut movie = batman();
        movie.poster_path = None;
        let record = SearchRecord::from_first_result("bat", &movie, "https://img/w500");
        assert_eq!(record.poster_url, "");
    }

    #[tokio::test]
    async fn test_load_trending_panel_swallows_errors() {
        let mut store = MockTrendingStore::new();
        store
            .expect_top_trending()
            .returning(|_| Err(AppError::Internal("store offline".to_string())));
        store.expect_name().return_const("mock");

        let entries = load_trending_panel(&store, 5).await;
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_load_trending_panel_passes_limit() {
        let mut store = MockTrendingStore::new();
        store
            .expect_top_trending()
            .withf(|limit| *limit == 3)
            .times(1)
            .returning(|_| {
                Ok(vec![TrendingEntry {
                    search_term: "heat".to_string(),
                    count: 4,
                    movie_id: 949,
                    poster_url: "https://img/heat.jpg".to_string(),
                    last_searched_at: None,
                }])
            });
        store.expect_name().return_const("mock");

        let entries = load_trending_panel(&store, 3).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].search_term, "heat");
    }

    #[tokio::test]
    async fn test_spawn_record_search_isolates_failure() {
        let mut store = MockTrendingStore::new();
        store
            .expect_record_search()
            .times(1)
            .returning(|_| Err(AppError::Internal("write refused".to_string())));
        store.expect_name().return_const("mock");

        let record = SearchRecord::from_first_result("bat", &batman(), "https://img");
        let handle = spawn_record_search(Arc::new(store), record);

        // The task completes normally even though the store failed
        assert!(handle.await.is_ok());
    }
}
