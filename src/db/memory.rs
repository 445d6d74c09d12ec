use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::{rank_entries, TrendingEntry};
use crate::services::trending::{SearchRecord, TrendingStore};

/// Process-local trending counters, lost on restart
#[derive(Clone, Default)]
pub struct InMemoryTrendingStore {
    entries: Arc<RwLock<HashMap<String, TrendingEntry>>>,
}

impl InMemoryTrendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TrendingStore for InMemoryTrendingStore {
    async fn record_search(&self, record: &SearchRecord) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let now = Utc::now();

        entries
            .entry(record.search_term.clone())
            .and_modify(|entry| {
                entry.count += 1;
                entry.last_searched_at = Some(now);
            })
            .or_insert_with(|| TrendingEntry {
                search_term: record.search_term.clone(),
                count: 1,
                movie_id: record.movie_id,
                poster_url: record.poster_url.clone(),
                last_searched_at: Some(now),
            });

        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>> {
        let entries = self.entries.read().await;
        let mut ranked: Vec<TrendingEntry> = entries.values().cloned().collect();
        rank_entries(&mut ranked);
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn record(term: &str, movie_id: u64) -> SearchRecord {
        SearchRecord {
            search_term: term.to_string(),
            movie_id,
            poster_url: format!("https://img/{}.jpg", movie_id),
        }
    }

    #[tokio::test]
    async fn test_first_search_creates_entry() {
        let store = InMemoryTrendingStore::new();
        assert_ok!(store.record_search(&record("bat", 268)).await);

        let entries = store.top_trending(5).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, 1);
        assert_eq!(entries[0].movie_id, 268);
        assert_eq!(entries[0].poster_url, "https://img/268.jpg");
    }

    #[tokio::test]
    async fn test_repeat_search_increments_and_keeps_first_poster() {
        let store = InMemoryTrendingStore::new();
        assert_ok!(store.record_search(&record("bat", 268)).await);
        assert_ok!(store.record_search(&record("bat", 414)).await);

        let entries = store.top_trending(5).await.unwrap();
        assert_eq!(entries[0].count, 2);
        assert_eq!(entries[0].movie_id, 268);
    }

    #[tokio::test]
    async fn test_terms_are_exact() {
        let store = InMemoryTrendingStore::new();
        assert_ok!(store.record_search(&record("Bat", 1)).await);
        assert_ok!(store.record_search(&record("bat", 1)).await);

        assert_eq!(store.top_trending(5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_top_trending_orders_and_limits() {
        let store = InMemoryTrendingStore::new();
        for _ in 0..3 {
            assert_ok!(store.record_search(&record("heat", 949)).await);
        }
        assert_ok!(store.record_search(&record("alien", 348)).await);
        for _ in 0..2 {
            assert_ok!(store.record_search(&record("ronin", 8195)).await);
        }

        let entries = store.top_trending(2).await.unwrap();
        let terms: Vec<_> = entries.iter().map(|e| e.search_term.as_str()).collect();
        assert_eq!(terms, vec!["heat", "ronin"]);
    }
}
