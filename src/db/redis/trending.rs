use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use redis::Client;

use crate::error::AppResult;
use crate::models::{rank_entries, TrendingEntry};
use crate::services::trending::{SearchRecord, TrendingStore};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrendingKey {
    /// Sorted set of search terms scored by search count
    Counts,
    /// Hash holding the movie and poster captured for one search term
    Entry(String),
}

impl Display for TrendingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendingKey::Counts => write!(f, "trending:counts"),
            TrendingKey::Entry(term) => write!(f, "trending:entry:{}", term),
        }
    }
}

/// Trending counters kept in Redis.
///
/// Counts live in one sorted set so the top-N read is a single range query;
/// the first movie and poster seen for a term are written once with HSETNX.
#[derive(Clone)]
pub struct RedisTrendingStore {
    redis_client: Client,
}

impl RedisTrendingStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Builds an entry from a term, its score and its hash fields
    fn entry_from_fields(
        search_term: String,
        score: f64,
        fields: &HashMap<String, String>,
    ) -> TrendingEntry {
        TrendingEntry {
            search_term,
            count: score.max(0.0) as u64,
            movie_id: fields
                .get("movie_id")
                .and_then(|id| id.parse().ok())
                .unwrap_or_default(),
            poster_url: fields.get("poster_url").cloned().unwrap_or_default(),
            last_searched_at: fields
                .get("last_searched_at")
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc)),
        }
    }
}

#[async_trait::async_trait]
impl TrendingStore for RedisTrendingStore {
    async fn record_search(&self, record: &SearchRecord) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let entry_key = TrendingKey::Entry(record.search_term.clone()).to_string();

        let _: () = redis::pipe()
            .atomic()
            .zincr(TrendingKey::Counts.to_string(), &record.search_term, 1)
            .ignore()
            .hset_nx(&entry_key, "movie_id", record.movie_id)
            .ignore()
            .hset_nx(&entry_key, "poster_url", &record.poster_url)
            .ignore()
            .hset(&entry_key, "last_searched_at", Utc::now().to_rfc3339())
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let ranked: Vec<(String, f64)> = conn
            .zrevrange_withscores(TrendingKey::Counts.to_string(), 0, limit as isize - 1)
            .await?;

        let mut entries = Vec::with_capacity(ranked.len());
        for (search_term, score) in ranked {
            let fields: HashMap<String, String> = conn
                .hgetall(TrendingKey::Entry(search_term.clone()).to_string())
                .await?;
            entries.push(Self::entry_from_fields(search_term, score, &fields));
        }

        rank_entries(&mut entries);
        Ok(entries)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::redis::create_redis_client;

    #[test]
    fn test_trending_key_display_counts() {
        assert_eq!(format!("{}", TrendingKey::Counts), "trending:counts");
    }

    #[test]
    fn test_trending_key_display_entry_keeps_exact_term() {
        let key = TrendingKey::Entry("The Dark Knight".to_string());
        assert_eq!(format!("{}", key), "trending:entry:The Dark Knight");
    }

    #[test]
    fn test_entry_from_fields() {
        let mut fields = HashMap::new();
        fields.insert("movie_id".to_string(), "155".to_string());
        fields.insert("poster_url".to_string(), "https://img/tdk.jpg".to_string());
        fields.insert(
            "last_searched_at".to_string(),
            "2026-10-17T12:00:00+00:00".to_string(),
        );

        let entry = RedisTrendingStore::entry_from_fields("dark knight".to_string(), 3.0, &fields);
        assert_eq!(entry.count, 3);
        assert_eq!(entry.movie_id, 155);
        assert_eq!(entry.poster_url, "https://img/tdk.jpg");
        assert!(entry.last_searched_at.is_some());
    }

    #[test]
    fn test_entry_from_missing_fields() {
        let entry =
            RedisTrendingStore::entry_from_fields("ghost".to_string(), 1.0, &HashMap::new());
        assert_eq!(entry.movie_id, 0);
        assert_eq!(entry.poster_url, "");
        assert_eq!(entry.last_searched_at, None);
    }

    // Needs a live Redis: REDIS_URL=redis://... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn test_record_and_read_back() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = create_redis_client(&redis_url).unwrap();
        let store = RedisTrendingStore::new(client.clone());

        let term = "movie-scout-test-term";
        let first = SearchRecord {
            search_term: term.to_string(),
            movie_id: 1,
            poster_url: "https://img/first.jpg".to_string(),
        };
        let second = SearchRecord {
            search_term: term.to_string(),
            movie_id: 2,
            poster_url: "https://img/second.jpg".to_string(),
        };

        store.record_search(&first).await.unwrap();
        store.record_search(&second).await.unwrap();

        let entries = store.top_trending(100).await.unwrap();
        let entry = entries.iter().find(|e| e.search_term == term).unwrap();
        assert_eq!(entry.count, 2);
        // First poster wins
        assert_eq!(entry.movie_id, 1);
        assert_eq!(entry.poster_url, "https://img/first.jpg");

        // Clean up
        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn
            .zrem(TrendingKey::Counts.to_string(), term)
            .await
            .unwrap();
        let _: () = conn
            .del(TrendingKey::Entry(term.to_string()).to_string())
            .await
            .unwrap();
    }
}
