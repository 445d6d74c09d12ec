use serde::Serialize;
use uuid::Uuid;

use crate::models::{MovieSummary, TrendingEntry};
use crate::services::search::SearchState;

/// Poster shown for movies without one
pub const NO_POSTER_URL: &str = "/no-movie.png";

/// One movie card in the results grid
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieCard {
    pub id: u64,
    pub title: String,
    pub poster_url: String,
    /// Rating with one decimal, or "N/A"
    pub vote_average: String,
    pub original_language: Option<String>,
    /// Release year, or "N/A"
    pub release_year: String,
}

impl MovieCard {
    pub fn render(movie: &MovieSummary, image_base: &str) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: movie
                .poster_url(image_base)
                .unwrap_or_else(|| NO_POSTER_URL.to_string()),
            vote_average: movie
                .vote_average
                .filter(|v| *v > 0.0)
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "N/A".to_string()),
            original_language: movie.original_language.clone(),
            release_year: movie.release_year().unwrap_or("N/A").to_string(),
        }
    }
}

/// One row of the trending panel
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendingCard {
    /// 1-based position in the panel
    pub rank: usize,
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    pub poster_url: String,
}

pub fn render_trending(entries: &[TrendingEntry]) -> Vec<TrendingCard> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| TrendingCard {
            rank: index + 1,
            search_term: entry.search_term.clone(),
            count: entry.count,
            movie_id: entry.movie_id,
            poster_url: entry.poster_url.clone(),
        })
        .collect()
}

/// Everything the search page renders for one session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchView {
    pub search_term: String,
    pub debounced_term: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub movies: Vec<MovieCard>,
    /// Empty when the panel is hidden
    pub trending: Vec<TrendingCard>,
}

impl SearchView {
    pub fn render(state: &SearchState, image_base: &str) -> Self {
        Self {
            search_term: state.search_term.clone(),
            debounced_term: state.debounced_term.clone(),
            is_loading: state.fetch.is_loading(),
            error_message: state.fetch.error_message().map(str::to_string),
            movies: state
                .fetch
                .movies()
                .iter()
                .map(|movie| MovieCard::render(movie, image_base))
                .collect(),
            trending: render_trending(&state.trending),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub id: Uuid,
    pub view: SearchView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::search::FetchState;

    fn batman() -> MovieSummary {
        MovieSummary {
            id: 268,
            title: "Batman".to_string(),
            poster_path: Some("/bat.jpg".to_string()),
            popularity: 20.0,
            vote_average: Some(7.234),
            original_language: Some("en".to_string()),
            release_date: Some("1989-06-23".to_string()),
        }
    }

    #[test]
    fn test_movie_card_render() {
        let card = MovieCard::render(&batman(), "https://img/w500");
        assert_eq!(card.poster_url, "https://img/w500/bat.jpg");
        assert_eq!(card.vote_average, "7.2");
        assert_eq!(card.release_year, "1989");
        assert_eq!(card.original_language.as_deref(), Some("en"));
    }

    #[test]
    fn test_movie_card_placeholders() {
        let movie = MovieSummary {
            poster_path: None,
            vote_average: None,
            release_date: None,
            ..batman()
        };
        let card = MovieCard::render(&movie, "https://img/w500");
        assert_eq!(card.poster_url, NO_POSTER_URL);
        assert_eq!(card.vote_average, "N/A");
        assert_eq!(card.release_year, "N/A");
    }

    #[test]
    fn test_render_trending_ranks_from_one() {
        let entries = vec![
            TrendingEntry {
                search_term: "heat".to_string(),
                count: 9,
                movie_id: 949,
                poster_url: "a".to_string(),
                last_searched_at: None,
            },
            TrendingEntry {
                search_term: "alien".to_string(),
                count: 2,
                movie_id: 348,
                poster_url: "b".to_string(),
                last_searched_at: None,
            },
        ];
        let cards = render_trending(&entries);
        assert_eq!(cards[0].rank, 1);
        assert_eq!(cards[1].rank, 2);
        assert_eq!(cards[1].search_term, "alien");
    }

    #[test]
    fn test_search_view_loading() {
        let state = SearchState {
            search_term: "bat".to_string(),
            fetch: FetchState::Loading,
            ..Default::default()
        };
        let view = SearchView::render(&state, "https://img");
        assert!(view.is_loading);
        assert!(view.movies.is_empty());
        assert_eq!(view.error_message, None);
    }

    #[test]
    fn test_search_view_failed_has_no_movies() {
        let state = SearchState {
            fetch: FetchState::Failed("Invalid key".to_string()),
            ..Default::default()
        };
        let view = SearchView::render(&state, "https://img");
        assert!(!view.is_loading);
        assert_eq!(view.error_message.as_deref(), Some("Invalid key"));
        assert!(view.movies.is_empty());
    }
}
