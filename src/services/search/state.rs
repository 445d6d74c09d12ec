use crate::{
    error::CatalogError,
    models::{MovieSummary, TrendingEntry},
    services::catalog::CatalogQuery,
};

/// Outcome of the most recent catalog query
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(Vec<MovieSummary>),
    Failed(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// Movies of the last successful query; empty in every other state
    pub fn movies(&self) -> &[MovieSummary] {
        match self {
            FetchState::Success(movies) => movies,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything one search page displays
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    /// Raw input text, updated on every keystroke
    pub search_term: String,
    /// Last settled input, the one the current results belong to
    pub debounced_term: String,
    pub fetch: FetchState,
    pub trending: Vec<TrendingEntry>,
    /// Sequence number of the most recently issued catalog request
    pub(crate) latest_request: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }
}

/// Inputs to the search reducer
#[derive(Debug)]
pub enum SearchEvent {
    /// The page opened
    Mounted,
    /// The input text changed
    InputChanged(String),
    /// The input was quiet for the full interval
    Settled(String),
    /// A catalog request finished, successfully or not
    FetchCompleted {
        request_id: u64,
        query: CatalogQuery,
        outcome: Result<Vec<MovieSummary>, CatalogError>,
    },
    /// The trending panel finished loading
    TrendingLoaded(Vec<TrendingEntry>),
}

/// Work the reducer asks the session to perform
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEffect {
    /// Restart the quiet interval for this input
    Debounce(String),
    /// Issue a catalog request tagged with `request_id`
    Fetch { request_id: u64, query: CatalogQuery },
    /// Bump the trending counter for a query, in the background
    RecordSearch {
        search_term: String,
        movie: MovieSummary,
    },
    /// Load the trending panel once
    LoadTrending,
}
