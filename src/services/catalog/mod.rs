//! Movie catalog abstraction
//!
//! The search flow only needs two read-only listings from the metadata
//! service: a title search and the popular-movies discover page. Both return
//! the same page shape, so a single `fetch` covers them.

use std::fmt::Display;

use crate::{error::CatalogError, models::MovieSummary};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Which listing a settled search term maps to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    /// Title search for a non-empty term
    Search(String),
    /// Popular movies, sorted by descending popularity
    DiscoverPopular,
}

impl CatalogQuery {
    /// Maps a settled term to a query. Only the empty string selects the
    /// discover page; whitespace is searched as typed.
    pub fn from_term(term: &str) -> Self {
        if term.is_empty() {
            CatalogQuery::DiscoverPopular
        } else {
            CatalogQuery::Search(term.to_string())
        }
    }

    /// The search text, if this is a title search
    pub fn search_term(&self) -> Option<&str> {
        match self {
            CatalogQuery::Search(term) => Some(term),
            CatalogQuery::DiscoverPopular => None,
        }
    }
}

impl Display for CatalogQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogQuery::Search(term) => write!(f, "search:{}", term),
            CatalogQuery::DiscoverPopular => write!(f, "discover:popular"),
        }
    }
}

/// Read-only access to the movie metadata service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Runs one listing query and returns the page of movies.
    ///
    /// A well-formed response that signals failure is reported as
    /// `CatalogError::Service`; an empty page is not an error.
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<MovieSummary>, CatalogError>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
