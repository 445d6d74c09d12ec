//! TMDB catalog client
//!
//! API Flow:
//! 1. Title search: /search/movie?query=... → page of movies
//! 2. Popular: /discover/movie?sort_by=popularity.desc → page of movies
//!
//! The API key travels as the `api_key` query parameter on both.

use std::time::Duration;

use reqwest::{header::ACCEPT, Client as HttpClient, RequestBuilder};

use crate::{
    error::CatalogError,
    models::{CatalogPayload, MovieSummary},
    services::catalog::{CatalogQuery, MovieCatalog},
};

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    /// Creates a client with the given request timeout
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, CatalogError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds the GET request for a listing query
    fn request(&self, query: &CatalogQuery) -> RequestBuilder {
        let request = match query {
            CatalogQuery::Search(term) => self
                .http_client
                .get(format!("{}/search/movie", self.api_url))
                .query(&[("query", term.as_str()), ("api_key", self.api_key.as_str())]),
            CatalogQuery::DiscoverPopular => self
                .http_client
                .get(format!("{}/discover/movie", self.api_url))
                .query(&[
                    ("sort_by", "popularity.desc"),
                    ("api_key", self.api_key.as_str()),
                ]),
        };

        request.header(ACCEPT, "application/json")
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<MovieSummary>, CatalogError> {
        let response = self.request(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_text = response.text().await?;

        let payload: CatalogPayload = serde_json::from_str(&response_text).map_err(|e| {
            tracing::debug!(
                error = %e,
                response = %response_text,
                "Failed to deserialize TMDB response"
            );
            CatalogError::Parse(e)
        })?;

        let movies = payload.into_movies()?;

        tracing::info!(
            query = %query,
            results = movies.len(),
            catalog = "tmdb",
            "Catalog query completed"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
