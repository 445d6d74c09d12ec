use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// A movie as returned by the catalog's search and discover endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

impl MovieSummary {
    /// Absolute poster URL, if the movie has a poster at all
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", image_base.trim_end_matches('/'), path))
    }

    /// Four-digit release year taken from `release_date`
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(0..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Raw body of a catalog listing response.
///
/// Besides the `results` page, two failure shapes are recognised: the
/// `{"Response": "False", "Error": ...}` envelope and TMDB's own
/// `{"success": false, "status_message": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPayload {
    #[serde(default)]
    pub results: Option<Vec<MovieSummary>>,
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status_message: Option<String>,
}

impl CatalogPayload {
    pub fn into_movies(self) -> Result<Vec<MovieSummary>, CatalogError> {
        if self.response.as_deref() == Some("False") {
            return Err(CatalogError::Service {
                message: self.error,
            });
        }

        if self.success == Some(false) {
            return Err(CatalogError::Service {
                message: self.status_message,
            });
        }

        Ok(self.results.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(poster_path: Option<&str>, release_date: Option<&str>) -> MovieSummary {
        MovieSummary {
            id: 268,
            title: "Batman".to_string(),
            poster_path: poster_path.map(str::to_string),
            popularity: 42.5,
            vote_average: Some(7.2),
            original_language: Some("en".to_string()),
            release_date: release_date.map(str::to_string),
        }
    }

    #[test]
    fn test_movie_summary_deserialization_with_sparse_fields() {
        let json = r#"{ "id": 268, "title": "Batman", "adult": false }"#;
        let movie: MovieSummary = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 268);
        assert_eq!(movie.title, "Batman");
        assert_eq!(movie.poster_path, None);
        assert_eq!(movie.popularity, 0.0);
    }

    #[test]
    fn test_poster_url_joins_image_base() {
        let with_poster = movie(Some("/kBf3g9crrADGMc2AMAMlLBgSm2h.jpg"), None);
        assert_eq!(
            with_poster.poster_url("https://image.tmdb.org/t/p/w500/").as_deref(),
            Some("https://image.tmdb.org/t/p/w500/kBf3g9crrADGMc2AMAMlLBgSm2h.jpg")
        );
        assert_eq!(movie(Some(""), None).poster_url("http://img"), None);
        assert_eq!(movie(None, None).poster_url("http://img"), None);
    }

    #[test]
    fn test_release_year() {
        assert_eq!(movie(None, Some("1989-06-23")).release_year(), Some("1989"));
        assert_eq!(movie(None, Some("")).release_year(), None);
        assert_eq!(movie(None, None).release_year(), None);
    }

    #[test]
    fn test_payload_with_results() {
        let json = r#"{ "page": 1, "results": [{ "id": 1, "title": "Batman Begins" }] }"#;
        let payload: CatalogPayload = serde_json::from_str(json).unwrap();
        let movies = payload.into_movies().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Batman Begins");
    }

    #[test]
    fn test_payload_without_results_is_empty() {
        let payload: CatalogPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.into_movies().unwrap().is_empty());
    }

    #[test]
    fn test_payload_response_false_envelope() {
        let json = r#"{ "Response": "False", "Error": "Invalid key" }"#;
        let payload: CatalogPayload = serde_json::from_str(json).unwrap();
        match payload.into_movies() {
            Err(CatalogError::Service { message }) => {
                assert_eq!(message.as_deref(), Some("Invalid key"))
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_payload_tmdb_failure_shape() {
        let json = r#"{ "success": false, "status_code": 7, "status_message": "Invalid API key" }"#;
        let payload: CatalogPayload = serde_json::from_str(json).unwrap();
        let err = payload.into_movies().unwrap_err();
        assert_eq!(err.user_message(), "Invalid API key");
    }
}
