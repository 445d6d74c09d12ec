use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::services::catalog::CatalogQuery;
use crate::services::trending::{self, SearchRecord};

use super::view::{render_trending, MovieCard, SearchView, SessionCreated, TrendingCard};
use super::AppState;

/// Largest trending panel a client may ask for
pub const MAX_TRENDING_LIMIT: usize = 20;

// Request types

#[derive(Debug, Deserialize)]
pub struct SetTermRequest {
    pub term: String,
}

#[derive(Debug, Deserialize)]
pub struct MoviesQuery {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    /// Kept as text so a malformed value gets the JSON error body
    #[serde(default)]
    pub limit: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Opens a search session for a freshly loaded page
pub async fn create_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> (StatusCode, Json<SessionCreated>) {
    let handle = state.open_session().await;

    tracing::info!(request_id = %request_id, session_id = %handle.id(), "Session mounted");

    let view = SearchView::render(&handle.snapshot(), &state.deps().image_base);
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            id: handle.id(),
            view,
        }),
    )
}

/// Current view of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SearchView>> {
    let handle = state.session(id).await?;
    Ok(Json(SearchView::render(
        &handle.snapshot(),
        &state.deps().image_base,
    )))
}

/// Input change for a session; the search runs once the input settles
pub async fn set_term(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetTermRequest>,
) -> AppResult<(StatusCode, Json<SearchView>)> {
    let handle = state.session(id).await?;
    let applied = handle.set_term(request.term).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SearchView::render(&applied, &state.deps().image_base)),
    ))
}

/// Tears a session down
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.close_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// One-shot catalog query, without debouncing.
///
/// A missing or empty `query` lists popular movies.
pub async fn search_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<MoviesQuery>,
) -> AppResult<Json<Vec<MovieCard>>> {
    let deps = state.deps();
    let query = CatalogQuery::from_term(params.query.as_deref().unwrap_or(""));

    tracing::info!(request_id = %request_id, query = %query, "Processing catalog query");

    let movies = deps.catalog.fetch(&query).await?;

    if let (Some(term), Some(first)) = (query.search_term(), movies.first()) {
        let record = SearchRecord::from_first_result(term, first, &deps.image_base);
        trending::spawn_record_search(deps.trending.clone(), record);
    }

    Ok(Json(
        movies
            .iter()
            .map(|movie| MovieCard::render(movie, &deps.image_base))
            .collect(),
    ))
}

/// Top trending searches; an unavailable store yields an empty list
pub async fn get_trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingQuery>,
) -> AppResult<Json<Vec<TrendingCard>>> {
    let deps = state.deps();
    let limit = match params.limit.as_deref() {
        None => deps.trending_limit,
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| invalid_limit())?,
    };

    if limit == 0 || limit > MAX_TRENDING_LIMIT {
        return Err(invalid_limit());
    }

    let entries = trending::load_trending_panel(deps.trending.as_ref(), limit).await;
    Ok(Json(render_trending(&entries)))
}

fn invalid_limit() -> AppError {
    AppError::InvalidInput(format!(
        "limit must be between 1 and {}",
        MAX_TRENDING_LIMIT
    ))
}
