use crate::{error::CatalogError, services::catalog::CatalogQuery};

use super::state::{FetchState, SearchEffect, SearchEvent, SearchState};

/// Applies one event to the search state and returns the effects to run.
///
/// This is the only place `SearchState` changes. Catalog completions are
/// committed only when they answer the most recently issued request; a
/// slower, older response is dropped.
pub fn update(state: &mut SearchState, event: SearchEvent) -> Vec<SearchEffect> {
    match event {
        SearchEvent::Mounted => {
            // The settled term starts out equal to the (empty) input
            state.debounced_term = state.search_term.clone();
            let fetch = begin_fetch(state);
            vec![SearchEffect::LoadTrending, fetch]
        }

        SearchEvent::InputChanged(term) => {
            state.search_term = term.clone();
            vec![SearchEffect::Debounce(term)]
        }

        SearchEvent::Settled(term) => {
            state.debounced_term = term;
            vec![begin_fetch(state)]
        }

        SearchEvent::FetchCompleted {
            request_id,
            query,
            outcome,
        } => {
            if request_id != state.latest_request {
                tracing::debug!(
                    request_id,
                    latest = state.latest_request,
                    query = %query,
                    "Dropping stale catalog response"
                );
                return Vec::new();
            }

            match outcome {
                Ok(movies) => {
                    let effect = match (query.search_term(), movies.first()) {
                        (Some(term), Some(first)) => Some(SearchEffect::RecordSearch {
                            search_term: term.to_string(),
                            movie: first.clone(),
                        }),
                        _ => None,
                    };
                    state.fetch = FetchState::Success(movies);
                    effect.into_iter().collect()
                }
                Err(e) => {
                    log_failure(&query, &e);
                    state.fetch = FetchState::Failed(e.user_message());
                    Vec::new()
                }
            }
        }

        SearchEvent::TrendingLoaded(entries) => {
            state.trending = entries;
            Vec::new()
        }
    }
}

/// Moves to `Loading`, clearing any previous error or results, and issues
/// the next request number
fn begin_fetch(state: &mut SearchState) -> SearchEffect {
    state.latest_request += 1;
    state.fetch = FetchState::Loading;

    SearchEffect::Fetch {
        request_id: state.latest_request,
        query: CatalogQuery::from_term(&state.debounced_term),
    }
}

fn log_failure(query: &CatalogQuery, error: &CatalogError) {
    match error {
        CatalogError::Service { .. } => {
            tracing::warn!(query = %query, error = %error, "Catalog rejected query")
        }
        _ => tracing::error!(query = %query, error = %error, "Error fetching movies"),
    }
}
