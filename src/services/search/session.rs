use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, CatalogError},
    models::MovieSummary,
    services::{
        catalog::{CatalogQuery, MovieCatalog},
        debounce::{Debouncer, Settled},
        trending::{self, SearchRecord, TrendingStore},
    },
};

use super::state::{SearchEffect, SearchEvent, SearchState};
use super::update::update;

/// Collaborators and settings shared by every session
#[derive(Clone)]
pub struct SessionDeps {
    pub catalog: Arc<dyn MovieCatalog>,
    pub trending: Arc<dyn TrendingStore>,
    /// Base URL poster paths are resolved against
    pub image_base: String,
    pub trending_limit: usize,
    pub quiet_interval: Duration,
}

enum SessionCommand {
    /// New input value; answered with the state after it was applied
    SetTerm(String, oneshot::Sender<SearchState>),
    Shutdown,
}

/// Handle to a running search session
#[derive(Clone)]
pub struct SessionHandle {
    id: Uuid,
    commands: mpsc::Sender<SessionCommand>,
    view: watch::Receiver<SearchState>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Feeds a new input value (one keystroke's worth) to the session and
    /// returns the state with that input applied
    pub async fn set_term(&self, term: impl Into<String>) -> AppResult<SearchState> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(SessionCommand::SetTerm(term.into(), reply_tx))
            .await
            .map_err(|_| self.ended())?;

        reply_rx.await.map_err(|_| self.ended())
    }

    fn ended(&self) -> AppError {
        AppError::NotFound(format!("Session {} has ended", self.id))
    }

    /// Latest published state
    pub fn snapshot(&self) -> SearchState {
        self.view.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.view.clone()
    }
}

/// A running session: its handle plus the task driving it
pub struct SearchSession {
    handle: SessionHandle,
    task: JoinHandle<()>,
}

impl SearchSession {
    /// Mounts a new session and starts its event loop
    pub fn spawn(deps: SessionDeps) -> Self {
        let id = Uuid::new_v4();
        let (commands_tx, commands_rx) = mpsc::channel(64);
        let (view_tx, view_rx) = watch::channel(SearchState::new());

        let runner = SessionRunner::new(id, deps, commands_rx, view_tx);
        let task = tokio::spawn(runner.run());

        Self {
            handle: SessionHandle {
                id,
                commands: commands_tx,
                view: view_rx,
            },
            task,
        }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Tears the session down and waits for its loop to exit.
    ///
    /// A pending debounce timer is cancelled; in-flight catalog requests run
    /// to completion but their results are discarded.
    pub async fn close(self) {
        let _ = self.handle.commands.send(SessionCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            tracing::error!(session_id = %self.handle.id, error = %e, "Session task failed");
        }
    }
}

/// Sends a `FetchCompleted` exactly once, even if the fetch task panics or
/// is dropped before finishing.
struct CompletionGuard {
    request_id: u64,
    query: CatalogQuery,
    events: Option<mpsc::UnboundedSender<SearchEvent>>,
}

impl CompletionGuard {
    fn complete(mut self, outcome: Result<Vec<MovieSummary>, CatalogError>) {
        if let Some(events) = self.events.take() {
            let _ = events.send(SearchEvent::FetchCompleted {
                request_id: self.request_id,
                query: self.query.clone(),
                outcome,
            });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(events) = self.events.take() {
            let _ = events.send(SearchEvent::FetchCompleted {
                request_id: self.request_id,
                query: self.query.clone(),
                outcome: Err(CatalogError::Aborted(
                    "fetch task ended without a result".to_string(),
                )),
            });
        }
    }
}

/// Session event loop. Sole owner and mutator of the session's state.
struct SessionRunner {
    id: Uuid,
    deps: SessionDeps,
    state: SearchState,
    debouncer: Debouncer<String>,
    settled_rx: mpsc::UnboundedReceiver<Settled<String>>,
    commands: mpsc::Receiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<SearchEvent>,
    events_rx: mpsc::UnboundedReceiver<SearchEvent>,
    view: watch::Sender<SearchState>,
}

impl SessionRunner {
    fn new(
        id: Uuid,
        deps: SessionDeps,
        commands: mpsc::Receiver<SessionCommand>,
        view: watch::Sender<SearchState>,
    ) -> Self {
        let (debouncer, settled_rx) = Debouncer::channel(deps.quiet_interval);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            id,
            deps,
            state: SearchState::new(),
            debouncer,
            settled_rx,
            commands,
            events_tx,
            events_rx,
            view,
        }
    }

    async fn run(mut self) {
        tracing::info!(
            session_id = %self.id,
            catalog = self.deps.catalog.name(),
            trending_store = self.deps.trending.name(),
            quiet_ms = self.debouncer.quiet_interval().as_millis() as u64,
            "Search session started"
        );

        self.apply(SearchEvent::Mounted);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::SetTerm(term, reply)) => {
                        self.apply(SearchEvent::InputChanged(term));
                        let _ = reply.send(self.state.clone());
                    }
                    Some(SessionCommand::Shutdown) | None => break,
                },
                Some(settled) = self.settled_rx.recv() => {
                    if let Some(term) = self.debouncer.accept(settled) {
                        self.apply(SearchEvent::Settled(term));
                    }
                }
                Some(event) = self.events_rx.recv() => {
                    self.apply(event);
                }
            }
        }

        let cancelled = self.debouncer.cancel();
        tracing::info!(
            session_id = %self.id,
            cancelled_pending_settle = cancelled,
            "Search session stopped"
        );
    }

    /// Runs the reducer, publishes the new state, then performs its effects
    fn apply(&mut self, event: SearchEvent) {
        let effects = update(&mut self.state, event);
        self.view.send_replace(self.state.clone());

        for effect in effects {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: SearchEffect) {
        match effect {
            SearchEffect::Debounce(term) => self.debouncer.input(term),

            SearchEffect::Fetch { request_id, query } => self.spawn_fetch(request_id, query),

            SearchEffect::RecordSearch { search_term, movie } => {
                let record =
                    SearchRecord::from_first_result(&search_term, &movie, &self.deps.image_base);
                trending::spawn_record_search(self.deps.trending.clone(), record);
            }

            SearchEffect::LoadTrending => {
                let store = self.deps.trending.clone();
                let limit = self.deps.trending_limit;
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    let entries = trending::load_trending_panel(store.as_ref(), limit).await;
                    let _ = events.send(SearchEvent::TrendingLoaded(entries));
                });
            }
        }
    }

    fn spawn_fetch(&self, request_id: u64, query: CatalogQuery) {
        tracing::debug!(session_id = %self.id, request_id, query = %query, "Issuing catalog request");

        let catalog = self.deps.catalog.clone();
        let guard = CompletionGuard {
            request_id,
            query: query.clone(),
            events: Some(self.events_tx.clone()),
        };

        tokio::spawn(async move {
            let outcome = catalog.fetch(&query).await;
            guard.complete(outcome);
        });
    }
}
