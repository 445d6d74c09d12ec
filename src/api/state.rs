use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::config::{Config, TrendingBackend};
use crate::db::{create_redis_client, InMemoryTrendingStore, RedisTrendingStore};
use crate::error::{AppError, AppResult};
use crate::services::search::{SearchSession, SessionDeps, SessionHandle};
use crate::services::trending::TrendingStore;
use crate::services::TmdbCatalog;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

/// Collaborators plus the open search sessions
pub struct AppStateInner {
    pub deps: SessionDeps,
    pub sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

/// A registered session and the last time a client touched it
pub struct SessionEntry {
    session: SearchSession,
    last_active: Instant,
}

impl AppState {
    /// Creates state around already-built collaborators
    pub fn new(deps: SessionDeps) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                deps,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Builds the TMDB catalog and the configured trending store
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let catalog = TmdbCatalog::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.http_timeout(),
        )?;

        let trending: Arc<dyn TrendingStore> = match config.trending_backend {
            TrendingBackend::Redis => {
                let client = create_redis_client(&config.redis_url)?;
                Arc::new(RedisTrendingStore::new(client))
            }
            TrendingBackend::Memory => Arc::new(InMemoryTrendingStore::new()),
        };

        tracing::info!(
            catalog_url = %config.tmdb_api_url,
            trending_store = trending.name(),
            trending_limit = config.trending_limit,
            debounce_ms = config.debounce_ms,
            "Application state initialized"
        );

        Ok(Self::new(SessionDeps {
            catalog: Arc::new(catalog),
            trending,
            image_base: config.tmdb_image_url.clone(),
            trending_limit: config.trending_limit,
            quiet_interval: config.debounce_interval(),
        }))
    }

    pub fn deps(&self) -> &SessionDeps {
        &self.inner.deps
    }

    /// Mounts a new session and registers it
    pub async fn open_session(&self) -> SessionHandle {
        let session = SearchSession::spawn(self.inner.deps.clone());
        let handle = session.handle().clone();

        let mut sessions = self.inner.sessions.write().await;
        sessions.insert(
            handle.id(),
            SessionEntry {
                session,
                last_active: Instant::now(),
            },
        );
        tracing::info!(session_id = %handle.id(), open_sessions = sessions.len(), "Session opened");

        handle
    }

    /// Looks a session up and marks it active
    pub async fn session(&self, id: Uuid) -> AppResult<SessionHandle> {
        let mut sessions = self.inner.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;

        entry.last_active = Instant::now();
        Ok(entry.session.handle().clone())
    }

    /// Unregisters a session and waits for it to shut down
    pub async fn close_session(&self, id: Uuid) -> AppResult<()> {
        let session = self
            .inner
            .sessions
            .write()
            .await
            .remove(&id)
            .map(|entry| entry.session)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;

        session.close().await;
        tracing::info!(session_id = %id, "Session closed");
        Ok(())
    }

    /// Closes every open session; used on server shutdown
    pub async fn close_all_sessions(&self) {
        let sessions: Vec<SearchSession> = self
            .inner
            .sessions
            .write()
            .await
            .drain()
            .map(|(_, entry)| entry.session)
            .collect();

        let count = sessions.len();
        for session in sessions {
            session.close().await;
        }
        tracing::info!(closed = count, "All sessions closed");
    }

    /// Closes every session nobody has touched for `idle_ttl`.
    ///
    /// Returns how many were closed.
    pub async fn reap_idle_sessions(&self, idle_ttl: Duration) -> usize {
        let now = Instant::now();
        let expired: Vec<(Uuid, SearchSession)> = {
            let mut sessions = self.inner.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.last_active) >= idle_ttl)
                .map(|(id, _)| *id)
                .collect();

            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|entry| (id, entry.session)))
                .collect()
        };

        let count = expired.len();
        for (id, session) in expired {
            session.close().await;
            tracing::info!(session_id = %id, idle_secs = idle_ttl.as_secs(), "Idle session closed");
        }
        count
    }

    /// Starts the background sweep that closes abandoned sessions
    pub fn spawn_session_reaper(&self, idle_ttl: Duration) -> JoinHandle<()> {
        let state = self.clone();
        let period = (idle_ttl / 2).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let closed = state.reap_idle_sessions(idle_ttl).await;
                if closed > 0 {
                    tracing::debug!(closed, "Session sweep finished");
                }
            }
        })
    }
}
