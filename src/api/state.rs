use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::SessionState;
use crate::services::{providers::CatalogProvider, Event, Shell};

/// One session, locked for the whole of an event
pub type SharedSession = Arc<Mutex<SessionState>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<Shell>,
    pub catalog: Arc<dyn CatalogProvider>,
    /// Movies per genre in the showcase
    pub showcase_size: usize,
    /// Sessions with no event for this long are dropped
    pub session_ttl: chrono::Duration,
    pub inner: Arc<RwLock<AppStateInner>>,
}

/// Inner state that can be modified
pub struct AppStateInner {
    pub sessions: HashMap<Uuid, SharedSession>,
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {} not found", id))
}

impl AppState {
    pub fn new(
        shell: Shell,
        catalog: Arc<dyn CatalogProvider>,
        showcase_size: usize,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            shell: Arc::new(shell),
            catalog,
            showcase_size,
            session_ttl,
            inner: Arc::new(RwLock::new(AppStateInner {
                sessions: HashMap::new(),
            })),
        }
    }

    pub async fn insert_session(&self, session: SessionState) {
        let mut inner = self.inner.write().await;
        inner
            .sessions
            .insert(session.id, Arc::new(Mutex::new(session)));
    }

    /// Copy of a live session
    pub async fn session(&self, id: Uuid) -> AppResult<SessionState> {
        let slot = self.slot(id).await?;
        let session = slot.lock().await;
        if self.is_expired(&session) {
            self.evict(id).await;
            return Err(session_not_found(id));
        }
        Ok(session.clone())
    }

    /// Applies `event` to a session and returns the updated copy
    ///
    /// Events on one session run one at a time. The event works on a copy
    /// that replaces the stored session only on success, and only if the
    /// session was not deleted in the meantime.
    pub async fn apply_event(&self, id: Uuid, event: Event) -> AppResult<SessionState> {
        let slot = self.slot(id).await?;
        let mut session = slot.lock().await;
        if self.is_expired(&session) {
            self.evict(id).await;
            return Err(session_not_found(id));
        }

        let mut next = session.clone();
        self.shell.handle(&mut next, event).await?;

        let still_registered = self
            .inner
            .read()
            .await
            .sessions
            .get(&id)
            .is_some_and(|current| Arc::ptr_eq(current, &slot));
        if !still_registered {
            tracing::info!(session_id = %id, "Session removed while an event was running");
            return Err(session_not_found(id));
        }

        *session = next.clone();
        Ok(next)
    }

    pub async fn remove_session(&self, id: Uuid) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .sessions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| session_not_found(id))
    }

    /// Drops every idle session past its TTL, returning how many were dropped
    ///
    /// Sessions busy with an event are kept.
    pub async fn evict_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.sessions.len();
        inner.sessions.retain(|_, slot| match slot.try_lock() {
            Ok(session) => !self.is_expired(&session),
            Err(_) => true,
        });
        let evicted = before - inner.sessions.len();

        if evicted > 0 {
            tracing::info!(
                evicted,
                remaining = inner.sessions.len(),
                "Expired sessions evicted"
            );
        }
        evicted
    }

    /// Background task running [`AppState::evict_expired`] every `period`
    pub fn spawn_session_sweeper(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                state.evict_expired().await;
            }
        })
    }

    async fn slot(&self, id: Uuid) -> AppResult<SharedSession> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| session_not_found(id))
    }

    async fn evict(&self, id: Uuid) {
        self.inner.write().await.sessions.remove(&id);
        tracing::info!(session_id = %id, "Expired session evicted");
    }

    fn is_expired(&self, session: &SessionState) -> bool {
        Utc::now() - session.updated_at > self.session_ttl
    }
}
