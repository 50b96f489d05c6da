//! Play sessions: a player opens one and then acts through it until the
//! validity window lapses. Only the owner may act in a session.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use crate::error::AbortReason;

#[derive(Debug, Clone, Copy)]
pub struct PlaySession {
    pub id: Uuid,
    pub owner: Uuid,
    pub opened_at: Instant,
}

impl PlaySession {
    pub fn is_expired(&self, window: Duration) -> bool {
        self.opened_at.elapsed() >= window
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, PlaySession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, owner: Uuid) -> PlaySession {
        let session = PlaySession {
            id: Uuid::new_v4(),
            owner,
            opened_at: Instant::now(),
        };
        self.sessions.insert(session.id, session);
        session
    }

    /// `Ok(None)` when the session is unknown or has expired (the action is
    /// ignored); `UnauthorizedActor` when `actor` is not the owner.
    pub fn authorize(
        &self,
        session_id: Uuid,
        actor: Uuid,
        window: Duration,
    ) -> Result<Option<PlaySession>, AbortReason> {
        let Some(session) = self.sessions.get(&session_id).map(|s| *s) else {
            return Ok(None);
        };
        if session.is_expired(window) {
            self.sessions.remove(&session_id);
            return Ok(None);
        }
        if session.owner != actor {
            return Err(AbortReason::UnauthorizedActor);
        }
        Ok(Some(session))
    }

    /// Drop every expired session, returning how many were removed.
    pub fn sweep(&self, window: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(window));
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Spawn the background loop that evicts expired sessions.
pub fn start_sweeper(registry: Arc<SessionRegistry>, window: Duration) {
    tokio::spawn(async move {
        loop {
            sleep(window.clamp(Duration::from_secs(1), Duration::from_secs(60))).await;
            let dropped = registry.sweep(window);
            if dropped > 0 {
                log::debug!("evicted {dropped} expired play sessions");
            }
        }
    });
}
