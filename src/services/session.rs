use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::Session;

/// One lock per session: held for the whole of a user action so turns never interleave.
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SharedSession>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn index(&self) -> MutexGuard<'_, HashMap<Uuid, SharedSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn create(&self) -> SharedSession {
        let purged = self.purge_expired();
        if purged > 0 {
            tracing::info!(purged, "purged idle sessions");
        }

        let session = Session::new();
        let id = session.id;
        let shared = Arc::new(tokio::sync::Mutex::new(session));
        self.index().insert(id, Arc::clone(&shared));
        tracing::info!(session = %id, "session created");
        shared
    }

    /// Unknown and expired ids both come back as `None`.
    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut sessions = self.index();
        let shared = sessions.get(id).cloned()?;

        if self.expired(&shared) {
            sessions.remove(id);
            tracing::info!(session = %id, "session expired");
            return None;
        }
        Some(shared)
    }

    /// Drops idle sessions. A session whose lock is held is in use and stays.
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.index();
        let before = sessions.len();
        sessions.retain(|_, shared| !self.expired(shared));
        before - sessions.len()
    }

    fn expired(&self, shared: &SharedSession) -> bool {
        match shared.try_lock() {
            Ok(session) => session.is_expired(self.ttl, Utc::now()),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.index().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index().is_empty()
    }
}
