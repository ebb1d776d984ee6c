//! Session registry.
//!
//! Each player's session sits behind its own mutex. The registry lock is
//! held only long enough to look a session up, so players never wait on
//! each other.

use crate::error::{ServerError, ServerResult};
use crate::session::{PlayerSession, PumpStats};
use parking_lot::{Mutex, RwLock};
use satchel_shared::OwnerId;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<PlayerSession>>;

/// All live sessions, keyed by player.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<OwnerId, SessionHandle>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRegistered`] if the player already has
    /// one; the new session is dropped.
    pub fn insert(&self, session: PlayerSession) -> ServerResult<SessionHandle> {
        let owner = session.owner();
        let mut sessions = self.sessions.write();
        if sessions.contains_key(&owner) {
            return Err(ServerError::AlreadyRegistered(owner));
        }
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(owner, Arc::clone(&handle));
        tracing::info!(%owner, sessions = sessions.len(), "session registered");
        Ok(handle)
    }

    /// Looks a session up.
    #[must_use]
    pub fn get(&self, owner: OwnerId) -> Option<SessionHandle> {
        self.sessions.read().get(&owner).cloned()
    }

    /// Removes a session. Work already holding its handle may still finish.
    pub fn remove(&self, owner: OwnerId) -> Option<SessionHandle> {
        let removed = self.sessions.write().remove(&owner);
        if removed.is_some() {
            tracing::info!(%owner, "session removed");
        }
        removed
    }

    /// Runs `f` with exclusive access to a player's session.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::UnknownPlayer`] if there is no session.
    pub fn with_session<R>(
        &self,
        owner: OwnerId,
        f: impl FnOnce(&mut PlayerSession) -> R,
    ) -> ServerResult<R> {
        let handle = self.get(owner).ok_or(ServerError::UnknownPlayer(owner))?;
        let mut session = handle.lock();
        Ok(f(&mut *session))
    }

    /// Pumps every session once.
    pub fn pump_all(&self) -> PumpStats {
        let handles: Vec<SessionHandle> = self.sessions.read().values().cloned().collect();
        let mut stats = PumpStats::default();
        for handle in handles {
            stats += handle.lock().pump();
        }
        stats
    }

    /// Registered players.
    #[must_use]
    pub fn owners(&self) -> Vec<OwnerId> {
        self.sessions.read().keys().copied().collect()
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true if no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
