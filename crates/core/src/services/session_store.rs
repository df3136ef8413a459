use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::settings::DEFAULT_TOKEN_KEY;
use crate::storage::manager::{DurableStore, MemoryStore};

/// Authentication state as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token; either never logged in or logged out by the user.
    Anonymous,
    Authenticated,
    /// The server rejected the token; the UI should send the user to login.
    Expired,
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        self == AuthState::Authenticated
    }
}

/// Current token plus a counter bumped on every login, logout and expiry.
/// A rejection is only acted on while the epoch it was dispatched under is current.
#[derive(Debug, Default)]
struct Slot {
    token: Option<String>,
    epoch: u64,
}

/// Owns the bearer token and the derived "is authenticated" flag.
///
/// The token lives in memory and in a [`DurableStore`] under a single key, so a
/// restarted process picks the session back up. Subscribers are woken only when
/// the [`AuthState`] actually changes.
pub struct SessionStore {
    storage: Arc<dyn DurableStore>,
    key: String,
    slot: RwLock<Slot>,
    state: watch::Sender<AuthState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Restore the session from durable storage.
    pub fn open(storage: Arc<dyn DurableStore>, key: impl Into<String>) -> Result<Self, CoreError> {
        let key = key.into();
        let token = storage.get(&key)?.filter(|t| !t.is_empty());
        let initial = if token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        };
        tracing::debug!(authenticated = token.is_some(), "session restored");
        let (state, _) = watch::channel(initial);
        Ok(Self {
            storage,
            key,
            slot: RwLock::new(Slot { token, epoch: 0 }),
            state,
        })
    }

    /// A session that is not persisted anywhere.
    pub fn in_memory() -> Self {
        let (state, _) = watch::channel(AuthState::Anonymous);
        Self {
            storage: Arc::new(MemoryStore::new()),
            key: DEFAULT_TOKEN_KEY.to_string(),
            slot: RwLock::new(Slot::default()),
            state,
        }
    }

    /// Store the token durably and mark the session authenticated.
    /// The token is opaque: nothing but emptiness is checked.
    pub fn login(&self, token: &str) -> Result<(), CoreError> {
        if token.is_empty() {
            return Err(CoreError::Validation("access token must not be empty".into()));
        }
        let mut slot = self.write_slot();
        self.storage.set(&self.key, token)?;
        slot.token = Some(token.to_string());
        slot.epoch += 1;
        drop(slot);
        self.transition(AuthState::Authenticated);
        Ok(())
    }

    /// Clear the durable token and mark the session unauthenticated.
    pub fn logout(&self) -> Result<(), CoreError> {
        let mut slot = self.write_slot();
        self.storage.remove(&self.key)?;
        slot.token = None;
        slot.epoch += 1;
        drop(slot);
        self.transition(AuthState::Anonymous);
        Ok(())
    }

    /// Forced logout after the server rejected the current session.
    ///
    /// Returns `true` when the caller should send the user to login: the call
    /// dropped a token, or the session was anonymous and had not been expired
    /// yet. Later calls return `false` until the next login or logout. The
    /// in-memory token is always cleared; a durable-storage failure is logged.
    pub fn expire(&self) -> bool {
        let mut slot = self.write_slot();
        self.expire_slot(&mut slot)
    }

    /// Like [`SessionStore::expire`], but only if `epoch` is still current.
    ///
    /// A rejection of a request sent before a later login or logout is stale
    /// and leaves the session alone.
    pub fn expire_epoch(&self, epoch: u64) -> bool {
        let mut slot = self.write_slot();
        if slot.epoch != epoch {
            tracing::debug!(rejected = epoch, current = slot.epoch, "ignoring stale rejection");
            return false;
        }
        self.expire_slot(&mut slot)
    }

    fn expire_slot(&self, slot: &mut Slot) -> bool {
        let had_token = slot.token.take().is_some();
        if !had_token && self.state() == AuthState::Expired {
            return false;
        }
        if had_token {
            if let Err(e) = self.storage.remove(&self.key) {
                tracing::warn!(error = %e, "failed to clear stored token after rejection");
            }
        }
        slot.epoch += 1;
        self.transition(AuthState::Expired);
        true
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_slot().token.is_some()
    }

    /// The token as of this call; the request interceptor reads it at dispatch.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read_slot().token.clone()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.read_slot().epoch
    }

    /// Token and epoch read together, so a request can be tied to the session it used.
    #[must_use]
    pub fn snapshot(&self) -> (Option<String>, u64) {
        let slot = self.read_slot();
        (slot.token.clone(), slot.epoch)
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Receiver that wakes whenever the authentication state flips.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn transition(&self, next: AuthState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            tracing::info!(state = ?next, "authentication state changed");
        }
    }
}

/// Sends the user back to the login entry point after a forced logout.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}
