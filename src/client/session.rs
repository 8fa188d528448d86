use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::dto::{AuthResponse, PublicUser};

/// Authenticated identity held by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<AuthResponse> for Session {
    fn from(r: AuthResponse) -> Self {
        Self {
            user: r.user,
            access_token: r.access_token,
            refresh_token: r.refresh_token,
        }
    }
}

/// Current session plus a change feed. `None` means signed out.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receivers see every sign-in, token refresh and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn set(&self, session: Session) {
        self.tx.send_replace(Some(session));
    }

    /// Returns whether a session was dropped. Subscribers are only woken if so.
    pub fn clear(&self) -> bool {
        self.tx.send_if_modified(|current| current.take().is_some())
    }
}
