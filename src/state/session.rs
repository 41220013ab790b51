//! Auth-session state for the current portal user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by navigation guards and user-aware consumers to decide who may see
//! what. The store has exactly one writer (`SessionStore`, owned by the auth
//! gateway). Everyone else holds a `SessionReader`. The error stage holds a
//! `SessionExpiry`, which can clear the session but never populate it.
//!
//! Changes are published through a `tokio::sync::watch` channel so readers can
//! either read synchronously or await the next change.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use tokio::sync::watch;

use crate::net::types::{RoleCode, User};

type SessionCell = Arc<watch::Sender<Option<User>>>;

/// Single writer of the session cell.
pub struct SessionStore {
    cell: SessionCell,
}

impl SessionStore {
    /// Empty session, as at process start.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { cell: Arc::new(tx) }
    }

    /// Populate the session after a successful login or session check.
    pub fn set(&self, user: User) {
        tracing::debug!(user_id = %user.id, role = %user.role, "session populated");
        self.cell.send_replace(Some(user));
    }

    /// Clear the session, returning the user that was signed in.
    pub fn clear(&self) -> Option<User> {
        let previous = self.cell.send_replace(None);
        if let Some(user) = &previous {
            tracing::debug!(user_id = %user.id, "session cleared");
        }
        previous
    }

    #[must_use]
    pub fn reader(&self) -> SessionReader {
        SessionReader { rx: self.cell.subscribe() }
    }

    #[must_use]
    pub fn expiry(&self) -> SessionExpiry {
        SessionExpiry { cell: Arc::clone(&self.cell) }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the session.
#[derive(Clone, Debug)]
pub struct SessionReader {
    rx: watch::Receiver<Option<User>>,
}

impl SessionReader {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn role(&self) -> Option<RoleCode> {
        self.rx.borrow().as_ref().map(|user| user.role)
    }

    /// Dashboard of the signed-in user, if any.
    #[must_use]
    pub fn dashboard_path(&self) -> Option<&'static str> {
        self.role().map(RoleCode::dashboard_path)
    }

    /// Independent change stream. Each receiver tracks its own "seen" mark.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.rx.clone()
    }
}

/// Clear-only capability handed to the request pipeline.
#[derive(Clone)]
pub struct SessionExpiry {
    cell: SessionCell,
}

impl SessionExpiry {
    /// Drop the session after the backend rejected it. Returns true when a
    /// user was signed in.
    pub fn expire(&self) -> bool {
        let previous = self.cell.send_replace(None);
        if let Some(user) = &previous {
            tracing::info!(user_id = %user.id, "session expired by backend");
        }
        previous.is_some()
    }
}
