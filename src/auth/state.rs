//! In-memory session state and its read-only projection.

use tokio::sync::watch;

use super::types::{Credential, Role, UserRecord};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Persisted data has not been checked yet
    Restoring,
    Unauthenticated,
    Authenticated,
}

/// The process-wide auth state. Only `SessionController` writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub credential: Option<Credential>,
    pub user: Option<UserRecord>,
    pub is_restoring: bool,
}

impl SessionState {
    pub(crate) fn restoring() -> Self {
        Self {
            credential: None,
            user: None,
            is_restoring: true,
        }
    }

    pub(crate) fn signed_out() -> Self {
        Self {
            credential: None,
            user: None,
            is_restoring: false,
        }
    }

    /// Authenticated only when both halves are present.
    pub fn is_authenticated(&self) -> bool {
        !self.is_restoring && self.credential.is_some() && self.user.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_restoring {
            SessionPhase::Restoring
        } else if self.is_authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }

    /// Role of the authenticated user.
    pub fn role(&self) -> Option<Role> {
        if self.is_authenticated() {
            self.user.as_ref().map(|u| u.role)
        } else {
            None
        }
    }
}

/// Read-only handle on the session state, cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionView {
    rx: watch::Receiver<SessionState>,
}

impl SessionView {
    pub(crate) fn new(rx: watch::Receiver<SessionState>) -> Self {
        Self { rx }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.rx.borrow().phase()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<UserRecord> {
        let state = self.rx.borrow();
        if state.is_authenticated() {
            state.user.clone()
        } else {
            None
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.rx.borrow().role()
    }

    /// Wait for the next state change. Returns `false` once the controller
    /// has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
