use std::sync::Arc;

use client_core::SessionStorage;
use shared::domain::{Session, UserType};
use tracing::{debug, info, warn};

use crate::{
    error::ControllerError,
    navigation::{Navigator, Route},
};

/// Local storage key holding the serialized session descriptor.
pub const SESSION_KEY: &str = "user";

/// Gates protected views on the persisted session descriptor.
#[derive(Clone)]
pub struct SessionGuard {
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
}

impl SessionGuard {
    pub fn new(storage: Arc<dyn SessionStorage>, navigator: Arc<dyn Navigator>) -> Self {
        Self { storage, navigator }
    }

    /// Reads the descriptor without redirecting.
    pub fn current_session(&self) -> Option<Session> {
        let raw = self.storage.get_item(SESSION_KEY)?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!("malformed session descriptor: {err}");
                None
            }
        }
    }

    /// Returns the session or redirects to the login route.
    pub fn require(&self) -> Result<Session, ControllerError> {
        match self.current_session() {
            Some(session) => {
                debug!(user_type = ?session.user_type, "session accepted");
                Ok(session)
            }
            None => {
                self.navigator.on_navigate(Route::Login);
                Err(ControllerError::NotAuthenticated)
            }
        }
    }

    pub fn require_role(&self, required: UserType) -> Result<Session, ControllerError> {
        let session = self.require()?;
        if session.user_type != required {
            warn!(
                required = ?required,
                actual = ?session.user_type,
                "session type not allowed on this page"
            );
            self.navigator.on_navigate(Route::Login);
            return Err(ControllerError::Forbidden {
                required,
                actual: session.user_type,
            });
        }
        Ok(session)
    }

    pub fn login(&self, session: &Session) -> Result<(), ControllerError> {
        let raw = serde_json::to_string(session)?;
        self.storage.set_item(SESSION_KEY, &raw)?;
        info!(user_type = ?session.user_type, email = %session.email, "session stored");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ControllerError> {
        self.storage.remove_item(SESSION_KEY)?;
        info!("session cleared");
        self.navigator.on_navigate(Route::Login);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_guard_tests.rs"]
mod tests;
