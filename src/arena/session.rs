//! Session lifecycle for the remote chat
//!
//! `SessionManager` owns the single live chat session. The session is
//! created lazily on the first `get()` and dropped by `reset()`; the next
//! `get()` after a reset creates a fresh one. Dropping a session never
//! contacts the remote service.
//!
//! States: ABSENT and ACTIVE.
//!
//! - ABSENT --get--> ACTIVE (creates the session)
//! - ACTIVE --get--> ACTIVE (returns the existing session)
//! - ACTIVE --reset--> ABSENT
//! - ABSENT --reset--> ABSENT

use crate::error::{DebateError, Result};
use crate::providers::{ChatClient, ChatSession, SessionSpec};
use std::sync::{Arc, Mutex};

/// Owner of the at-most-one live chat session
pub struct SessionManager {
    client: Arc<dyn ChatClient>,
    spec: SessionSpec,
    current: Mutex<Option<Arc<dyn ChatSession>>>,
}

impl SessionManager {
    /// Creates a manager with no active session
    ///
    /// # Arguments
    ///
    /// * `client` - Factory used to create sessions
    /// * `spec` - Model and system instruction every session is bound to
    pub fn new(client: Arc<dyn ChatClient>, spec: SessionSpec) -> Self {
        Self {
            client,
            spec,
            current: Mutex::new(None),
        }
    }

    /// Returns the active session, creating one if there is none
    ///
    /// Creation happens while the slot is locked, so concurrent callers
    /// never install two sessions.
    ///
    /// # Errors
    ///
    /// Returns error if the client fails to create a session
    pub fn get(&self) -> Result<Arc<dyn ChatSession>> {
        let mut current = self.current.lock().map_err(|_| {
            DebateError::Provider("Failed to acquire lock on chat session".to_string())
        })?;

        if let Some(session) = current.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = self.client.create_session(&self.spec)?;
        tracing::info!(
            "Created {} chat session: model={}",
            self.client.name(),
            self.spec.model
        );
        *current = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Drops the active session, if any
    pub fn reset(&self) {
        match self.current.lock() {
            Ok(mut current) => {
                if current.take().is_some() {
                    tracing::info!("Chat session discarded");
                }
            }
            Err(poisoned) => {
                tracing::warn!("Chat session lock poisoned; clearing anyway");
                poisoned.into_inner().take();
            }
        }
    }

    /// Whether a session is currently installed
    pub fn is_active(&self) -> bool {
        self.current
            .lock()
            .map(|current| current.is_some())
            .unwrap_or(false)
    }

    /// Model and system instruction sessions are bound to
    pub fn spec(&self) -> &SessionSpec {
        &self.spec
    }
}
