//! Runtime for chat sessions
//!
//! Owns one `SessionState` per user and drives it through the pure
//! transition function, executing effects against the expense service.
//! Messages from the same user are handled one at a time; different users
//! never block each other beyond the session table lookup.

mod executor;

#[cfg(test)]
pub mod testing;

use crate::client::ExpenseApi;
use crate::state_machine::{Event, SessionContext, SessionState};
use executor::SessionDriver;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// A message for the user, independent of the chat transport
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingMessage {
    Text {
        text: String,
        /// Attach the main menu buttons
        show_menu: bool,
    },
    Document {
        filename: String,
        caption: String,
        content: Vec<u8>,
        show_menu: bool,
    },
}

impl OutgoingMessage {
    pub fn show_menu(&self) -> bool {
        match self {
            OutgoingMessage::Text { show_menu, .. } | OutgoingMessage::Document { show_menu, .. } => {
                *show_menu
            }
        }
    }
}

/// Manager for all chat sessions
pub struct AgentRuntime {
    api: Arc<dyn ExpenseApi>,
    context: SessionContext,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl AgentRuntime {
    pub fn new(api: Arc<dyn ExpenseApi>, context: SessionContext) -> Self {
        Self {
            api,
            context,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Handle one incoming chat message and return the replies in order
    pub async fn handle_message(&self, user_id: &str, text: &str) -> Vec<OutgoingMessage> {
        let session = self.session(user_id).await;
        let mut state = session.lock().await;

        let driver = SessionDriver {
            api: self.api.as_ref(),
            context: &self.context,
            user_id,
        };
        let replies = driver.drive(&mut state, Event::from_user_text(text)).await;

        if *state == SessionState::Idle {
            self.release(user_id, &session).await;
        }
        replies
    }

    /// Drop an idle session from the table
    ///
    /// Skipped while another message for the same user holds the entry; that
    /// message releases it when it finishes.
    async fn release(&self, user_id: &str, session: &Arc<Mutex<SessionState>>) {
        let mut sessions = self.sessions.write().await;
        let unshared = sessions
            .get(user_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, session) && Arc::strong_count(session) == 2);
        if unshared {
            sessions.remove(user_id);
            tracing::debug!(user_id = %user_id, "Session released");
        }
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Current state of a user's session (`Idle` for unknown users)
    #[cfg(test)]
    pub async fn session_state(&self, user_id: &str) -> SessionState {
        let session = self.sessions.read().await.get(user_id).cloned();
        match session {
            Some(session) => session.lock().await.clone(),
            None => SessionState::Idle,
        }
    }

    async fn session(&self, user_id: &str) -> Arc<Mutex<SessionState>> {
        if let Some(session) = self.sessions.read().await.get(user_id) {
            return session.clone();
        }
        self.sessions
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }
}
