//! Events that drive a session

use super::state::Form;
use crate::client::ApiError;
use crate::expense::{DetailResponse, ExpenseRecord};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// `/start`: drop whatever form is in progress
    Start,
    /// A main menu button was pressed
    MenuSelected(Form),
    /// Any other free text
    Text(String),

    // Service events
    Backend(BackendOutcome),
}

impl Event {
    /// Classify an incoming chat message
    pub fn from_user_text(text: &str) -> Self {
        if text.trim() == "/start" {
            return Event::Start;
        }
        match Form::from_label(text) {
            Some(form) => Event::MenuSelected(form),
            None => Event::Text(text.to_string()),
        }
    }
}

/// Result of the single backend call issued by a transition
#[derive(Debug, Clone)]
pub enum BackendOutcome {
    Created(Result<ExpenseRecord, ApiError>),
    Listed(Result<Vec<ExpenseRecord>, ApiError>),
    Updated(Result<ExpenseRecord, ApiError>),
    Deleted(Result<DetailResponse, ApiError>),
}
