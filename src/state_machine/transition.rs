//! Pure state transition function
//!
//! Each form is a strict linear sequence of prompts. An answer that fails
//! validation re-prompts without moving; the terminal step issues exactly
//! one backend call and the session returns to `Idle` whatever the outcome.

use super::effect::ExpenseTable;
use super::event::BackendOutcome;
use super::input;
use super::state::{Form, ListingPurpose};
use super::{Effect, Event, SessionContext, SessionState};
use crate::client::ApiError;
use crate::expense::{CreateExpenseRequest, ExpenseRecord, RangeQuery, UpdateExpenseRequest};
use thiserror::Error;

/// Range used to fetch "all" expenses for the delete and edit listings
pub const LISTING_START: &str = "01.01.2000";
pub const LISTING_END: &str = "31.12.2100";

const WELCOME: &str = "Welcome to the expense tracker! Choose an action from the menu.";
const USE_MENU: &str = "Choose an action from the menu.";
const CONNECTION_ERROR: &str = "Could not connect to the server.";
const FETCH_ERROR: &str = "Failed to fetch data from the server.";
const ENTER_ID: &str = "Enter a numeric ID.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Still waiting for the server, cannot accept input")]
    AwaitingServer,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
#[allow(clippy::too_many_lines)]
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let currency = &context.local_currency;

    match (state, event) {
        // ============================================================
        // Commands valid in every state
        // ============================================================
        (_, Event::Start) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::reply_with_menu(WELCOME)))
        }

        (_, Event::MenuSelected(form)) => Ok(start_form(form)),

        // ============================================================
        // Idle
        // ============================================================
        (SessionState::Idle, Event::Text(_)) => {
            Ok(TransitionResult::new(SessionState::Idle).with_effect(Effect::reply_with_menu(USE_MENU)))
        }

        // ============================================================
        // Add: title -> date -> amount -> create
        // ============================================================
        (SessionState::AwaitingTitle, Event::Text(title)) => Ok(TransitionResult::new(
            SessionState::AwaitingDate { title },
        )
        .with_effect(Effect::prompt("Enter the expense date in dd.mm.YYYY format:"))),

        (SessionState::AwaitingDate { title }, Event::Text(text)) => match input::date(&text) {
            Ok(date) => Ok(TransitionResult::new(SessionState::AwaitingAmount {
                title: title.clone(),
                date,
            })
            .with_effect(Effect::prompt(format!(
                "Enter the expense amount (in {currency}):"
            )))),
            Err(_) => Ok(stay(
                state,
                "Invalid date format. Please enter the date as dd.mm.YYYY:",
            )),
        },

        (SessionState::AwaitingAmount { title, date }, Event::Text(text)) => {
            match input::amount(&text) {
                Ok(amount) => Ok(TransitionResult::new(SessionState::Submitting { form: Form::Add })
                    .with_effect(Effect::CreateExpense(CreateExpenseRequest {
                        title: title.clone(),
                        date: date.clone(),
                        amount,
                    }))),
                Err(_) => Ok(stay(
                    state,
                    "Please enter a numeric value for the expense amount.",
                )),
            }
        }

        // ============================================================
        // Report: start date -> end date -> list
        // ============================================================
        (SessionState::AwaitingReportStart, Event::Text(text)) => match input::date(&text) {
            Ok(start_date) => Ok(TransitionResult::new(SessionState::AwaitingReportEnd {
                start_date,
            })
            .with_effect(Effect::prompt("Enter the period end date (dd.mm.YYYY):"))),
            Err(_) => Ok(stay(state, "Invalid date format. Enter it as dd.mm.YYYY:")),
        },

        (SessionState::AwaitingReportEnd { start_date }, Event::Text(text)) => {
            match input::date(&text) {
                Ok(end_date) => Ok(TransitionResult::new(SessionState::Submitting {
                    form: Form::Report,
                })
                .with_effect(Effect::ListExpenses(RangeQuery {
                    start_date: start_date.clone(),
                    end_date,
                }))),
                Err(_) => Ok(stay(state, "Invalid date format. Enter it as dd.mm.YYYY:")),
            }
        }

        // ============================================================
        // Delete / Edit reference listing
        // ============================================================
        (
            SessionState::LoadingListing { purpose },
            Event::Backend(BackendOutcome::Listed(result)),
        ) => Ok(listing_loaded(*purpose, result)),

        // ============================================================
        // Delete: id -> delete
        // ============================================================
        (SessionState::AwaitingDeleteId, Event::Text(text)) => match input::expense_id(&text) {
            Ok(id) => Ok(TransitionResult::new(SessionState::Submitting {
                form: Form::Delete,
            })
            .with_effect(Effect::DeleteExpense { id })),
            Err(_) => Ok(stay(state, ENTER_ID)),
        },

        // ============================================================
        // Edit: id -> title -> amount -> update
        // ============================================================
        (SessionState::AwaitingEditId, Event::Text(text)) => match input::expense_id(&text) {
            Ok(id) => Ok(TransitionResult::new(SessionState::AwaitingEditTitle { id })
                .with_effect(Effect::prompt("Enter the new expense title:"))),
            Err(_) => Ok(stay(state, ENTER_ID)),
        },

        (SessionState::AwaitingEditTitle { id }, Event::Text(title)) => {
            Ok(TransitionResult::new(SessionState::AwaitingEditAmount { id: *id, title })
                .with_effect(Effect::prompt(format!(
                    "Enter the new expense amount (in {currency}):"
                ))))
        }

        (SessionState::AwaitingEditAmount { id, title }, Event::Text(text)) => {
            match input::amount(&text) {
                Ok(amount) => Ok(TransitionResult::new(SessionState::Submitting {
                    form: Form::Edit,
                })
                .with_effect(Effect::UpdateExpense {
                    id: *id,
                    request: UpdateExpenseRequest {
                        title: Some(title.clone()),
                        date: None,
                        amount: Some(amount),
                    },
                })),
                Err(_) => Ok(stay(state, "Enter a numeric value for the amount.")),
            }
        }

        // ============================================================
        // Terminal responses: always back to Idle
        // ============================================================
        (SessionState::Submitting { form: Form::Add }, Event::Backend(BackendOutcome::Created(result))) => {
            Ok(finish(result.map(|_| "Expense added successfully!".to_string()), |e| {
                format!("Failed to add the expense: {e}")
            }))
        }

        (
            SessionState::Submitting { form: Form::Report },
            Event::Backend(BackendOutcome::Listed(result)),
        ) => Ok(report_ready(result, currency)),

        (
            SessionState::Submitting { form: Form::Delete },
            Event::Backend(BackendOutcome::Deleted(result)),
        ) => Ok(finish(
            result.map(|_| "Expense deleted successfully.".to_string()),
            |e| format!("Error: {e}"),
        )),

        (
            SessionState::Submitting { form: Form::Edit },
            Event::Backend(BackendOutcome::Updated(result)),
        ) => Ok(finish(
            result.map(|_| "Expense updated successfully.".to_string()),
            |e| format!("Error: {e}"),
        )),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (SessionState::LoadingListing { .. } | SessionState::Submitting { .. }, Event::Text(_)) => {
            Err(TransitionError::AwaitingServer)
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}

// Helper functions

fn start_form(form: Form) -> TransitionResult {
    match form {
        Form::Add => TransitionResult::new(SessionState::AwaitingTitle)
            .with_effect(Effect::prompt("Enter the expense title:")),
        Form::Report => TransitionResult::new(SessionState::AwaitingReportStart)
            .with_effect(Effect::prompt("Enter the period start date (dd.mm.YYYY):")),
        Form::Delete => TransitionResult::new(SessionState::LoadingListing {
            purpose: ListingPurpose::Delete,
        })
        .with_effect(Effect::ListExpenses(full_range())),
        Form::Edit => TransitionResult::new(SessionState::LoadingListing {
            purpose: ListingPurpose::Edit,
        })
        .with_effect(Effect::ListExpenses(full_range())),
    }
}

fn full_range() -> RangeQuery {
    RangeQuery {
        start_date: LISTING_START.to_string(),
        end_date: LISTING_END.to_string(),
    }
}

/// Re-prompt without recording anything
fn stay(state: &SessionState, message: &str) -> TransitionResult {
    TransitionResult::new(state.clone()).with_effect(Effect::prompt(message))
}

/// Report the outcome of a terminal call and clear the session
fn finish(result: Result<String, ApiError>, describe: impl FnOnce(&ApiError) -> String) -> TransitionResult {
    let text = match result {
        Ok(message) => message,
        Err(e) => failure_message(&e, describe),
    };
    TransitionResult::new(SessionState::Idle).with_effect(Effect::reply_with_menu(text))
}

fn failure_message(error: &ApiError, describe: impl FnOnce(&ApiError) -> String) -> String {
    match error {
        ApiError::Transport(_) => CONNECTION_ERROR.to_string(),
        ApiError::Rejected { detail: None, .. } | ApiError::InvalidResponse(_) => {
            FETCH_ERROR.to_string()
        }
        ApiError::Rejected { detail: Some(_), .. } => describe(error),
    }
}

fn listing_loaded(
    purpose: ListingPurpose,
    result: Result<Vec<ExpenseRecord>, ApiError>,
) -> TransitionResult {
    let (next, verb) = match purpose {
        ListingPurpose::Delete => (SessionState::AwaitingDeleteId, "delete"),
        ListingPurpose::Edit => (SessionState::AwaitingEditId, "edit"),
    };

    match result {
        Ok(rows) if rows.is_empty() => TransitionResult::new(SessionState::Idle)
            .with_effect(Effect::reply_with_menu(format!("There are no expenses to {verb}."))),
        Ok(rows) => TransitionResult::new(next).with_effect(Effect::SendDocument {
            table: ExpenseTable::listing(rows),
            caption: format!("Review the expense IDs and enter the ID of the expense to {verb}:"),
            show_menu: true,
        }),
        Err(e) => TransitionResult::new(SessionState::Idle).with_effect(Effect::reply_with_menu(
            failure_message(&e, |e| format!("Error: {e}")),
        )),
    }
}

fn report_ready(result: Result<Vec<ExpenseRecord>, ApiError>, currency: &str) -> TransitionResult {
    let idle = TransitionResult::new(SessionState::Idle);
    match result {
        Ok(rows) if rows.is_empty() => idle.with_effect(Effect::reply_with_menu(
            "There are no expenses for the selected period.",
        )),
        Ok(rows) => {
            let table = ExpenseTable::report(rows);
            let caption = format!("Total expenses: {:.2} {currency}", table.total_local());
            idle.with_effect(Effect::SendDocument {
                table,
                caption,
                show_menu: true,
            })
        }
        Err(e) => idle.with_effect(Effect::reply_with_menu(failure_message(&e, |e| {
            format!("Error: {e}")
        }))),
    }
}
