//! Expense dialogue state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `transition` never performs I/O, it only describes effects for the
//! runtime to carry out.

mod effect;
pub mod event;
pub mod input;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, ExpenseTable};
pub use event::{BackendOutcome, Event};
pub use state::{Form, SessionContext, SessionState};
pub use transition::transition;
