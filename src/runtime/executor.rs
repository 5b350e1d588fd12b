//! Drives one session through a message and its backend calls

use super::OutgoingMessage;
use crate::client::ExpenseApi;
use crate::document::render_csv;
use crate::state_machine::{
    transition, BackendOutcome, Effect, Event, ExpenseTable, SessionContext, SessionState,
};
use std::collections::VecDeque;

const RECOVERY_MESSAGE: &str = "Something went wrong, please start again.";

pub(super) struct SessionDriver<'a> {
    pub api: &'a dyn ExpenseApi,
    pub context: &'a SessionContext,
    pub user_id: &'a str,
}

impl SessionDriver<'_> {
    /// Apply `event` and every backend outcome it leads to, collecting replies
    pub async fn drive(&self, state: &mut SessionState, event: Event) -> Vec<OutgoingMessage> {
        let mut outbox = Vec::new();
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            let result = match transition(state, self.context, event) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(user_id = %self.user_id, step = state.step_name(), error = %e, "Rejected event, resetting session");
                    *state = SessionState::Idle;
                    outbox.push(OutgoingMessage::Text {
                        text: RECOVERY_MESSAGE.to_string(),
                        show_menu: true,
                    });
                    break;
                }
            };

            if result.new_state != *state {
                tracing::debug!(
                    user_id = %self.user_id,
                    from = state.step_name(),
                    to = result.new_state.step_name(),
                    "Session transition"
                );
            }
            *state = result.new_state;
            if state.is_waiting_on_server() {
                tracing::debug!(user_id = %self.user_id, form = ?state.form(), "Awaiting expense service");
            }

            for effect in result.effects {
                if let Some(next) = self.execute_effect(effect, &mut outbox).await {
                    pending.push_back(next);
                }
            }
        }

        outbox
    }

    /// Execute an effect and optionally return the event it generated
    async fn execute_effect(
        &self,
        effect: Effect,
        outbox: &mut Vec<OutgoingMessage>,
    ) -> Option<Event> {
        let outcome = match effect {
            Effect::Reply { text, show_menu } => {
                outbox.push(OutgoingMessage::Text { text, show_menu });
                return None;
            }

            Effect::SendDocument {
                table,
                caption,
                show_menu,
            } => {
                outbox.push(self.document(table, caption, show_menu));
                return None;
            }

            Effect::CreateExpense(request) => {
                tracing::info!(user_id = %self.user_id, title = %request.title, "Creating expense");
                BackendOutcome::Created(self.api.create_expense(&request).await)
            }

            Effect::ListExpenses(range) => {
                tracing::info!(
                    user_id = %self.user_id,
                    start = %range.start_date,
                    end = %range.end_date,
                    "Listing expenses"
                );
                BackendOutcome::Listed(self.api.list_expenses(&range).await)
            }

            Effect::UpdateExpense { id, request } => {
                tracing::info!(user_id = %self.user_id, id, "Updating expense");
                BackendOutcome::Updated(self.api.update_expense(id, &request).await)
            }

            Effect::DeleteExpense { id } => {
                tracing::info!(user_id = %self.user_id, id, "Deleting expense");
                BackendOutcome::Deleted(self.api.delete_expense(id).await)
            }
        };

        Some(Event::Backend(outcome))
    }

    fn document(&self, table: ExpenseTable, caption: String, show_menu: bool) -> OutgoingMessage {
        match render_csv(&table) {
            Ok(content) => OutgoingMessage::Document {
                filename: table.filename,
                caption,
                content,
                show_menu,
            },
            Err(e) => {
                tracing::error!(user_id = %self.user_id, error = %e, "Failed to render document");
                OutgoingMessage::Text {
                    text: "Failed to build the document.".to_string(),
                    show_menu: true,
                }
            }
        }
    }
}
