//! HTTP API of the expense service

mod handlers;

pub use handlers::create_router;

use crate::service::ExpenseService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub expenses: ExpenseService,
}

impl AppState {
    pub fn new(expenses: ExpenseService) -> Self {
        Self { expenses }
    }
}
