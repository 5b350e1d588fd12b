//! Session state types

// ============================================================================
// Forms
// ============================================================================

/// One of the four linear input flows offered by the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Add,
    Report,
    Delete,
    Edit,
}

impl Form {
    pub const ALL: [Form; 4] = [Form::Add, Form::Report, Form::Delete, Form::Edit];

    /// Menu button text; incoming messages are matched against it exactly
    pub fn label(self) -> &'static str {
        match self {
            Form::Add => "Add expense",
            Form::Report => "Expense report",
            Form::Delete => "Delete expense",
            Form::Edit => "Edit expense",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|form| form.label() == text)
    }

    pub fn menu_labels() -> Vec<String> {
        Self::ALL.iter().map(|f| f.label().to_string()).collect()
    }
}

/// Which form requested the reference listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPurpose {
    Delete,
    Edit,
}

// ============================================================================
// Session Context
// ============================================================================

/// Immutable per-agent settings that shape prompts
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub local_currency: String,
}

impl SessionContext {
    pub fn new(local_currency: impl Into<String>) -> Self {
        Self {
            local_currency: local_currency.into(),
        }
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Where a user is inside a form, with the fields collected so far
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No form in progress
    #[default]
    Idle,

    // Add
    AwaitingTitle,
    AwaitingDate {
        title: String,
    },
    AwaitingAmount {
        title: String,
        date: String,
    },

    // Report
    AwaitingReportStart,
    AwaitingReportEnd {
        start_date: String,
    },

    /// Reference listing for delete/edit requested from the service
    LoadingListing {
        purpose: ListingPurpose,
    },

    // Delete
    AwaitingDeleteId,

    // Edit
    AwaitingEditId,
    AwaitingEditTitle {
        id: i64,
    },
    AwaitingEditAmount {
        id: i64,
        title: String,
    },

    /// The terminal backend call of `form` is in flight
    Submitting {
        form: Form,
    },
}

impl SessionState {
    /// The form this state belongs to, if any
    pub fn form(&self) -> Option<Form> {
        match self {
            SessionState::Idle => None,
            SessionState::AwaitingTitle
            | SessionState::AwaitingDate { .. }
            | SessionState::AwaitingAmount { .. } => Some(Form::Add),
            SessionState::AwaitingReportStart | SessionState::AwaitingReportEnd { .. } => {
                Some(Form::Report)
            }
            SessionState::LoadingListing {
                purpose: ListingPurpose::Delete,
            }
            | SessionState::AwaitingDeleteId => Some(Form::Delete),
            SessionState::LoadingListing {
                purpose: ListingPurpose::Edit,
            }
            | SessionState::AwaitingEditId
            | SessionState::AwaitingEditTitle { .. }
            | SessionState::AwaitingEditAmount { .. } => Some(Form::Edit),
            SessionState::Submitting { form } => Some(*form),
        }
    }

    /// Waiting on the expense service rather than on the user
    pub fn is_waiting_on_server(&self) -> bool {
        matches!(
            self,
            SessionState::LoadingListing { .. } | SessionState::Submitting { .. }
        )
    }

    /// Short name for logs
    pub fn step_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingTitle => "awaiting_title",
            SessionState::AwaitingDate { .. } => "awaiting_date",
            SessionState::AwaitingAmount { .. } => "awaiting_amount",
            SessionState::AwaitingReportStart => "awaiting_report_start",
            SessionState::AwaitingReportEnd { .. } => "awaiting_report_end",
            SessionState::LoadingListing { .. } => "loading_listing",
            SessionState::AwaitingDeleteId => "awaiting_delete_id",
            SessionState::AwaitingEditId => "awaiting_edit_id",
            SessionState::AwaitingEditTitle { .. } => "awaiting_edit_title",
            SessionState::AwaitingEditAmount { .. } => "awaiting_edit_amount",
            SessionState::Submitting { .. } => "submitting",
        }
    }
}
