//! Property-based tests for the session state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::event::BackendOutcome;
use super::state::*;
use super::transition::*;
use super::*;
use crate::client::ApiError;
use crate::expense::{DetailResponse, ExpenseRecord};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("UAH")
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_form() -> impl Strategy<Value = Form> {
    prop_oneof![
        Just(Form::Add),
        Just(Form::Report),
        Just(Form::Delete),
        Just(Form::Edit),
    ]
}

fn arb_valid_date() -> impl Strategy<Value = String> {
    // Day capped at 28 so every month is valid
    (1u32..=28, 1u32..=12, 2000i32..=2100).prop_map(|(d, m, y)| format!("{d:02}.{m:02}.{y}"))
}

/// Steps that validate their answer before moving on
fn arb_validated_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        "[a-zA-Z ]{1,20}".prop_map(|title| SessionState::AwaitingDate { title }),
        ("[a-zA-Z ]{1,20}", arb_valid_date())
            .prop_map(|(title, date)| SessionState::AwaitingAmount { title, date }),
        Just(SessionState::AwaitingReportStart),
        arb_valid_date().prop_map(|start_date| SessionState::AwaitingReportEnd { start_date }),
        Just(SessionState::AwaitingDeleteId),
        Just(SessionState::AwaitingEditId),
        (1i64..1000, "[a-zA-Z ]{1,20}")
            .prop_map(|(id, title)| SessionState::AwaitingEditAmount { id, title }),
    ]
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    prop_oneof![
        Just(SessionState::Idle),
        Just(SessionState::AwaitingTitle),
        arb_validated_state(),
        (1i64..1000).prop_map(|id| SessionState::AwaitingEditTitle { id }),
        prop_oneof![Just(ListingPurpose::Delete), Just(ListingPurpose::Edit)]
            .prop_map(|purpose| SessionState::LoadingListing { purpose }),
        arb_form().prop_map(|form| SessionState::Submitting { form }),
    ]
}

fn arb_api_error() -> impl Strategy<Value = ApiError> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(ApiError::Transport),
        (400u16..600, proptest::option::of("[a-zA-Z ]{1,30}"))
            .prop_map(|(status, detail)| ApiError::Rejected { status, detail }),
        "[a-z ]{1,20}".prop_map(ApiError::InvalidResponse),
    ]
}

fn arb_record() -> impl Strategy<Value = ExpenseRecord> {
    (1i64..1000, "[a-zA-Z ]{1,20}", arb_valid_date(), 0.0f64..10_000.0).prop_map(
        |(id, title, date, amount_local)| ExpenseRecord {
            id,
            title,
            date,
            amount_local,
            amount_foreign: amount_local * 0.041,
        },
    )
}

/// A backend outcome matching the call issued by `form`
fn arb_outcome_for(form: Form) -> BoxedStrategy<BackendOutcome> {
    match form {
        Form::Add => prop_oneof![
            arb_record().prop_map(Ok),
            arb_api_error().prop_map(Err),
        ]
        .prop_map(BackendOutcome::Created)
        .boxed(),
        Form::Report => prop_oneof![
            proptest::collection::vec(arb_record(), 0..5).prop_map(Ok),
            arb_api_error().prop_map(Err),
        ]
        .prop_map(BackendOutcome::Listed)
        .boxed(),
        Form::Delete => prop_oneof![
            Just(Ok(DetailResponse::new("Expense deleted"))),
            arb_api_error().prop_map(Err),
        ]
        .prop_map(BackendOutcome::Deleted)
        .boxed(),
        Form::Edit => prop_oneof![
            arb_record().prop_map(Ok),
            arb_api_error().prop_map(Err),
        ]
        .prop_map(BackendOutcome::Updated)
        .boxed(),
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invalid answers never advance and never reach the service
    #[test]
    fn prop_invalid_answer_keeps_state(state in arb_validated_state(), text in "[a-zA-Z]{1,12}") {
        let result = transition(&state, &test_context(), Event::Text(text)).unwrap();

        prop_assert_eq!(&result.new_state, &state);
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(
            matches!(result.effects[0], Effect::Reply { show_menu: false, .. }),
            "expected a re-prompt, got {:?}",
            result.effects
        );
    }

    // /start always abandons the form in progress
    #[test]
    fn prop_start_resets(state in arb_state()) {
        let result = transition(&state, &test_context(), Event::Start).unwrap();

        prop_assert_eq!(result.new_state, SessionState::Idle);
        prop_assert!(!result.effects.iter().any(Effect::is_backend_call));
    }

    // A menu button opens its form from anywhere
    #[test]
    fn prop_menu_opens_form(state in arb_state(), form in arb_form()) {
        let result = transition(&state, &test_context(), Event::MenuSelected(form)).unwrap();

        prop_assert_eq!(result.new_state.form(), Some(form));
        prop_assert!(result.effects.len() == 1);
    }

    // Whatever the service answers to a terminal call, the session is cleared
    #[test]
    fn prop_terminal_outcome_clears_session(
        (form, outcome) in arb_form().prop_flat_map(|form| (Just(form), arb_outcome_for(form)))
    ) {
        let state = SessionState::Submitting { form };
        let result = transition(&state, &test_context(), Event::Backend(outcome)).unwrap();

        prop_assert_eq!(result.new_state, SessionState::Idle);
        prop_assert!(!result.effects.iter().any(Effect::is_backend_call));
        let menu_restored = result.effects.iter().all(|e| matches!(
            e,
            Effect::Reply { show_menu: true, .. } | Effect::SendDocument { show_menu: true, .. }
        ));
        prop_assert!(menu_restored, "terminal effect without menu: {:?}", result.effects);
    }

    // Any well-formed date moves the add form to the amount step
    #[test]
    fn prop_valid_date_advances(title in "[a-zA-Z ]{1,20}", date in arb_valid_date()) {
        let state = SessionState::AwaitingDate { title: title.clone() };
        let result = transition(&state, &test_context(), Event::Text(date.clone())).unwrap();

        prop_assert_eq!(result.new_state, SessionState::AwaitingAmount { title, date });
    }

    // Free text is refused while the service is working
    #[test]
    fn prop_waiting_rejects_text(form in arb_form(), text in "[a-zA-Z0-9 ]{0,20}") {
        let state = SessionState::Submitting { form };
        let result = transition(&state, &test_context(), Event::Text(text));

        prop_assert!(matches!(result, Err(TransitionError::AwaitingServer)));
    }

    // Every backend call comes with a state that waits for it
    #[test]
    fn prop_backend_calls_wait(
        state in arb_state(),
        text in prop_oneof!["[a-zA-Z ]{1,10}", "[0-9]{1,4}", arb_valid_date()]
    ) {
        if let Ok(result) = transition(&state, &test_context(), Event::Text(text)) {
            let calls = result.effects.iter().filter(|e| e.is_backend_call()).count();
            prop_assert!(calls <= 1);
            prop_assert_eq!(calls == 1, result.new_state.is_waiting_on_server());
        }
    }
}
