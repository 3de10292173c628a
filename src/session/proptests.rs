//! Property-based tests for session invariants
//!
//! - Importing a valid history preserves order and content exactly
//! - Export timestamps are non-decreasing and span start..end
//! - Export -> strip timestamps -> import reproduces the same role/content pairs
//! - Lifecycle transitions never touch message or span history

use super::*;
use chrono::Duration;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_role() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("user"), Just("assistant"), Just("system")]
}

/// Content with at least one non-whitespace character
fn arb_content() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9.!?]{1,30}[ a-z]{0,10}"
}

fn arb_wire_message() -> impl Strategy<Value = Value> {
    (arb_role(), arb_content()).prop_map(|(role, content)| json!({"role": role, "content": content}))
}

fn arb_history() -> impl Strategy<Value = Vec<Value>> {
    proptest::collection::vec(arb_wire_message(), 0..20)
}

#[derive(Debug, Clone, Copy)]
enum LifecycleOp {
    Start,
    Complete,
    Reactivate,
    Replay,
}

fn arb_lifecycle_op() -> impl Strategy<Value = LifecycleOp> {
    prop_oneof![
        Just(LifecycleOp::Start),
        Just(LifecycleOp::Complete),
        Just(LifecycleOp::Reactivate),
        Just(LifecycleOp::Replay),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_from_messages_preserves_history(history in arb_history()) {
        let session = Session::from_messages(&history).unwrap();
        let out: Vec<Value> = session.messages().iter().map(Message::to_value).collect();
        prop_assert_eq!(out, history);
    }

    #[test]
    fn prop_export_roundtrip(history in arb_history()) {
        let mut session = Session::from_messages(&history).unwrap();
        session.reactivate();

        let reimported: Vec<Value> = session
            .messages_for_export()
            .into_iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();
        let rebuilt = Session::from_messages(&reimported).unwrap();
        prop_assert_eq!(rebuilt.messages(), session.messages());
    }

    #[test]
    fn prop_export_timestamps_span_session(
        history in proptest::collection::vec(arb_wire_message(), 2..20),
        duration_ms in 0i64..10_000_000,
    ) {
        let mut session = Session::from_messages(&history).unwrap();
        let start = Utc::now() - Duration::days(1);
        let end = start + Duration::milliseconds(duration_ms);
        session.start_time = Some(start);
        session.end_time = Some(end);

        let stamps: Vec<_> = session.messages_for_export().iter().map(|m| m.timestamp).collect();
        prop_assert_eq!(stamps.first().copied(), Some(start));
        prop_assert_eq!(stamps.last().copied(), Some(end));
        for pair in stamps.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn prop_lifecycle_never_touches_history(
        history in arb_history(),
        ops in proptest::collection::vec(arb_lifecycle_op(), 0..15),
    ) {
        let mut session = Session::from_messages(&history).unwrap();
        session.reactivate();
        session.exec(SpanKind::Answer, json!("x"), |v| v.clone()).unwrap();
        let messages = session.messages().to_vec();

        for op in ops {
            let was_active = session.is_active();
            let was_started = session.start_time().is_some();
            match op {
                LifecycleOp::Start => {
                    prop_assert_eq!(session.start().is_ok(), !was_started);
                }
                LifecycleOp::Complete => {
                    prop_assert_eq!(session.complete().is_ok(), was_active);
                    prop_assert!(session.is_completed());
                }
                LifecycleOp::Reactivate => {
                    session.reactivate();
                    prop_assert!(session.is_active());
                }
                LifecycleOp::Replay => {
                    prop_assert_eq!(session.replay(), Some(json!("x")));
                }
            }
            prop_assert_eq!(session.messages(), messages.as_slice());
            prop_assert_eq!(session.spans().len(), 1);
        }
    }
}
