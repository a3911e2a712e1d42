//! Proptest strategies for log lines and digest inputs.

use proptest::prelude::*;

/// Lines with no classifier marker in them.
pub fn strategy_quiet_line() -> impl Strategy<Value = String> {
    "[a-z0-9 :.,%=()]{0,60}"
}

pub fn strategy_failure_line() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["ERROR", "CRITICAL", "NOT FOUND"]),
        "[a-z0-9 :.,]{0,40}",
    )
        .prop_map(|(marker, rest)| format!("{marker} {rest}"))
}

pub fn strategy_warning_line() -> impl Strategy<Value = String> {
    "[a-z0-9 :.,]{0,40}".prop_map(|rest| format!("WARNING {rest}"))
}

/// Any mix of quiet, warning and failure lines.
pub fn strategy_log_line() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => strategy_quiet_line(),
        1 => strategy_warning_line(),
        1 => strategy_failure_line(),
    ]
}

pub fn strategy_log_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(strategy_log_line(), 0..30)
}
