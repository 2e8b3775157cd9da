//! Stack-trace check: capture through a three-level call chain.

use hostcap_core::trace::{self, FrameGuard, StackFrame};

use crate::outcome::CheckOutcome;

const CHECK: &str = "stacktrace";

fn failing_leaf() -> Vec<StackFrame> {
    let _frame = FrameGuard::enter("failing_leaf");
    trace::capture_recorded()
}

fn middle_caller() -> Vec<StackFrame> {
    let _frame = FrameGuard::enter("middle_caller");
    failing_leaf()
}

fn outer_caller() -> Vec<StackFrame> {
    let _frame = FrameGuard::enter("outer_caller");
    middle_caller()
}

/// Capture a trace from three recorded call levels and a best-effort
/// trace from whatever source is available.
pub fn run() -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let recorded = outer_caller();
    outcomes.push(if recorded.len() >= 3 {
        let rendered: Vec<String> = recorded.iter().map(ToString::to_string).collect();
        CheckOutcome::pass(
            CHECK,
            "capture_recorded",
            format!("{} frames: {}", recorded.len(), rendered.join(" <- ")),
        )
    } else {
        CheckOutcome::fail(
            CHECK,
            "capture_recorded",
            format!("expected >= 3 frames, captured {}", recorded.len()),
        )
    });

    let best_effort = trace::capture();
    outcomes.push(if best_effort.is_empty() {
        CheckOutcome::fail(CHECK, "capture", "empty trace".to_string())
    } else {
        CheckOutcome::pass(
            CHECK,
            "capture",
            format!("{} frames, newest '{}'", best_effort.len(), best_effort[0]),
        )
    });

    outcomes
}
