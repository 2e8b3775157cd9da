//! Signal check: registration, synchronous delivery, display names.

use hostcap_core::constants::{ConstantProvider, ConstantValue};
use hostcap_core::signal::{SignalKind, SignalRouter};

use crate::outcome::CheckOutcome;

const CHECK: &str = "signals";

/// Register a handler for abort (resolved through the constants
/// registry, the way a scripted caller would), raise it, and verify the
/// handler's status string comes back.
pub fn run(provider: &dyn ConstantProvider, signals: &SignalRouter) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let raw = match provider.constant("SIGNAL_ABORT") {
        Ok(ConstantValue::Int(raw)) => raw,
        Ok(other) => {
            outcomes.push(CheckOutcome::fail(
                CHECK,
                "signal_constant",
                format!("SIGNAL_ABORT is not an integer: {other}"),
            ));
            return outcomes;
        }
        Err(err) => {
            outcomes.push(CheckOutcome::fail(CHECK, "signal_constant", err.to_string()));
            return outcomes;
        }
    };
    outcomes.push(CheckOutcome::pass(
        CHECK,
        "signal_constant",
        format!("SIGNAL_ABORT => {raw}"),
    ));

    let kind = match SignalKind::from_raw(raw) {
        Ok(kind) => kind,
        Err(err) => {
            outcomes.push(CheckOutcome::fail(CHECK, "signal_resolve", err.to_string()));
            return outcomes;
        }
    };
    outcomes.push(CheckOutcome::pass(
        CHECK,
        "signal_resolve",
        format!("{raw} => {kind}"),
    ));

    let registration = signals.register(kind, |_| "ok".to_string());
    outcomes.push(CheckOutcome::pass(
        CHECK,
        "signal_register",
        format!("registration {}", registration.0),
    ));

    outcomes.push(match signals.raise(kind) {
        Some(result) if result == "ok" => {
            CheckOutcome::pass(CHECK, "signal_raise", format!("handler returned '{result}'"))
        }
        Some(result) => CheckOutcome::fail(
            CHECK,
            "signal_raise",
            format!("unexpected handler result '{result}'"),
        ),
        None => CheckOutcome::fail(CHECK, "signal_raise", "no handler invoked".to_string()),
    });

    outcomes.push(CheckOutcome::pass(
        CHECK,
        "signal_to_string",
        format!("{raw} => \"{}\"", kind.as_str()),
    ));

    outcomes.push(match SignalKind::from_raw(-1) {
        Err(err) => CheckOutcome::pass(CHECK, "signal_rejects_unknown", err.to_string()),
        Ok(kind) => CheckOutcome::fail(
            CHECK,
            "signal_rejects_unknown",
            format!("-1 resolved to {kind}"),
        ),
    });

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::CheckStatus;
    use hostcap_core::constants::NativeConstants;

    #[test]
    fn abort_round_trip_passes() {
        let outcomes = run(&NativeConstants, &SignalRouter::new());
        assert!(outcomes.iter().all(|o| o.status == CheckStatus::Pass));
        assert!(outcomes.iter().any(|o| o.operation == "signal_raise"));
    }

    #[test]
    fn handler_remains_installed_after_the_check() {
        let signals = SignalRouter::new();
        run(&NativeConstants, &signals);
        assert!(signals.registered(SignalKind::Abort));
    }
}
