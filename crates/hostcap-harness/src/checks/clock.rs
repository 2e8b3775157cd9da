//! Clock check: elapsed-time monotonicity and sleep granularities.

use hostcap_core::clock;

use crate::config::HarnessConfig;
use crate::outcome::CheckOutcome;

const CHECK: &str = "clock";

/// Exercise timestamps, elapsed readings, and the three sleep
/// granularities against one start instant.
pub fn run(config: &HarnessConfig) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let start = clock::now();
    outcomes.push(CheckOutcome::pass(CHECK, "now", "instant captured"));

    let first = clock::elapsed(start);
    outcomes.push(if first >= 0.0 {
        CheckOutcome::pass(CHECK, "elapsed", format!("{first:.6}s"))
    } else {
        CheckOutcome::fail(CHECK, "elapsed", format!("negative: {first}"))
    });

    let first_us = clock::elapsed_micros(start);
    outcomes.push(CheckOutcome::pass(
        CHECK,
        "elapsed_micros",
        format!("{first_us}us"),
    ));

    let requested = config.clock_sleep_secs;
    match clock::sleep(requested) {
        Ok(()) => {
            let after_sleep = clock::elapsed(start);
            outcomes.push(if after_sleep >= first + requested {
                CheckOutcome::pass(
                    CHECK,
                    "sleep",
                    format!("slept {requested}s, elapsed {after_sleep:.6}s"),
                )
            } else {
                CheckOutcome::fail(
                    CHECK,
                    "sleep",
                    format!("woke early: {after_sleep:.6}s < {requested}s"),
                )
            });
        }
        Err(err) => outcomes.push(CheckOutcome::fail(CHECK, "sleep", err.to_string())),
    }

    let before_usleep = clock::elapsed_micros(start);
    clock::sleep_micros(1_024);
    let after_usleep = clock::elapsed_micros(start);
    outcomes.push(if after_usleep >= before_usleep + 1_024 {
        CheckOutcome::pass(
            CHECK,
            "sleep_micros",
            format!("slept 1024us, elapsed {after_usleep}us"),
        )
    } else {
        CheckOutcome::fail(
            CHECK,
            "sleep_micros",
            format!("woke early: {after_usleep}us"),
        )
    });

    let before_nanosleep = clock::elapsed(start);
    clock::sleep_nanos(131_072);
    let after_nanosleep = clock::elapsed(start);
    outcomes.push(if after_nanosleep >= before_nanosleep {
        CheckOutcome::pass(
            CHECK,
            "sleep_nanos",
            format!("slept 131072ns, elapsed {after_nanosleep:.6}s"),
        )
    } else {
        CheckOutcome::fail(CHECK, "sleep_nanos", "elapsed regressed".to_string())
    });

    outcomes.push(match clock::sleep(-1.0) {
        Err(err) => CheckOutcome::pass(CHECK, "sleep_rejects_negative", err.to_string()),
        Ok(()) => CheckOutcome::fail(
            CHECK,
            "sleep_rejects_negative",
            "negative duration accepted".to_string(),
        ),
    });

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::CheckStatus;

    fn quick_config() -> HarnessConfig {
        HarnessConfig {
            clock_sleep_secs: 0.01,
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn all_clock_operations_pass() {
        let outcomes = run(&quick_config());
        assert!(outcomes.iter().all(|o| o.status == CheckStatus::Pass));
    }

    #[test]
    fn operations_are_emitted_in_order() {
        let outcomes = run(&quick_config());
        let labels: Vec<&str> = outcomes.iter().map(|o| o.operation.as_str()).collect();
        assert_eq!(
            labels,
            [
                "now",
                "elapsed",
                "elapsed_micros",
                "sleep",
                "sleep_micros",
                "sleep_nanos",
                "sleep_rejects_negative",
            ]
        );
    }
}
