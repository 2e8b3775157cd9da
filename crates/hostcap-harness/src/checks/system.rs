//! System check: host identity and seed-reproducible randomness.

use hostcap_core::system;

use crate::outcome::CheckOutcome;

const CHECK: &str = "system";

/// Report the OS name and verify the seeded stream reproduces.
pub fn run() -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    outcomes.push(CheckOutcome::pass(CHECK, "os_type", system::os_type()));

    let picked = system::pick_random_seed();
    outcomes.push(if picked != 0 {
        CheckOutcome::pass(CHECK, "pick_random_seed", format!("seed {picked}"))
    } else {
        CheckOutcome::fail(CHECK, "pick_random_seed", "zero seed".to_string())
    });

    system::set_random_seed(1234);
    let first = system::next_random();
    system::set_random_seed(1234);
    let second = system::next_random();
    outcomes.push(if first == second {
        CheckOutcome::pass(
            CHECK,
            "set_random_seed",
            format!("seed 1234 reproduces {first}"),
        )
    } else {
        CheckOutcome::fail(
            CHECK,
            "set_random_seed",
            format!("seed 1234 gave {first} then {second}"),
        )
    });

    outcomes
}
