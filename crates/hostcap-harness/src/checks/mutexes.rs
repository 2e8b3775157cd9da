//! Mutex check: create/lock/unlock/free pairing and misuse rejection.

use hostcap_core::CapError;
use hostcap_core::sync::MutexTable;

use crate::outcome::CheckOutcome;

const CHECK: &str = "mutexes";

/// Exercise one full mutex lifecycle plus the unpaired-unlock rejection.
pub fn run(mutexes: &MutexTable) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let id = mutexes.create();
    outcomes.push(CheckOutcome::pass(CHECK, "mutex_create", id.to_string()));

    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "mutex_lock",
        mutexes.lock(id).map(|()| format!("{id} locked")),
    ));
    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "mutex_unlock",
        mutexes.unlock(id).map(|()| format!("{id} unlocked")),
    ));

    outcomes.push(match mutexes.unlock(id) {
        Err(CapError::InvalidState(reason)) => {
            CheckOutcome::pass(CHECK, "mutex_unlock_unpaired", reason)
        }
        Err(err) => CheckOutcome::fail(CHECK, "mutex_unlock_unpaired", err.to_string()),
        Ok(()) => CheckOutcome::fail(
            CHECK,
            "mutex_unlock_unpaired",
            "unlock without a matching lock succeeded".to_string(),
        ),
    });

    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "mutex_free",
        mutexes.free(id).map(|()| format!("{id} freed")),
    ));

    outcomes
}
