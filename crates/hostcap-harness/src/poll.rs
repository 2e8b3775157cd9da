//! Worker-completion polling.
//!
//! The primary thread busy-waits on the mutex-guarded worker flag,
//! sleeping briefly between polls and counting iterations. Every poll is
//! one lock/read/unlock; the guarding mutex's release/acquire pair makes
//! the worker's final write visible to the loop. The iteration cap turns
//! a wedged worker into a reportable `Timeout` instead of a hang.

use hostcap_core::clock;
use hostcap_core::error::{CapError, CapResult};
use hostcap_core::sync::{MutexTable, WorkerFlag};

/// How the wait went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    /// Polls made before the flag was observed clear.
    pub iterations: u64,
}

/// Poll `flag` until it reads `false`, sleeping `interval_micros` between
/// polls, giving up after `cap` iterations.
pub fn poll_until_clear(
    flag: &WorkerFlag,
    mutexes: &MutexTable,
    interval_micros: u64,
    cap: u64,
) -> CapResult<PollSummary> {
    let mut iterations: u64 = 0;
    while flag.load(mutexes)? {
        if iterations >= cap {
            return Err(CapError::Timeout(format!(
                "worker flag still set after {cap} polls"
            )));
        }
        clock::sleep_micros(interval_micros);
        iterations += 1;
    }
    Ok(PollSummary { iterations })
}
