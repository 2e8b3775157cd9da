//! Worker-thread check: the mutex-guarded lifecycle protocol.
//!
//! The worker entry routine sets the shared flag under lock, sleeps for
//! the configured duration, clears the flag under lock, and returns
//! "ok". The harness pre-sets the flag, starts the worker, polls until
//! the flag clears, then joins and re-reads the flag — the post-join
//! read must still observe `false`.

use std::sync::Arc;

use hostcap_core::clock;
use hostcap_core::sync::{MutexTable, WorkerFlag};
use hostcap_core::thread::ThreadTable;

use crate::config::HarnessConfig;
use crate::outcome::CheckOutcome;
use crate::poll::poll_until_clear;

const CHECK: &str = "threads";

/// Name the worker routine is registered under.
pub const WORKER_ENTRY: &str = "worker";

/// Run the worker-lifecycle protocol. A failed mutex or thread creation
/// aborts this check only; the outcomes collected so far are returned.
pub fn run(
    config: &HarnessConfig,
    mutexes: &Arc<MutexTable>,
    threads: &ThreadTable,
) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let flag = Arc::new(WorkerFlag::new(mutexes.create()));
    if let Err(err) = flag.store(mutexes, true) {
        outcomes.push(CheckOutcome::fail(CHECK, "flag_preset", err.to_string()));
        return outcomes;
    }
    outcomes.push(CheckOutcome::pass(
        CHECK,
        "flag_preset",
        format!("worker flag set under {}", flag.mutex()),
    ));

    let worker_sleep = config.worker_sleep_secs;
    let worker_mutexes = Arc::clone(mutexes);
    let worker_flag = Arc::clone(&flag);
    threads.register_entry(WORKER_ENTRY, move || {
        worker_flag.store(&worker_mutexes, true)?;
        clock::sleep(worker_sleep)?;
        worker_flag.store(&worker_mutexes, false)?;
        Ok("ok".to_string())
    });

    let id = match threads.prepare(WORKER_ENTRY) {
        Ok(id) => {
            outcomes.push(CheckOutcome::pass(CHECK, "thread_new", id.to_string()));
            id
        }
        Err(err) => {
            outcomes.push(CheckOutcome::fail(CHECK, "thread_new", err.to_string()));
            return outcomes;
        }
    };

    if let Err(err) = threads.create(id) {
        outcomes.push(CheckOutcome::fail(CHECK, "thread_create", err.to_string()));
        return outcomes;
    }
    outcomes.push(CheckOutcome::pass(
        CHECK,
        "thread_create",
        format!("{id} started"),
    ));

    outcomes.push(
        match poll_until_clear(&flag, mutexes, config.poll_interval_micros, config.poll_cap) {
            Ok(summary) => CheckOutcome::pass(
                CHECK,
                "poll_until_shutdown",
                format!("counted to {} while waiting", summary.iterations),
            ),
            Err(err) => CheckOutcome::fail(CHECK, "poll_until_shutdown", err.to_string()),
        },
    );

    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "thread_join",
        threads.join(id).map(|status| format!("worker returned '{status}'")),
    ));

    outcomes.push(match flag.load(mutexes) {
        Ok(false) => CheckOutcome::pass(
            CHECK,
            "flag_after_join",
            "flag observed clear after join".to_string(),
        ),
        Ok(true) => CheckOutcome::fail(
            CHECK,
            "flag_after_join",
            "flag still set after join".to_string(),
        ),
        Err(err) => CheckOutcome::fail(CHECK, "flag_after_join", err.to_string()),
    });

    outcomes.push(CheckOutcome::pass(
        CHECK,
        "thread_self",
        ThreadTable::current_label(),
    ));

    if let Err(err) = mutexes.free(flag.mutex()) {
        outcomes.push(CheckOutcome::fail(CHECK, "mutex_free", err.to_string()));
    }

    outcomes
}
