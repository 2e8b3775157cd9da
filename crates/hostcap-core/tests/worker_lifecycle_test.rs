//! Worker-lifecycle protocol: a mutex-guarded status flag shared between
//! the spawning thread and one worker, polled until the worker clears it.

use std::sync::Arc;

use hostcap_core::clock;
use hostcap_core::sync::{MutexTable, WorkerFlag};
use hostcap_core::thread::{ThreadState, ThreadTable};

#[test]
fn poll_loop_observes_worker_shutdown_before_join() {
    let mutexes = Arc::new(MutexTable::new());
    let threads = ThreadTable::new();

    let flag = Arc::new(WorkerFlag::new(mutexes.create()));
    flag.store(&mutexes, true).unwrap();

    let worker_mutexes = Arc::clone(&mutexes);
    let worker_flag = Arc::clone(&flag);
    threads.register_entry("worker", move || {
        worker_flag.store(&worker_mutexes, true)?;
        clock::sleep(0.05)?;
        worker_flag.store(&worker_mutexes, false)?;
        Ok("ok".to_string())
    });

    let id = threads.prepare("worker").unwrap();
    assert_eq!(threads.state(id).unwrap(), ThreadState::Init);
    threads.create(id).unwrap();

    // Busy-wait with a short sleep per poll, every poll under the lock.
    let mut iterations: u64 = 0;
    while flag.load(&mutexes).unwrap() {
        clock::sleep_micros(1_024);
        iterations += 1;
        assert!(iterations < 10_000, "worker never cleared the flag");
    }
    assert!(iterations > 0, "worker finished before the first poll");

    assert_eq!(threads.join(id).unwrap(), "ok");

    // The routine body completed before join returned, so its final write
    // must be visible here.
    assert!(!flag.load(&mutexes).unwrap());

    mutexes.free(flag.mutex()).unwrap();
}

#[test]
fn worker_identity_differs_from_spawner() {
    let threads = ThreadTable::new();
    threads.register_entry("who", || Ok(ThreadTable::current_label()));

    let id = threads.prepare("who").unwrap();
    threads.create(id).unwrap();
    let worker_label = threads.join(id).unwrap();

    assert_ne!(worker_label, ThreadTable::current_label());
    assert!(worker_label.contains("who"));
}
