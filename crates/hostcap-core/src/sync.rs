//! Handle-based mutual exclusion.
//!
//! [`MutexTable`] hands out opaque [`MutexId`]s backed by raw
//! `parking_lot` mutexes, with the holder thread tracked so the
//! lock/unlock pairing contract is checkable: unlock by a non-holder (or
//! of an unlocked mutex) fails instead of corrupting the lock.
//!
//! [`WorkerFlag`] is the shared cell the worker-lifecycle protocol
//! exercises: a boolean whose every read and write happens under one
//! guarding mutex. The flag's API takes the table on each access, so no
//! unguarded path exists. The mutex's release/acquire pair makes a write
//! by one thread visible to the next locker.

use parking_lot::Mutex;
use parking_lot::lock_api::RawMutex as _;
use std::cell::UnsafeCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::ThreadId;

use crate::error::{CapError, CapResult};

/// Identifies one lock in a [`MutexTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutexId(pub u64);

impl std::fmt::Display for MutexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mutex#{}", self.0)
    }
}

struct Slot {
    raw: parking_lot::RawMutex,
    holder: Mutex<Option<ThreadId>>,
}

/// Registry of live mutexes.
#[derive(Default)]
pub struct MutexTable {
    slots: Mutex<HashMap<u64, Arc<Slot>>>,
    next_id: AtomicU64,
}

impl MutexTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate a new unlocked mutex.
    pub fn create(&self) -> MutexId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots.lock().insert(
            id,
            Arc::new(Slot {
                raw: parking_lot::RawMutex::INIT,
                holder: Mutex::new(None),
            }),
        );
        MutexId(id)
    }

    fn slot(&self, id: MutexId) -> CapResult<Arc<Slot>> {
        self.slots
            .lock()
            .get(&id.0)
            .cloned()
            .ok_or(CapError::InvalidHandle(id.0))
    }

    /// Acquire `id`, blocking until it is available.
    pub fn lock(&self, id: MutexId) -> CapResult<()> {
        let slot = self.slot(id)?;
        slot.raw.lock();
        *slot.holder.lock() = Some(std::thread::current().id());
        Ok(())
    }

    /// Release `id`. Fails with `InvalidState` unless the calling thread
    /// is the current holder.
    pub fn unlock(&self, id: MutexId) -> CapResult<()> {
        let slot = self.slot(id)?;
        let mut holder = slot.holder.lock();
        if *holder != Some(std::thread::current().id()) {
            return Err(CapError::InvalidState(format!(
                "{id} is not held by the calling thread"
            )));
        }
        *holder = None;
        drop(holder);
        // SAFETY: the holder check above proves this thread owns the raw
        // lock, which is the contract `RawMutex::unlock` requires.
        unsafe { slot.raw.unlock() };
        Ok(())
    }

    /// Destroy `id`. Fails with `InvalidState` while the mutex is held.
    pub fn free(&self, id: MutexId) -> CapResult<()> {
        let slot = self.slot(id)?;
        if !slot.raw.try_lock() {
            return Err(CapError::InvalidState(format!("{id} is still locked")));
        }
        // SAFETY: try_lock succeeded on this thread just above.
        unsafe { slot.raw.unlock() };
        self.slots.lock().remove(&id.0);
        Ok(())
    }

    /// Number of live mutexes (diagnostic).
    #[must_use]
    pub fn live(&self) -> usize {
        self.slots.lock().len()
    }
}

// ---------------------------------------------------------------------------
// Guarded worker flag
// ---------------------------------------------------------------------------

/// A boolean shared between the harness and its worker thread, readable
/// and writable only under the guarding mutex fixed at construction.
pub struct WorkerFlag {
    mutex: MutexId,
    cell: UnsafeCell<bool>,
}

// SAFETY: the only access paths, `load` and `store`, hold the guarding
// mutex for the duration of the access; the lock's release/acquire pair
// orders the plain read/write between threads.
unsafe impl Send for WorkerFlag {}
unsafe impl Sync for WorkerFlag {}

impl WorkerFlag {
    /// Bind a new flag (initially `false`) to its guarding mutex.
    #[must_use]
    pub fn new(mutex: MutexId) -> Self {
        Self {
            mutex,
            cell: UnsafeCell::new(false),
        }
    }

    /// The guarding mutex handle.
    #[must_use]
    pub fn mutex(&self) -> MutexId {
        self.mutex
    }

    /// Write `value` under the guarding mutex.
    pub fn store(&self, table: &MutexTable, value: bool) -> CapResult<()> {
        table.lock(self.mutex)?;
        // SAFETY: the guarding mutex is held; no other access path exists.
        unsafe { *self.cell.get() = value };
        table.unlock(self.mutex)
    }

    /// Read the value under the guarding mutex.
    pub fn load(&self, table: &MutexTable) -> CapResult<bool> {
        table.lock(self.mutex)?;
        // SAFETY: the guarding mutex is held; no other access path exists.
        let value = unsafe { *self.cell.get() };
        table.unlock(self.mutex)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn lock_unlock_pair() {
        let table = MutexTable::new();
        let id = table.create();
        table.lock(id).unwrap();
        table.unlock(id).unwrap();
        table.free(id).unwrap();
        assert_eq!(table.live(), 0);
    }

    #[test]
    fn unlock_without_hold_is_invalid_state() {
        let table = MutexTable::new();
        let id = table.create();
        assert!(matches!(
            table.unlock(id),
            Err(CapError::InvalidState(_))
        ));
        table.free(id).unwrap();
    }

    #[test]
    fn unlock_from_other_thread_is_invalid_state() {
        let table = Arc::new(MutexTable::new());
        let id = table.create();
        table.lock(id).unwrap();

        let other = Arc::clone(&table);
        let result = std::thread::spawn(move || other.unlock(id))
            .join()
            .unwrap();
        assert!(matches!(result, Err(CapError::InvalidState(_))));

        table.unlock(id).unwrap();
        table.free(id).unwrap();
    }

    #[test]
    fn free_while_locked_is_invalid_state() {
        let table = MutexTable::new();
        let id = table.create();
        table.lock(id).unwrap();
        assert!(matches!(table.free(id), Err(CapError::InvalidState(_))));
        table.unlock(id).unwrap();
        table.free(id).unwrap();
    }

    #[test]
    fn operations_on_unknown_handle_fail() {
        let table = MutexTable::new();
        let bogus = MutexId(999);
        assert!(matches!(table.lock(bogus), Err(CapError::InvalidHandle(999))));
        assert!(matches!(table.free(bogus), Err(CapError::InvalidHandle(999))));
    }

    #[test]
    fn mutual_exclusion_under_contention() {
        let table = Arc::new(MutexTable::new());
        let id = table.create();
        let in_critical = Arc::new(AtomicBool::new(false));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let table = Arc::clone(&table);
                let in_critical = Arc::clone(&in_critical);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        table.lock(id).unwrap();
                        assert!(!in_critical.swap(true, Ordering::SeqCst));
                        std::hint::spin_loop();
                        in_critical.store(false, Ordering::SeqCst);
                        table.unlock(id).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        table.free(id).unwrap();
    }

    #[test]
    fn flag_store_and_load_round_trip() {
        let table = MutexTable::new();
        let flag = WorkerFlag::new(table.create());
        assert!(!flag.load(&table).unwrap());
        flag.store(&table, true).unwrap();
        assert!(flag.load(&table).unwrap());
        table.free(flag.mutex()).unwrap();
    }

    #[test]
    fn flag_write_is_visible_across_threads() {
        let table = Arc::new(MutexTable::new());
        let flag = Arc::new(WorkerFlag::new(table.create()));

        let writer_table = Arc::clone(&table);
        let writer_flag = Arc::clone(&flag);
        std::thread::spawn(move || writer_flag.store(&writer_table, true).unwrap())
            .join()
            .unwrap();

        assert!(flag.load(&table).unwrap());
        table.free(flag.mutex()).unwrap();
    }
}
