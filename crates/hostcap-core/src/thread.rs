//! Worker thread lifecycle.
//!
//! Entry routines are registered by name; a [`ThreadId`] binds one
//! prepared worker to one routine. Lifecycle: Init (prepared) → Running
//! (spawned) → Halt (routine returned) → Stopped (joined), or Error when
//! the routine fails or panics. `join` consumes the handle; every
//! prepared worker must be joined exactly once.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use crate::error::{CapError, CapResult};

/// Identifies one prepared worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(pub u64);

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "thread#{}", self.0)
    }
}

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ThreadState {
    Init = 0,
    Running = 1,
    Halt = 2,
    Stopped = 3,
    Error = 4,
}

impl ThreadState {
    fn from_raw(raw: u8) -> ThreadState {
        match raw {
            1 => ThreadState::Running,
            2 => ThreadState::Halt,
            3 => ThreadState::Stopped,
            4 => ThreadState::Error,
            _ => ThreadState::Init,
        }
    }

    /// Display name for the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadState::Init => "init",
            ThreadState::Running => "running",
            ThreadState::Halt => "halt",
            ThreadState::Stopped => "stopped",
            ThreadState::Error => "error",
        }
    }
}

type EntryRoutine = Arc<dyn Fn() -> CapResult<String> + Send + Sync>;

struct Worker {
    entry_name: String,
    entry: EntryRoutine,
    state: Arc<AtomicU8>,
    join: Option<std::thread::JoinHandle<CapResult<String>>>,
}

/// Registry of entry routines and prepared workers.
#[derive(Default)]
pub struct ThreadTable {
    entries: Mutex<HashMap<String, EntryRoutine>>,
    workers: Mutex<HashMap<u64, Worker>>,
    next_id: AtomicU64,
}

impl ThreadTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            workers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `routine` under `name`, replacing any earlier registration.
    pub fn register_entry<F>(&self, name: &str, routine: F)
    where
        F: Fn() -> CapResult<String> + Send + Sync + 'static,
    {
        self.entries
            .lock()
            .insert(name.to_string(), Arc::new(routine));
    }

    /// Bind a new worker to the routine registered under `entry_name`.
    pub fn prepare(&self, entry_name: &str) -> CapResult<ThreadId> {
        let entry = self
            .entries
            .lock()
            .get(entry_name)
            .cloned()
            .ok_or_else(|| CapError::NotFound(format!("entry routine '{entry_name}'")))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.workers.lock().insert(
            id,
            Worker {
                entry_name: entry_name.to_string(),
                entry,
                state: Arc::new(AtomicU8::new(ThreadState::Init as u8)),
                join: None,
            },
        );
        Ok(ThreadId(id))
    }

    /// Start execution of a prepared worker.
    pub fn create(&self, id: ThreadId) -> CapResult<()> {
        let mut workers = self.workers.lock();
        let worker = workers
            .get_mut(&id.0)
            .ok_or(CapError::InvalidHandle(id.0))?;
        if worker.join.is_some() {
            return Err(CapError::InvalidState(format!("{id} is already running")));
        }

        let entry = Arc::clone(&worker.entry);
        let state = Arc::clone(&worker.state);
        let handle = std::thread::Builder::new()
            .name(worker.entry_name.clone())
            .spawn(move || {
                state.store(ThreadState::Running as u8, Ordering::Release);
                let result = entry();
                let exit_state = if result.is_ok() {
                    ThreadState::Halt
                } else {
                    ThreadState::Error
                };
                state.store(exit_state as u8, Ordering::Release);
                result
            })
            .map_err(|err| CapError::ThreadCreateFailed(err.to_string()))?;

        worker.join = Some(handle);
        Ok(())
    }

    /// Block until the worker's routine returns, consuming the handle.
    ///
    /// Returns the routine's status string. A routine error propagates; a
    /// panicked routine surfaces as `InvalidState` with the worker left in
    /// state Error. The routine body (including its final shared-state
    /// writes) is complete before this returns.
    pub fn join(&self, id: ThreadId) -> CapResult<String> {
        let (handle, state) = {
            let mut workers = self.workers.lock();
            let worker = workers
                .get_mut(&id.0)
                .ok_or(CapError::InvalidHandle(id.0))?;
            let handle = worker.join.take().ok_or_else(|| {
                CapError::InvalidState(format!("{id} was never started"))
            })?;
            (handle, Arc::clone(&worker.state))
        };

        let result = match handle.join() {
            Ok(Ok(status)) => {
                state.store(ThreadState::Stopped as u8, Ordering::Release);
                Ok(status)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                state.store(ThreadState::Error as u8, Ordering::Release);
                Err(CapError::InvalidState(format!("{id} panicked")))
            }
        };

        self.workers.lock().remove(&id.0);
        result
    }

    /// Current lifecycle state of a prepared worker.
    pub fn state(&self, id: ThreadId) -> CapResult<ThreadState> {
        let workers = self.workers.lock();
        let worker = workers.get(&id.0).ok_or(CapError::InvalidHandle(id.0))?;
        Ok(ThreadState::from_raw(worker.state.load(Ordering::Acquire)))
    }

    /// Printable identity of the calling thread.
    #[must_use]
    pub fn current_label() -> String {
        let current = std::thread::current();
        match current.name() {
            Some(name) => format!("{name} ({:?})", current.id()),
            None => format!("{:?}", current.id()),
        }
    }
}
