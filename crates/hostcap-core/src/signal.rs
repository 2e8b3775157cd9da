//! Cooperative signal dispatch.
//!
//! Handlers are typed callbacks stored in a table indexed by
//! [`SignalKind`], resolved at registration time. [`SignalRouter::raise`]
//! invokes the most recently registered handler for that kind
//! synchronously on the calling thread and hands its status string back to
//! the caller. Registration is last-write-wins; the earlier handler is
//! dropped silently.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CapError, CapResult};

// ---------------------------------------------------------------------------
// Signal kinds
// ---------------------------------------------------------------------------

/// The signal classes the capability layer dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Interrupt,
    Terminate,
    Segfault,
    UserOne,
    UserTwo,
    Quit,
    Abort,
    FloatingPointException,
    Illegal,
}

impl SignalKind {
    /// All kinds, in registry order.
    pub const ALL: [SignalKind; 9] = [
        SignalKind::Interrupt,
        SignalKind::Terminate,
        SignalKind::Segfault,
        SignalKind::UserOne,
        SignalKind::UserTwo,
        SignalKind::Quit,
        SignalKind::Abort,
        SignalKind::FloatingPointException,
        SignalKind::Illegal,
    ];

    /// Display name for the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Interrupt => "interrupt",
            SignalKind::Terminate => "terminate",
            SignalKind::Segfault => "segfault",
            SignalKind::UserOne => "user one",
            SignalKind::UserTwo => "user two",
            SignalKind::Quit => "quit",
            SignalKind::Abort => "abort",
            SignalKind::FloatingPointException => "floating point exception",
            SignalKind::Illegal => "illegal instruction",
        }
    }

    /// The host's native number for this kind.
    #[must_use]
    pub fn native(self) -> i32 {
        match self {
            SignalKind::Interrupt => libc::SIGINT,
            SignalKind::Terminate => libc::SIGTERM,
            SignalKind::Segfault => libc::SIGSEGV,
            SignalKind::UserOne => libc::SIGUSR1,
            SignalKind::UserTwo => libc::SIGUSR2,
            SignalKind::Quit => libc::SIGQUIT,
            SignalKind::Abort => libc::SIGABRT,
            SignalKind::FloatingPointException => libc::SIGFPE,
            SignalKind::Illegal => libc::SIGILL,
        }
    }

    /// Resolve a native signal number back to a kind.
    pub fn from_raw(raw: i64) -> CapResult<SignalKind> {
        Self::ALL
            .into_iter()
            .find(|kind| i64::from(kind.native()) == raw)
            .ok_or(CapError::UnknownSignal(raw))
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Identifies one registration; superseded by later registrations for the
/// same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationId(pub u64);

type Handler = Box<dyn FnMut(SignalKind) -> String + Send>;

struct Entry {
    id: RegistrationId,
    handler: Handler,
}

/// Typed signal-handler table with synchronous dispatch.
pub struct SignalRouter {
    slots: Mutex<[Option<Entry>; 9]>,
    dispatch: Mutex<()>,
    next_id: AtomicU64,
}

impl Default for SignalRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalRouter {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(std::array::from_fn(|_| None)),
            dispatch: Mutex::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Install `handler` for `kind`, replacing any earlier registration.
    pub fn register<F>(&self, kind: SignalKind, handler: F) -> RegistrationId
    where
        F: FnMut(SignalKind) -> String + Send + 'static,
    {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut slots = self.slots.lock();
        slots[kind.index()] = Some(Entry {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Whether a handler is currently installed for `kind`.
    #[must_use]
    pub fn registered(&self, kind: SignalKind) -> bool {
        self.slots.lock()[kind.index()].is_some()
    }

    /// Deliver `kind` to its handler on the calling thread.
    ///
    /// Returns the handler's status string, or `None` when no handler is
    /// installed. Delivery is serialized: no two handlers run
    /// concurrently. Handlers must not raise from within a handler.
    pub fn raise(&self, kind: SignalKind) -> Option<String> {
        let _delivery = self.dispatch.lock();

        // Take the entry out so the handler can re-register without
        // holding the table lock.
        let mut entry = self.slots.lock()[kind.index()].take()?;
        let result = (entry.handler)(kind);

        let mut slots = self.slots.lock();
        let slot = &mut slots[kind.index()];
        // Last-write-wins: keep a replacement installed during the call.
        if slot.is_none() {
            *slot = Some(entry);
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn raise_invokes_registered_handler_once() {
        let router = SignalRouter::new();
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        router.register(SignalKind::Abort, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            "ok".to_string()
        });

        assert_eq!(router.raise(SignalKind::Abort).as_deref(), Some("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn raise_without_handler_returns_none() {
        let router = SignalRouter::new();
        assert_eq!(router.raise(SignalKind::Quit), None);
    }

    #[test]
    fn reregistration_is_last_write_wins() {
        let router = SignalRouter::new();
        let first = router.register(SignalKind::Terminate, |_| "first".to_string());
        let second = router.register(SignalKind::Terminate, |_| "second".to_string());
        assert_ne!(first, second);
        assert_eq!(
            router.raise(SignalKind::Terminate).as_deref(),
            Some("second")
        );
    }

    #[test]
    fn handler_survives_raise() {
        let router = SignalRouter::new();
        router.register(SignalKind::Interrupt, |k| k.as_str().to_string());
        assert_eq!(
            router.raise(SignalKind::Interrupt).as_deref(),
            Some("interrupt")
        );
        assert!(router.registered(SignalKind::Interrupt));
        assert_eq!(
            router.raise(SignalKind::Interrupt).as_deref(),
            Some("interrupt")
        );
    }

    #[test]
    fn kinds_round_trip_through_native_numbers() {
        for kind in SignalKind::ALL {
            let raw = i64::from(kind.native());
            assert_eq!(SignalKind::from_raw(raw).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_raw_number_is_rejected() {
        let err = SignalKind::from_raw(-1).unwrap_err();
        assert!(matches!(err, CapError::UnknownSignal(-1)));
    }

    #[test]
    fn display_names_are_unique() {
        let mut names: Vec<&str> = SignalKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SignalKind::ALL.len());
    }
}
