//! Best-effort stack-trace capture.
//!
//! Two frame sources, tried in order:
//!
//! 1. The native backtrace, when the build captures symbol names
//!    (`std::backtrace`, enabled via `RUST_BACKTRACE`).
//! 2. A recorded caller chain: functions that opt in wrap their body in a
//!    [`FrameGuard`], which pushes the function's name onto a
//!    thread-local stack on entry and pops it on drop. This is the
//!    portable fallback for builds without native frame data.
//!
//! `capture` never fails: an unusable native trace falls back to the
//! recorded chain, an empty recorded chain degrades to a single
//! `"unknown"` frame, and a frame whose name cannot be determined is
//! recorded as `"unknown"`.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;

/// One captured frame descriptor, newest-first in a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name, or `"unknown"`.
    pub function: String,
}

impl std::fmt::Display for StackFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.function)
    }
}

/// Placeholder for a frame whose name could not be determined.
pub const UNKNOWN_FRAME: &str = "unknown";

thread_local! {
    static RECORDED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Scope guard recording one frame on the calling thread's chain.
pub struct FrameGuard(());

impl FrameGuard {
    /// Record entry into `function` until the guard drops.
    #[must_use]
    pub fn enter(function: &str) -> FrameGuard {
        let name = if function.trim().is_empty() {
            UNKNOWN_FRAME.to_string()
        } else {
            function.to_string()
        };
        RECORDED.with(|frames| frames.borrow_mut().push(name));
        FrameGuard(())
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        RECORDED.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

/// Depth of the calling thread's recorded chain.
#[must_use]
pub fn recorded_depth() -> usize {
    RECORDED.with(|frames| frames.borrow().len())
}

/// Capture the calling thread's recorded caller chain, newest-first.
///
/// Degrades to a single `"unknown"` frame when nothing was recorded.
#[must_use]
pub fn capture_recorded() -> Vec<StackFrame> {
    let mut frames: Vec<StackFrame> = RECORDED.with(|recorded| {
        recorded
            .borrow()
            .iter()
            .rev()
            .map(|name| StackFrame {
                function: name.clone(),
            })
            .collect()
    });
    if frames.is_empty() {
        frames.push(StackFrame {
            function: UNKNOWN_FRAME.to_string(),
        });
    }
    frames
}

/// Split a rendered native backtrace into frame descriptors.
///
/// Frame lines look like `  12: symbol::path`; anything else (file/line
/// continuations) is skipped. Returns `None` when no frames parse.
fn parse_native(rendered: &str) -> Option<Vec<StackFrame>> {
    let mut frames = Vec::new();
    for line in rendered.lines() {
        let trimmed = line.trim_start();
        let Some((index, rest)) = trimmed.split_once(':') else {
            continue;
        };
        if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let name = rest.trim();
        frames.push(StackFrame {
            function: if name.is_empty() {
                UNKNOWN_FRAME.to_string()
            } else {
                name.to_string()
            },
        });
    }
    if frames.is_empty() { None } else { Some(frames) }
}

/// Capture a stack trace, preferring the native source.
///
/// Never fails; see the module docs for the degradation ladder.
#[must_use]
pub fn capture() -> Vec<StackFrame> {
    let native = Backtrace::capture();
    if native.status() == BacktraceStatus::Captured {
        if let Some(frames) = parse_native(&native.to_string()) {
            return frames;
        }
    }
    capture_recorded()
}
