//! Monotonic clock and sleep primitives.
//!
//! A [`Timestamp`] is an opaque instant; it is useful only by subtraction
//! against a later `now()`. Elapsed values are non-negative and
//! non-decreasing for repeated reads against the same start. Sleeps block
//! the calling thread for at least the requested duration; the OS
//! scheduler provides no upper bound.

use std::time::{Duration, Instant};

use crate::error::{CapError, CapResult};

/// An opaque monotonic instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp(Instant);

/// Capture the current monotonic instant.
#[must_use]
pub fn now() -> Timestamp {
    Timestamp(Instant::now())
}

/// Fractional seconds elapsed since `start`.
#[must_use]
pub fn elapsed(start: Timestamp) -> f64 {
    start.0.elapsed().as_secs_f64()
}

/// Whole microseconds elapsed since `start`.
#[must_use]
pub fn elapsed_micros(start: Timestamp) -> u64 {
    u64::try_from(start.0.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// Block the calling thread for `seconds`.
///
/// Negative or non-finite durations fail with `InvalidArgument` rather
/// than being clamped.
pub fn sleep(seconds: f64) -> CapResult<()> {
    let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
        CapError::InvalidArgument(format!(
            "sleep duration {seconds} is not a representable non-negative value"
        ))
    })?;
    std::thread::sleep(duration);
    Ok(())
}

/// Block the calling thread for `us` microseconds.
pub fn sleep_micros(us: u64) {
    std::thread::sleep(Duration::from_micros(us));
}

/// Block the calling thread for `ns` nanoseconds.
pub fn sleep_nanos(ns: u64) {
    std::thread::sleep(Duration::from_nanos(ns));
}
