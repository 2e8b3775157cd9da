//! Host identity and seedable randomness.
//!
//! The random stream is a global SplitMix64 generator behind a lock:
//! `set_random_seed` makes the stream reproducible, `pick_random_seed`
//! derives a fresh seed from wall-clock and address-space noise.

use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Display name of the host operating system.
#[must_use]
pub fn os_type() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Mac OS X",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        other => other,
    }
}

struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

static STREAM: Mutex<SplitMix64> = Mutex::new(SplitMix64::new(0));

/// Derive a fresh seed from the wall clock and a stack address.
#[must_use]
pub fn pick_random_seed() -> u64 {
    let probe = 0u8;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64 | (d.as_secs() << 32))
        .unwrap_or(1);
    nanos ^ (std::ptr::from_ref(&probe) as u64)
}

/// Reset the global stream to a known seed.
pub fn set_random_seed(seed: u64) {
    STREAM.lock().state = seed;
}

/// Next value from the global stream.
#[must_use]
pub fn next_random() -> u64 {
    STREAM.lock().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_type_is_a_known_display_name() {
        assert!(!os_type().is_empty());
        #[cfg(target_os = "linux")]
        assert_eq!(os_type(), "Linux");
    }

    // One test owns the global stream; parallel draws would interleave.
    #[test]
    fn seeded_stream_is_reproducible_and_advances() {
        set_random_seed(1234);
        let first: Vec<u64> = (0..4).map(|_| next_random()).collect();
        set_random_seed(1234);
        let second: Vec<u64> = (0..4).map(|_| next_random()).collect();
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }

    #[test]
    fn picked_seeds_vary() {
        // Two picks in a row may share the coarse clock; the address noise
        // still separates them across runs. Just require non-zero.
        assert_ne!(pick_random_seed(), 0);
    }
}
