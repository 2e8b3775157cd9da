//! Run configuration.

use std::path::PathBuf;

/// Tunable inputs for one verification run.
///
/// Defaults mirror the canonical run: a 1-second receive budget drained
/// in 4-byte chunks from a public HTTP endpoint, a 2-second worker, and
/// ~1 ms between completion polls.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Peer for the socket check.
    pub host: String,
    /// Peer port for the socket check.
    pub port: u16,
    /// Total receive deadline budget, in seconds.
    pub budget_secs: f64,
    /// Per-attempt receive size, in bytes.
    pub chunk_size: usize,
    /// File whose existence/length/mtime the filesystem check probes.
    pub probe_file: PathBuf,
    /// Directory the filesystem check may create and delete entries in.
    pub scratch_dir: PathBuf,
    /// Skip checks that need a reachable network peer.
    pub skip_network: bool,
    /// Duration of the whole-second clock sleep check.
    pub clock_sleep_secs: f64,
    /// How long the worker routine sleeps between its flag writes.
    pub worker_sleep_secs: f64,
    /// Sleep between completion polls, in microseconds.
    pub poll_interval_micros: u64,
    /// Poll iterations after which the thread check gives up.
    pub poll_cap: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            host: "www.google.com".to_string(),
            port: 80,
            budget_secs: 1.0,
            chunk_size: 4,
            probe_file: PathBuf::from("Cargo.toml"),
            scratch_dir: std::env::temp_dir(),
            skip_network: false,
            clock_sleep_secs: 1.0,
            worker_sleep_secs: 2.0,
            poll_interval_micros: 1_024,
            poll_cap: 100_000,
        }
    }
}
