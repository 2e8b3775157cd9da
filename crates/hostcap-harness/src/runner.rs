//! Fixed-order orchestration of every capability check.

use std::sync::Arc;

use hostcap_core::constants::NativeConstants;
use hostcap_core::signal::SignalRouter;
use hostcap_core::socket::SocketTable;
use hostcap_core::sync::MutexTable;
use hostcap_core::thread::ThreadTable;

use crate::checks;
use crate::config::HarnessConfig;
use crate::report::RunReport;

/// The family names, in the order a run emits them.
pub const CHECK_ORDER: &[&str] = &[
    "constants",
    "clock",
    "mutexes",
    "signals",
    "filesystem",
    "system",
    "sockets",
    "threads",
    "stacktrace",
];

/// Owns the capability tables for one verification run.
pub struct HarnessRunner {
    config: HarnessConfig,
    constants: NativeConstants,
    mutexes: Arc<MutexTable>,
    threads: ThreadTable,
    sockets: SocketTable,
    signals: SignalRouter,
}

impl HarnessRunner {
    /// Build a runner with fresh capability tables.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            constants: NativeConstants,
            mutexes: Arc::new(MutexTable::new()),
            threads: ThreadTable::new(),
            sockets: SocketTable::new(),
            signals: SignalRouter::new(),
        }
    }

    /// The run's configuration.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Execute every check in [`CHECK_ORDER`], collecting one outcome per
    /// exercised operation. A failing check records its failure and the
    /// run continues with the next family.
    pub fn run(&self) -> RunReport {
        let mut outcomes = Vec::new();

        outcomes.extend(checks::constants::run(&self.constants));
        outcomes.extend(checks::clock::run(&self.config));
        outcomes.extend(checks::mutexes::run(&self.mutexes));
        outcomes.extend(checks::signals::run(&self.constants, &self.signals));
        outcomes.extend(checks::filesystem::run(&self.config));
        outcomes.extend(checks::system::run());
        outcomes.extend(checks::sockets::run(&self.config, &self.sockets));
        outcomes.extend(checks::threads::run(&self.config, &self.mutexes, &self.threads));
        outcomes.extend(checks::stacktrace::run());

        RunReport::from_outcomes(outcomes)
    }
}
