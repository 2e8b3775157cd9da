//! Constant-registry check: every expected key resolves.

use hostcap_core::constants::{
    CORE_KEYS, ConstantProvider, SIGNAL_KEYS, SIZE_KEYS, SOCKET_KEYS, THREAD_KEYS,
};

use crate::outcome::CheckOutcome;

const CHECK: &str = "constants";

/// Look up every registry key group in display order.
pub fn run(provider: &dyn ConstantProvider) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();
    for group in [CORE_KEYS, SIZE_KEYS, SIGNAL_KEYS, SOCKET_KEYS, THREAD_KEYS] {
        for key in group {
            outcomes.push(CheckOutcome::from_result(
                CHECK,
                key,
                provider.constant(key),
            ));
        }
    }
    outcomes
}
