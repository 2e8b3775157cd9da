//! Deadline-budget receive accumulation.
//!
//! [`drain_with_budget`] models a cooperative, poll-driven drain of a
//! streaming source under one wall-clock limit: each bounded receive
//! attempt is handed the *remaining* budget, its elapsed time is
//! subtracted afterward, and the loop ends when the source reports
//! no-more-data or the budget runs out. The receive primitive itself
//! never loops.

use hostcap_core::CapResult;
use hostcap_core::clock;

/// Why the drain loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The source reported timeout/EOF (`None`) before the budget ran out.
    SourceClosed,
    /// The remaining budget reached zero first.
    BudgetExhausted,
}

impl Termination {
    /// Display name for the termination cause.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Termination::SourceClosed => "source closed",
            Termination::BudgetExhausted => "budget exhausted",
        }
    }
}

/// Accumulated result of one drain.
#[derive(Debug)]
pub struct DrainSummary {
    /// Everything the source yielded, in arrival order.
    pub buffer: Vec<u8>,
    /// Number of receive attempts made.
    pub calls: u64,
    pub termination: Termination,
}

/// Repeatedly call `receive(chunk_size, remaining_secs)` until it yields
/// `None` or `budget_secs` of wall-clock time is spent.
///
/// A receive error aborts the drain and propagates.
pub fn drain_with_budget<F>(
    mut receive: F,
    chunk_size: usize,
    budget_secs: f64,
) -> CapResult<DrainSummary>
where
    F: FnMut(usize, f64) -> CapResult<Option<Vec<u8>>>,
{
    let mut remaining = budget_secs;
    let mut buffer = Vec::new();
    let mut calls: u64 = 0;

    while remaining > 0.0 {
        let started = clock::now();
        let chunk = receive(chunk_size, remaining)?;
        calls += 1;
        remaining -= clock::elapsed(started);

        match chunk {
            None => {
                return Ok(DrainSummary {
                    buffer,
                    calls,
                    termination: Termination::SourceClosed,
                });
            }
            Some(bytes) => buffer.extend(bytes),
        }
    }

    Ok(DrainSummary {
        buffer,
        calls,
        termination: Termination::BudgetExhausted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_until_source_closes() {
        let chunks = [b"abcd".to_vec(), b"efgh".to_vec(), b"ijkl".to_vec()];
        let mut served = 0usize;
        let summary = drain_with_budget(
            |chunk_size, remaining| {
                assert_eq!(chunk_size, 4);
                assert!(remaining > 0.0);
                let next = chunks.get(served).cloned();
                served += 1;
                Ok(next)
            },
            4,
            1.0,
        )
        .unwrap();

        assert_eq!(summary.buffer, b"abcdefghijkl");
        assert_eq!(summary.calls, 4);
        assert_eq!(summary.termination, Termination::SourceClosed);
        assert_eq!(summary.buffer.len() % 4, 0);
    }

    #[test]
    fn budget_bounds_a_slow_source() {
        let started = clock::now();
        let summary = drain_with_budget(
            |_, remaining| {
                // Sleep away the allotment, yielding a byte each time.
                clock::sleep(remaining.min(0.02))?;
                Ok(Some(vec![0]))
            },
            1,
            0.1,
        )
        .unwrap();

        assert_eq!(summary.termination, Termination::BudgetExhausted);
        assert!(summary.calls >= 5);
        let elapsed = clock::elapsed(started);
        assert!(elapsed >= 0.1, "spent {elapsed}");
        assert!(elapsed < 0.5, "budget overrun: {elapsed}");
    }

    #[test]
    fn remaining_budget_shrinks_between_calls() {
        let mut budgets = Vec::new();
        let _ = drain_with_budget(
            |_, remaining| {
                budgets.push(remaining);
                clock::sleep(0.005)?;
                if budgets.len() >= 3 { Ok(None) } else { Ok(Some(vec![1])) }
            },
            1,
            1.0,
        )
        .unwrap();

        assert!(budgets.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn non_positive_budget_makes_no_attempts() {
        let summary = drain_with_budget(|_, _| Ok(Some(vec![1])), 1, 0.0).unwrap();
        assert_eq!(summary.calls, 0);
        assert!(summary.buffer.is_empty());
        assert_eq!(summary.termination, Termination::BudgetExhausted);
    }

    #[test]
    fn receive_errors_propagate() {
        let result = drain_with_budget(
            |_, _| {
                Err(hostcap_core::CapError::InvalidState(
                    "socket closed".to_string(),
                ))
            },
            4,
            1.0,
        );
        assert!(result.is_err());
    }
}
