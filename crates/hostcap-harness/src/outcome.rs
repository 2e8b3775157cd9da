//! Per-operation check results.

use serde::{Deserialize, Serialize};

/// Result class of one exercised operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
}

impl CheckStatus {
    /// Display name for the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Skip => "skip",
        }
    }
}

/// One exercised operation and what was observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Capability family (`clock`, `sockets`, ...).
    pub check: String,
    /// Operation label within the family.
    pub operation: String,
    /// Observed value or error text.
    pub observed: String,
    pub status: CheckStatus,
}

impl CheckOutcome {
    /// A passing outcome.
    pub fn pass(check: &str, operation: &str, observed: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            operation: operation.to_string(),
            observed: observed.into(),
            status: CheckStatus::Pass,
        }
    }

    /// A failing outcome.
    pub fn fail(check: &str, operation: &str, observed: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            operation: operation.to_string(),
            observed: observed.into(),
            status: CheckStatus::Fail,
        }
    }

    /// A skipped outcome, with the reason in `observed`.
    pub fn skip(check: &str, operation: &str, reason: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            operation: operation.to_string(),
            observed: reason.into(),
            status: CheckStatus::Skip,
        }
    }

    /// Pass with the value's display form, or fail with the error's.
    pub fn from_result<T: std::fmt::Display, E: std::fmt::Display>(
        check: &str,
        operation: &str,
        result: Result<T, E>,
    ) -> Self {
        match result {
            Ok(value) => Self::pass(check, operation, value.to_string()),
            Err(err) => Self::fail(check, operation, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_result_maps_both_arms() {
        let ok: Result<u32, String> = Ok(7);
        let outcome = CheckOutcome::from_result("clock", "elapsed", ok);
        assert_eq!(outcome.status, CheckStatus::Pass);
        assert_eq!(outcome.observed, "7");

        let err: Result<u32, String> = Err("boom".to_string());
        let outcome = CheckOutcome::from_result("clock", "elapsed", err);
        assert_eq!(outcome.status, CheckStatus::Fail);
        assert_eq!(outcome.observed, "boom");
    }

    #[test]
    fn serializes_with_lowercase_status() {
        let json = serde_json::to_string(&CheckOutcome::skip("sockets", "open", "no network"))
            .unwrap();
        assert!(json.contains("\"status\":\"skip\""));
    }
}
