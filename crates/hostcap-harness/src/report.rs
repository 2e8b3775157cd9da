//! Run reports: human-readable text and machine-readable JSON.

use serde::{Deserialize, Serialize};

use crate::outcome::{CheckOutcome, CheckStatus};

/// Everything one verification run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Harness version that produced the report.
    pub version: String,
    /// Host operating system display name.
    pub os: String,
    pub outcomes: Vec<CheckOutcome>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunReport {
    /// Tally `outcomes` into a report.
    #[must_use]
    pub fn from_outcomes(outcomes: Vec<CheckOutcome>) -> Self {
        let passed = outcomes
            .iter()
            .filter(|o| o.status == CheckStatus::Pass)
            .count();
        let failed = outcomes
            .iter()
            .filter(|o| o.status == CheckStatus::Fail)
            .count();
        let skipped = outcomes
            .iter()
            .filter(|o| o.status == CheckStatus::Skip)
            .count();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: hostcap_core::system::os_type().to_string(),
            outcomes,
            passed,
            failed,
            skipped,
        }
    }

    /// Whether no operation failed (skips allowed).
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Render the aligned text form.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "hostcap verification harness {} on {}\n\n",
            self.version, self.os
        ));

        let mut current_check = "";
        for outcome in &self.outcomes {
            if outcome.check != current_check {
                out.push_str(&format!("{} ::\n", outcome.check));
                current_check = &outcome.check;
            }
            out.push_str(&format!(
                "  [{:<4}] {:<28} :: {}\n",
                outcome.status.as_str(),
                outcome.operation,
                outcome.observed
            ));
        }

        out.push_str(&format!(
            "\n{} passed, {} failed, {} skipped\n",
            self.passed, self.failed, self.skipped
        ));
        out
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
