//! A complete offline run: every check family executes, in order, with
//! no failures on a healthy host.
//!
//! One test drives one full run. The filesystem check changes the
//! process working directory (and restores it), so concurrent runs in
//! the same process would race; keep this file to a single test.

use hostcap_harness::outcome::CheckStatus;
use hostcap_harness::runner::CHECK_ORDER;
use hostcap_harness::{HarnessConfig, HarnessRunner, RunReport};

#[test]
fn offline_run_emits_every_check_in_order_without_failures() {
    let scratch = std::env::temp_dir().join(format!("hostcap-fullrun-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&scratch);
    std::fs::create_dir_all(&scratch).unwrap();
    let probe = scratch.join("probe.file");
    std::fs::write(&probe, b"probe contents").unwrap();

    let config = HarnessConfig {
        skip_network: true,
        probe_file: probe,
        scratch_dir: scratch.clone(),
        clock_sleep_secs: 0.01,
        worker_sleep_secs: 0.05,
        poll_interval_micros: 512,
        ..HarnessConfig::default()
    };

    let report = HarnessRunner::new(config).run();

    assert!(report.all_passed(), "{}", report.render_text());
    assert!(report.passed > 0);
    assert!(report.skipped > 0, "network steps should be skipped");

    // Families appear exactly in the fixed order.
    let mut seen: Vec<&str> = Vec::new();
    for outcome in &report.outcomes {
        if seen.last() != Some(&outcome.check.as_str()) {
            seen.push(outcome.check.as_str());
        }
    }
    assert_eq!(seen, CHECK_ORDER);

    // Worker poll loop reported a successful wait.
    let poll = report
        .outcomes
        .iter()
        .find(|o| o.operation == "poll_until_shutdown")
        .expect("thread check ran");
    assert_eq!(poll.status, CheckStatus::Pass);

    // The report survives a JSON round trip.
    let json = report.to_json().unwrap();
    let back: RunReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.outcomes.len(), report.outcomes.len());
    assert_eq!(back.passed, report.passed);

    std::fs::remove_dir_all(&scratch).unwrap();
}
