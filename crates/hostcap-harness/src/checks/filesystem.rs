//! Filesystem check: metadata queries, idempotent delete, directory
//! lifecycle, and path normalization.

use std::path::Path;

use hostcap_core::fs;

use crate::config::HarnessConfig;
use crate::outcome::CheckOutcome;

const CHECK: &str = "filesystem";

/// Probe an existing file, delete a missing one, and round-trip a
/// scratch directory (create, change into, change back, delete).
pub fn run(config: &HarnessConfig) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let normalized = fs::to_native_path("some/test\\filename.file");
    outcomes.push(CheckOutcome::pass(CHECK, "to_native_path", normalized));

    let probe: &Path = &config.probe_file;
    let exists = fs::file_exists(probe);
    outcomes.push(if exists {
        CheckOutcome::pass(CHECK, "file_exists", format!("{} exists", probe.display()))
    } else {
        CheckOutcome::fail(
            CHECK,
            "file_exists",
            format!("probe file {} is missing", probe.display()),
        )
    });

    if exists {
        outcomes.push(CheckOutcome::from_result(
            CHECK,
            "file_len",
            fs::file_len(probe).map(|len| format!("{len} bytes")),
        ));
        outcomes.push(CheckOutcome::from_result(
            CHECK,
            "file_modified",
            fs::file_modified(probe).map(|secs| format!("{secs}s since epoch")),
        ));
    } else {
        outcomes.push(CheckOutcome::skip(CHECK, "file_len", "no probe file"));
        outcomes.push(CheckOutcome::skip(CHECK, "file_modified", "no probe file"));
    }

    let missing = config.scratch_dir.join("hostcap.missing.file");
    outcomes.push(match fs::file_delete(&missing) {
        Ok(false) => CheckOutcome::pass(
            CHECK,
            "file_delete_missing",
            "no-op success on absent file".to_string(),
        ),
        Ok(true) => CheckOutcome::pass(
            CHECK,
            "file_delete_missing",
            "removed a leftover file".to_string(),
        ),
        Err(err) => CheckOutcome::fail(CHECK, "file_delete_missing", err.to_string()),
    });

    outcomes.push(if fs::dir_exists(&config.scratch_dir) {
        CheckOutcome::pass(
            CHECK,
            "dir_exists",
            format!("{} exists", config.scratch_dir.display()),
        )
    } else {
        CheckOutcome::fail(
            CHECK,
            "dir_exists",
            format!("scratch dir {} is missing", config.scratch_dir.display()),
        )
    });

    let scratch = config.scratch_dir.join("hostcap-check-dir");
    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "dir_create",
        fs::dir_create(&scratch).map(|()| format!("created {}", scratch.display())),
    ));

    // Change into the new directory and back, restoring the cwd even if
    // the inner change fails.
    outcomes.push(match std::env::current_dir() {
        Ok(original) => {
            let changed = fs::dir_change(&scratch);
            let restored = fs::dir_change(&original);
            match (changed, restored) {
                (Ok(()), Ok(())) => CheckOutcome::pass(
                    CHECK,
                    "dir_change",
                    format!("entered and left {}", scratch.display()),
                ),
                (Err(err), _) | (_, Err(err)) => {
                    CheckOutcome::fail(CHECK, "dir_change", err.to_string())
                }
            }
        }
        Err(err) => CheckOutcome::fail(CHECK, "dir_change", err.to_string()),
    });

    outcomes.push(CheckOutcome::from_result(
        CHECK,
        "dir_delete",
        fs::dir_delete(&scratch).map(|()| format!("deleted {}", scratch.display())),
    ));

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::CheckStatus;
    use std::path::PathBuf;

    // The check changes the process cwd; serialize tests that run it.
    static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn scratch_config(name: &str) -> HarnessConfig {
        let scratch = std::env::temp_dir().join(format!(
            "hostcap-fscheck-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&scratch);
        std::fs::create_dir_all(&scratch).unwrap();
        let probe = scratch.join("probe.file");
        std::fs::write(&probe, b"probe contents").unwrap();
        HarnessConfig {
            probe_file: probe,
            scratch_dir: scratch,
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn healthy_scratch_setup_passes_every_step() {
        let _cwd = CWD_LOCK.lock().unwrap();
        let config = scratch_config("ok");
        let outcomes = run(&config);
        assert!(
            outcomes.iter().all(|o| o.status == CheckStatus::Pass),
            "{outcomes:?}"
        );
        std::fs::remove_dir_all(&config.scratch_dir).unwrap();
    }

    #[test]
    fn missing_probe_file_fails_but_still_runs_directory_steps() {
        let _cwd = CWD_LOCK.lock().unwrap();
        let mut config = scratch_config("missing");
        config.probe_file = PathBuf::from("/definitely/not/here");
        let outcomes = run(&config);
        assert!(outcomes.iter().any(|o| o.status == CheckStatus::Fail));
        assert!(outcomes.iter().any(|o| o.operation == "dir_delete"));
        std::fs::remove_dir_all(&config.scratch_dir).unwrap();
    }
}
