//! CLI entrypoint for the hostcap verification harness.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hostcap_harness::structured_log::{LogEmitter, LogEntry};
use hostcap_harness::{HarnessConfig, HarnessRunner};

/// Verification harness for the hostcap capability facades.
#[derive(Debug, Parser)]
#[command(name = "hostcap-harness")]
#[command(about = "Drives the native capability facades and reports observed behavior")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute the full verification run.
    Run {
        /// Peer host for the socket check.
        #[arg(long, default_value = "www.google.com")]
        host: String,
        /// Peer port for the socket check.
        #[arg(long, default_value_t = 80)]
        port: u16,
        /// Total receive deadline budget, in seconds.
        #[arg(long, default_value_t = 1.0)]
        budget_secs: f64,
        /// Per-attempt receive size, in bytes.
        #[arg(long, default_value_t = 4)]
        chunk_size: usize,
        /// File probed by the filesystem check (defaults to Cargo.toml).
        #[arg(long)]
        probe_file: Option<PathBuf>,
        /// Directory the filesystem check may scribble in (defaults to
        /// the system temp dir).
        #[arg(long)]
        scratch_dir: Option<PathBuf>,
        /// Skip checks that need a reachable network peer.
        #[arg(long)]
        skip_network: bool,
        /// Seconds the worker routine sleeps before clearing its flag.
        #[arg(long, default_value_t = 2.0)]
        worker_sleep_secs: f64,
        /// Microseconds between worker-completion polls.
        #[arg(long, default_value_t = 1024)]
        poll_interval_micros: u64,
        /// Write the JSON report here.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Write a JSONL evidence log here.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Print JSON to stdout instead of the text report.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            host,
            port,
            budget_secs,
            chunk_size,
            probe_file,
            scratch_dir,
            skip_network,
            worker_sleep_secs,
            poll_interval_micros,
            report,
            log,
            json,
        } => {
            let defaults = HarnessConfig::default();
            let config = HarnessConfig {
                host,
                port,
                budget_secs,
                chunk_size,
                probe_file: probe_file.unwrap_or(defaults.probe_file),
                scratch_dir: scratch_dir.unwrap_or(defaults.scratch_dir),
                skip_network,
                worker_sleep_secs,
                poll_interval_micros,
                ..defaults
            };

            let run_report = HarnessRunner::new(config).run();

            if let Some(path) = log {
                match LogEmitter::to_file(&path) {
                    Ok(mut emitter) => {
                        for outcome in &run_report.outcomes {
                            if let Err(err) = emitter.emit(&LogEntry::from_outcome(outcome)) {
                                eprintln!("error - failed to write log line: {err}");
                                break;
                            }
                        }
                    }
                    Err(err) => eprintln!("error - failed to open log {}: {err}", path.display()),
                }
            }

            let rendered_json = match run_report.to_json() {
                Ok(json) => json,
                Err(err) => {
                    eprintln!("error - failed to serialize report: {err}");
                    return ExitCode::FAILURE;
                }
            };

            if let Some(path) = report {
                if let Err(err) = std::fs::write(&path, &rendered_json) {
                    eprintln!("error - failed to write report {}: {err}", path.display());
                }
            }

            if json {
                println!("{rendered_json}");
            } else {
                print!("{}", run_report.render_text());
            }

            if run_report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
