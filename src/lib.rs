pub mod config;
pub mod driver;
pub mod report;
pub mod runner;
pub mod utils;
pub mod validate;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};

use config::{BenchConfig, FailurePolicy, DEFAULT_LOG_PATH};
use driver::{Clock, Driver, Report, SystemClock};
use runner::{CommandRunner, SystemRunner};
use utils::{format_bytes, Logger};
use validate::{validate, Confirm, StdinConfirm};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Audit log file path
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    pub log: String,

    /// What to do with a timing sample whose hashing tool exited with an error
    #[arg(long, value_enum, default_value_t = FailurePolicy::Flag)]
    pub on_tool_failure: FailurePolicy,

    /// Do not show the progress spinner on stderr
    #[arg(long)]
    pub quiet_progress: bool,
}

impl Args {
    pub fn config(&self) -> BenchConfig {
        BenchConfig {
            failure_policy: self.on_tool_failure,
            ..BenchConfig::default()
        }
    }
}

/// Collaborators of a benchmark run that touch the outside world.
pub struct Environment<'a> {
    pub platform: &'a str,
    pub confirm: &'a dyn Confirm,
    pub runner: &'a dyn CommandRunner,
    pub clock: &'a dyn Clock,
}

pub fn run(args: Args) -> Result<()> {
    let config = args.config();
    let logger = Logger::new(&args.log);

    let progress = if args.quiet_progress {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner().template("{spinner:.green} Hashing {msg} ({elapsed})")?,
        );
        pb
    };

    let clock = SystemClock::new();
    let env = Environment {
        platform: std::env::consts::OS,
        confirm: &StdinConfirm,
        runner: &SystemRunner,
        clock: &clock,
    };

    benchmark(&config, &env, &logger, progress, &mut io::stdout())?;
    Ok(())
}

/// Validates the environment, then runs every benchmark pass and prints the
/// report to `out`. Nothing is hashed if validation fails.
pub fn benchmark<W: Write>(
    config: &BenchConfig,
    env: &Environment,
    logger: &Logger,
    progress: ProgressBar,
    out: &mut W,
) -> Result<Report> {
    report::print_intro(out)?;
    out.flush()?;

    let validated = match validate(config, env.platform, env.confirm, out) {
        Ok(v) => v,
        Err(e) => {
            progress.finish_and_clear();
            let _ = logger.log(&format!("Validation failed: {}", e));
            return Err(e.into());
        }
    };

    for (path, size) in &validated.file_sizes {
        let _ = logger.log(&format!("Input: {:?} ({})", path, format_bytes(*size)));
    }
    if let Some(measured_gb) = validated.size_mismatch(config.dataset_size_gb) {
        let warning = format!(
            "Input files total {:.2} GB but Time / GB divides by {:.2} GB",
            measured_gb, config.dataset_size_gb
        );
        writeln!(out, "[*] {}\n", warning)?;
        let _ = logger.log(&warning);
    }
    let _ = logger.log(&format!(
        "Validation passed (CRC-32 {})",
        if validated.skip_crc32 { "skipped" } else { "enabled" }
    ));

    let report = Driver::new(config, env.runner, env.clock, logger)
        .with_progress(progress)
        .run_all(validated.skip_crc32, out)
        .context("Benchmark aborted")?;

    let _ = logger.log("Benchmark completed");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, RunError};
    use crate::validate::ValidationError;
    use std::cell::Cell;
    use std::fs::File;
    use std::path::Path;

    struct CountingRunner {
        calls: Cell<usize>,
    }

    impl CommandRunner for CountingRunner {
        fn run(&self, _program: &Path, _args: &[&str]) -> Result<CommandOutput, RunError> {
            self.calls.set(self.calls.get() + 1);
            Ok(CommandOutput::ok("digest"))
        }
    }

    struct Yes;

    impl Confirm for Yes {
        fn confirm(&self, _prompt: &str) -> Result<bool> {
            Ok(true)
        }
    }

    fn run_with(config: &BenchConfig, platform: &str) -> (Result<Report>, usize) {
        let runner = CountingRunner {
            calls: Cell::new(0),
        };
        let clock = SystemClock::new();
        let env = Environment {
            platform,
            confirm: &Yes,
            runner: &runner,
            clock: &clock,
        };
        let result = benchmark(
            config,
            &env,
            &Logger::disabled(),
            ProgressBar::hidden(),
            &mut io::sink(),
        );
        (result, runner.calls.get())
    }

    fn tools_and_files(dir: &Path, files: &[&str]) -> BenchConfig {
        let openssl = dir.join("openssl");
        File::create(&openssl).unwrap();
        let crctk = dir.join("crctk");
        File::create(&crctk).unwrap();
        for name in files {
            File::create(dir.join(name)).unwrap();
        }

        BenchConfig {
            files: ["2GB", "4GB", "6GB"].iter().map(|f| dir.join(f)).collect(),
            primary_tool: openssl,
            checksum_tool: crctk,
            ..BenchConfig::default()
        }
    }

    #[test]
    fn test_missing_input_runs_no_tool() {
        let dir = tempfile::tempdir().unwrap();
        let config = tools_and_files(dir.path(), &["2GB", "6GB"]);

        let (result, calls) = run_with(&config, "linux");

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::InputFilesMissing(v)) if v == &vec![dir.path().join("4GB")]
        ));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_unsupported_platform_runs_no_tool() {
        let dir = tempfile::tempdir().unwrap();
        let config = tools_and_files(dir.path(), &["2GB", "4GB", "6GB"]);

        let (result, calls) = run_with(&config, "macos");

        assert!(result.is_err());
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_valid_environment_runs_every_pair() {
        let dir = tempfile::tempdir().unwrap();
        let config = tools_and_files(dir.path(), &["2GB", "4GB", "6GB"]);

        let (result, calls) = run_with(&config, "linux");

        assert_eq!(result.unwrap().summaries.len(), 9);
        assert_eq!(calls, 9 * 3);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["hashbench"]);
        assert_eq!(args.log, DEFAULT_LOG_PATH);
        assert_eq!(args.on_tool_failure, FailurePolicy::Flag);
        assert!(!args.quiet_progress);

        let config = args.config();
        assert_eq!(config.files.len(), 3);
        assert_eq!(config.dataset_size_gb, 12.0);
    }

    #[test]
    fn test_args_failure_policy() {
        let args = Args::parse_from(["hashbench", "--on-tool-failure", "exclude"]);
        assert_eq!(args.config().failure_policy, FailurePolicy::Exclude);
    }
}
