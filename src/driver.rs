//! The benchmark loop.
//!
//! Every configured algorithm is run through the primary tool against every
//! configured file, strictly in configured order, one child process at a
//! time. The CRC-32 pass through the checksum tool follows unless validation
//! decided to skip it. Per-GB figures divide by the nominal dataset size from
//! the configuration, never by measured file sizes.

use crate::config::{BenchConfig, FailurePolicy, HashAlgorithm};
use crate::report;
use crate::runner::{CommandOutput, CommandRunner, RunError};
use crate::utils::Logger;
use indicatif::ProgressBar;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

pub const CRC32_LABEL: &str = "CRC-32";

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("{label} run on {file:?} failed with exit status {}", display_code(.code))]
    ToolFailed {
        label: String,
        file: PathBuf,
        code: Option<i32>,
    },

    #[error("Failed to write report: {0}")]
    Io(#[from] io::Error),
}

fn display_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

/// Monotonic time source, as an offset from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// One timed section of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Primary(HashAlgorithm),
    Crc32,
}

impl Pass {
    pub fn label(&self) -> String {
        match self {
            Pass::Primary(algo) => algo.label(),
            Pass::Crc32 => CRC32_LABEL.to_string(),
        }
    }

    fn tool<'c>(&self, config: &'c BenchConfig) -> &'c Path {
        match self {
            Pass::Primary(_) => config.primary_tool.as_path(),
            Pass::Crc32 => config.checksum_tool.as_path(),
        }
    }

    fn args<'f>(&self, file: &'f str) -> Vec<&'f str> {
        match self {
            Pass::Primary(algo) => vec!["dgst", algo.openssl_flag(), file],
            Pass::Crc32 => vec!["-c", file],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStatus {
    Ok,
    /// The tool exited non-zero (`None`: killed by a signal)
    ToolFailed(Option<i32>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimingSample {
    pub label: String,
    pub file: PathBuf,
    pub elapsed: Duration,
    pub status: SampleStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSummary {
    pub label: String,
    pub total: Duration,
    pub time_per_gb: f64,
    /// Failed samples counted in `total`
    pub unreliable: usize,
    /// Failed samples left out of `total`
    pub excluded: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub summaries: Vec<AlgorithmSummary>,
}

pub struct Driver<'a> {
    config: &'a BenchConfig,
    runner: &'a dyn CommandRunner,
    clock: &'a dyn Clock,
    logger: &'a Logger,
    progress: ProgressBar,
}

impl<'a> Driver<'a> {
    pub fn new(
        config: &'a BenchConfig,
        runner: &'a dyn CommandRunner,
        clock: &'a dyn Clock,
        logger: &'a Logger,
    ) -> Self {
        Self {
            config,
            runner,
            clock,
            logger,
            progress: ProgressBar::hidden(),
        }
    }

    /// Shows `progress` (typically a spinner on stderr) while each tool runs.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        if !progress.is_hidden() {
            progress.enable_steady_tick(Duration::from_millis(100));
        }
        self.progress = progress;
        self
    }

    /// Sections in report order.
    pub fn passes(&self, skip_crc32: bool) -> Vec<Pass> {
        let mut passes: Vec<Pass> = self
            .config
            .algorithms
            .iter()
            .copied()
            .map(Pass::Primary)
            .collect();
        if !skip_crc32 {
            passes.push(Pass::Crc32);
        }
        passes
    }

    pub fn run_all<W: Write>(&self, skip_crc32: bool, out: &mut W) -> Result<Report, DriverError> {
        let mut report = Report::default();

        for pass in self.passes(skip_crc32) {
            let summary = self.run_pass(pass, out)?;
            report.summaries.push(summary);

            // CRC-32 has no separator of its own, only the final one
            if pass != Pass::Crc32 {
                self.progress.suspend(|| report::print_separator(out))?;
            }
        }
        self.progress.suspend(|| -> io::Result<()> {
            report::print_separator(out)?;
            out.flush()
        })?;

        self.progress.finish_and_clear();
        Ok(report)
    }

    fn run_pass<W: Write>(&self, pass: Pass, out: &mut W) -> Result<AlgorithmSummary, DriverError> {
        let label = pass.label();
        self.progress
            .suspend(|| report::print_section_header(out, &label))?;

        let mut total = Duration::ZERO;
        let mut unreliable = 0;
        let mut excluded = 0;

        for file in &self.config.files {
            let sample = self.time_one(pass, &label, file, out)?;

            match (sample.status, self.config.failure_policy) {
                (SampleStatus::Ok, _) => total += sample.elapsed,
                (SampleStatus::ToolFailed(_), FailurePolicy::Flag) => {
                    total += sample.elapsed;
                    unreliable += 1;
                }
                (SampleStatus::ToolFailed(_), FailurePolicy::Exclude) => excluded += 1,
                (SampleStatus::ToolFailed(code), FailurePolicy::Abort) => {
                    return Err(DriverError::ToolFailed {
                        label,
                        file: file.clone(),
                        code,
                    });
                }
            }
        }

        let time_per_gb = total.as_secs_f64() / self.config.dataset_size_gb;
        self.progress
            .suspend(|| report::print_summary(out, time_per_gb, unreliable, excluded))?;

        let _ = self.logger.log(&format!(
            "Summary: {} total {:.2} s, {:.2} s/GB ({} unreliable, {} excluded)",
            label,
            total.as_secs_f64(),
            time_per_gb,
            unreliable,
            excluded
        ));

        Ok(AlgorithmSummary {
            label,
            total,
            time_per_gb,
            unreliable,
            excluded,
        })
    }

    fn time_one<W: Write>(
        &self,
        pass: Pass,
        label: &str,
        file: &Path,
        out: &mut W,
    ) -> Result<TimingSample, DriverError> {
        let file_arg = file.to_string_lossy();
        let args = pass.args(&file_arg);
        let tool = pass.tool(self.config);

        // Elapsed time on the spinner is per sample
        self.progress.reset_elapsed();
        self.progress.set_message(format!("{} {}", label, file.display()));
        self.progress.tick();

        let start = self.clock.now();
        let output = self.runner.run(tool, &args)?;
        let elapsed = self.clock.now().saturating_sub(start);

        let status = sample_status(&output);
        let note = match status {
            SampleStatus::Ok => None,
            SampleStatus::ToolFailed(code) => Some(format!(
                "[!] exit status {}, {}",
                display_code(&code),
                match self.config.failure_policy {
                    FailurePolicy::Exclude => "excluded from total",
                    _ => "timing unreliable",
                }
            )),
        };

        // The spinner shares the terminal with the report
        self.progress.suspend(|| {
            report::print_sample(out, &output.stdout, file, elapsed, note.as_deref())
        })?;

        let _ = self.logger.log(&format!(
            "Sample: {} {:?} {:.2} s{}",
            label,
            file,
            elapsed.as_secs_f64(),
            note.as_deref()
                .map(|n| format!(" {} (stderr: {})", n, output.stderr))
                .unwrap_or_default()
        ));

        Ok(TimingSample {
            label: label.to_string(),
            file: file.to_path_buf(),
            elapsed,
            status,
        })
    }
}

fn sample_status(output: &CommandOutput) -> SampleStatus {
    if output.success {
        SampleStatus::Ok
    } else {
        SampleStatus::ToolFailed(output.code)
    }
}
