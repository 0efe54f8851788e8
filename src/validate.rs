//! Startup checks: platform, external tools and input files.
//!
//! Nothing here runs a hashing tool. The only interactive step is the
//! confirmation asked through [`Confirm`] when the checksum tool is missing.

use crate::config::BenchConfig;
use anyhow::Result;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SUPPORTED_PLATFORM: &str = "linux";

/// Relative difference between measured and nominal dataset size that
/// triggers a warning.
const SIZE_MISMATCH_TOLERANCE: f64 = 0.10;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Only Linux platform is supported (found {0})")]
    UnsupportedPlatform(String),

    #[error("Primary hashing tool not found at {0:?}")]
    PrimaryToolMissing(PathBuf),

    #[error("Cannot continue without checksum tool {0:?}")]
    UserDeclined(PathBuf),

    #[error("File path issues found, please fix & try again: {}", display_paths(.0))]
    InputFilesMissing(Vec<PathBuf>),

    #[error("Failed to write status: {0}")]
    Io(#[from] io::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Asks the operator a yes/no question.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Reads the answer from standard input.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        print!("{} ", prompt);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// `y` or `yes`, ignoring case and surrounding whitespace.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub skip_crc32: bool,
    /// Measured size of each configured file, in configured order
    pub file_sizes: Vec<(PathBuf, u64)>,
}

impl Validated {
    pub fn measured_total_bytes(&self) -> u64 {
        self.file_sizes.iter().map(|(_, size)| size).sum()
    }

    /// Set when the files on disk are far from the nominal dataset size the
    /// report divides by.
    pub fn size_mismatch(&self, nominal_gb: f64) -> Option<f64> {
        let measured_gb = self.measured_total_bytes() as f64 / BYTES_PER_GB;
        if nominal_gb <= 0.0 {
            return Some(measured_gb);
        }
        let drift = (measured_gb - nominal_gb).abs() / nominal_gb;
        (drift > SIZE_MISMATCH_TOLERANCE).then_some(measured_gb)
    }
}

/// Status lines (`[!]`, `[*]`) are written to `out`, ahead of the report.
pub fn validate<W: Write>(
    config: &BenchConfig,
    platform: &str,
    confirm: &dyn Confirm,
    out: &mut W,
) -> Result<Validated, ValidationError> {
    if platform != SUPPORTED_PLATFORM {
        return Err(ValidationError::UnsupportedPlatform(platform.to_string()));
    }

    if !config.primary_tool.is_file() {
        return Err(ValidationError::PrimaryToolMissing(
            config.primary_tool.clone(),
        ));
    }

    let skip_crc32 = check_checksum_tool(&config.checksum_tool, confirm, out)?;

    let file_sizes = check_files(&config.files)?;

    Ok(Validated {
        skip_crc32,
        file_sizes,
    })
}

/// Returns whether the CRC-32 pass must be skipped.
fn check_checksum_tool<W: Write>(
    path: &Path,
    confirm: &dyn Confirm,
    out: &mut W,
) -> Result<bool, ValidationError> {
    if path.is_file() {
        return Ok(false);
    }

    writeln!(out, "[!] crctk not found")?;
    out.flush()?;
    // A failed read of the answer counts as a refusal
    let accepted = confirm
        .confirm("[?] Do you want to continue? y/N")
        .unwrap_or(false);

    if accepted {
        writeln!(out, "[*] Skipping crctk hash checks")?;
        Ok(true)
    } else {
        Err(ValidationError::UserDeclined(path.to_path_buf()))
    }
}

fn check_files(files: &[PathBuf]) -> Result<Vec<(PathBuf, u64)>, ValidationError> {
    let mut sizes = Vec::with_capacity(files.len());
    let mut missing = Vec::new();

    for path in files {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => sizes.push((path.clone(), meta.len())),
            _ => missing.push(path.clone()),
        }
    }

    if missing.is_empty() {
        Ok(sizes)
    } else {
        Err(ValidationError::InputFilesMissing(missing))
    }
}
