//! Synchronous execution of the external hashing tools.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to run {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Non-ASCII {stream} from {program:?}")]
    Decode {
        program: PathBuf,
        stream: &'static str,
    },
}

/// Captured result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// `None` when the child was killed by a signal
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Output of a child that exited with status 0.
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }
}

pub trait CommandRunner {
    /// Runs `program` to completion. A non-zero exit is reported in the
    /// output, not as an error.
    fn run(&self, program: &Path, args: &[&str]) -> Result<CommandOutput, RunError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[&str]) -> Result<CommandOutput, RunError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: decode(program, "stdout", &output.stdout)?,
            stderr: decode(program, "stderr", &output.stderr)?,
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

fn decode(program: &Path, stream: &'static str, bytes: &[u8]) -> Result<String, RunError> {
    if !bytes.is_ascii() {
        return Err(RunError::Decode {
            program: program.to_path_buf(),
            stream,
        });
    }
    // ASCII is always valid UTF-8
    Ok(String::from_utf8_lossy(bytes).trim().to_string())
}
