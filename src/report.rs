//! Plain-text report formatting.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

pub const BANNER_WIDTH: usize = 50;
pub const TITLE: &str = "HashBenchmark";

pub fn banner(ch: char) -> String {
    ch.to_string().repeat(BANNER_WIDTH)
}

pub fn print_intro<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", banner('*'))?;
    writeln!(out, "{}", TITLE)?;
    writeln!(out, "{}", banner('*'))?;
    writeln!(out)
}

pub fn print_section_header<W: Write>(out: &mut W, label: &str) -> io::Result<()> {
    writeln!(out, "Hash type: {}", label)
}

/// Raw tool output, file name and elapsed time of one invocation.
/// `note` is appended when the sample is not trustworthy.
pub fn print_sample<W: Write>(
    out: &mut W,
    tool_output: &str,
    file: &Path,
    elapsed: Duration,
    note: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "{}", tool_output)?;
    writeln!(out, "File: {}", file.display())?;
    match note {
        Some(note) => writeln!(out, "Time taken: {:.2} s {}\n", elapsed.as_secs_f64(), note),
        None => writeln!(out, "Time taken: {:.2} s\n", elapsed.as_secs_f64()),
    }
}

pub fn print_summary<W: Write>(
    out: &mut W,
    time_per_gb: f64,
    unreliable: usize,
    excluded: usize,
) -> io::Result<()> {
    writeln!(out, "Time / GB: {:.2} s", time_per_gb)?;
    if unreliable > 0 {
        writeln!(out, "[!] {} sample(s) from a failed tool run included", unreliable)?;
    }
    if excluded > 0 {
        writeln!(out, "[!] {} sample(s) from a failed tool run excluded", excluded)?;
    }
    writeln!(out)
}

pub fn print_separator<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", banner('#'))
}
