use anyhow::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Formats byte count in human-readable form (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Append-only audit log of a benchmark run.
pub struct Logger {
    file_path: Option<PathBuf>,
}

impl Logger {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: Some(file_path.as_ref().to_path_buf()),
        }
    }

    /// A logger that drops every message.
    pub fn disabled() -> Self {
        Self { file_path: None }
    }

    pub fn log(&self, message: &str) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_logger() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let log_path = dir.path().join("bench.log");

        let logger = Logger::new(&log_path);
        logger.log("Test message 1")?;
        logger.log("Test message 2")?;

        let content = fs::read_to_string(&log_path)?;

        assert!(content.contains("Test message 1"));
        assert!(content.contains("Test message 2"));
        assert!(content.starts_with('[')); // Timestamp check
        assert_eq!(content.lines().count(), 2);
        Ok(())
    }

    #[test]
    fn test_disabled_logger() -> Result<()> {
        Logger::disabled().log("nothing")?;
        Ok(())
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2.00 GB");
    }
}
