//! Run-scoped logging for pipeline stages.
//!
//! Every stage emits timestamped, leveled lines through a [`RunLogger`] that
//! is constructed once at process start and passed by reference into each
//! component. Lines go to a persistent log file (append mode) and are
//! mirrored to stderr so interactive runs stay readable. The log file is the
//! primary diagnostic surface of a run.

use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Leveled, timestamped logger handed to every pipeline stage.
///
/// Writes are serialized through a mutex so the logger can be shared by
/// reference. Buffered output is flushed on drop.
pub struct RunLogger {
    file: Option<Mutex<BufWriter<File>>>,
    mirror_stderr: bool,
}

impl RunLogger {
    /// Open (or create) a log file in append mode and mirror to stderr.
    pub fn to_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self {
            file: Some(Mutex::new(BufWriter::new(file))),
            mirror_stderr: true,
        })
    }

    /// Logger with no backing file, stderr only. Used in tests and when the
    /// log file cannot be opened.
    pub fn stderr_only() -> Self {
        Self {
            file: None,
            mirror_stderr: true,
        }
    }

    /// Logger that discards everything. Keeps test output quiet.
    pub fn disabled() -> Self {
        Self {
            file: None,
            mirror_stderr: false,
        }
    }

    /// Emit one line: `timestamp:LEVEL:message`.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let line = format!(
            "{}:{}:{}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            message.into()
        );
        if let Some(file) = &self.file {
            if let Ok(mut writer) = file.lock() {
                let _ = writeln!(writer, "{}", line);
            }
        }
        if self.mirror_stderr {
            eprintln!("{}", line);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut writer) = file.lock() {
                let _ = writer.flush();
            }
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_log_lines_carry_level_and_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.log");

        {
            let logger = RunLogger::to_file(&path).unwrap();
            logger.info("extraction started");
            logger.error("something broke");
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(":INFO:extraction started"));
        assert!(lines[1].contains(":ERROR:something broke"));
    }

    #[test]
    fn test_append_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.log");

        {
            let logger = RunLogger::to_file(&path).unwrap();
            logger.info("first run");
        }
        {
            let logger = RunLogger::to_file(&path).unwrap();
            logger.info("second run");
        }

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("first run"));
        assert!(content.contains("second run"));
    }

    #[test]
    fn test_disabled_logger_is_silent() {
        let logger = RunLogger::disabled();
        logger.info("goes nowhere");
        logger.flush();
    }
}
