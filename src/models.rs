//! Core data types shared by every component.

use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used in the persisted log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Detected accelerator vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VendorKind {
    Nvidia,
    Amd,
    Unknown,
}

impl VendorKind {
    /// Human-readable vendor name.
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorKind::Nvidia => "NVIDIA",
            VendorKind::Amd => "AMD",
            VendorKind::Unknown => "Unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, VendorKind::Unknown)
    }
}

impl fmt::Display for VendorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\] \[(INFO|WARNING|ERROR)\] (.*)$")
        .expect("log entry pattern is valid")
});

/// One line of the persisted install log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped with the current local time.
    ///
    /// Newlines are folded into spaces so that one entry is always one line.
    pub fn now(level: LogLevel, message: &str) -> Self {
        LogEntry {
            timestamp: Local::now().naive_local(),
            level,
            message: message.replace(['\r', '\n'], " "),
        }
    }

    /// Format as `[YYYY-MM-DD HH:MM:SS] [LEVEL] message` (no trailing newline).
    pub fn to_line(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.message
        )
    }

    /// Parse a line written by [`LogEntry::to_line`].
    pub fn parse(line: &str) -> Option<Self> {
        let caps = ENTRY_RE.captures(line.trim_end())?;
        let timestamp = NaiveDateTime::parse_from_str(&caps[1], TIMESTAMP_FORMAT).ok()?;
        let level = caps[2].parse().ok()?;
        Some(LogEntry {
            timestamp,
            level,
            message: caps[3].to_string(),
        })
    }
}

/// Result of an "ensure package installed" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyPresent,
    Installed,
    Failed(String),
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, InstallOutcome::Failed(_))
    }
}

/// Captured result of one subprocess invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandOutput {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Best short explanation of a failure: stderr, then stdout, then the exit code.
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return last_line(stderr);
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return last_line(stdout);
        }
        format!("exited with status {}", self.exit_code)
    }
}

fn last_line(text: &str) -> String {
    text.lines().last().unwrap_or(text).trim().to_string()
}

/// A named, idempotent action and whether its failure aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStep {
    pub name: &'static str,
    pub description: String,
    pub fatal: bool,
}

impl InstallStep {
    pub fn new(name: &'static str, description: impl Into<String>) -> Self {
        InstallStep {
            name,
            description: description.into(),
            fatal: false,
        }
    }

    /// Mark this step as one whose failure aborts the run.
    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    /// Conditionally mark this step fatal.
    pub fn fatal_if(mut self, fatal: bool) -> Self {
        self.fatal = fatal;
        self
    }
}
