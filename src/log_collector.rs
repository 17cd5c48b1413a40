//! Install log and console output.
//!
//! Two independent sinks with different failure tolerance:
//!
//! ```text
//!            Journal::info / warn / error
//!                   |              |
//!                   v              v
//!              [Console]       [LogStore]
//!           (always prints)  (best effort, append-only file)
//! ```
//!
//! - **Console** never fails and pauses briefly after each message so long
//!   runs stay readable.
//! - **LogStore** appends `[timestamp] [LEVEL] message` lines. Write failures
//!   are swallowed; the console line has already been printed.
//!
//! `LogCollector` is separate: it implements the `log` crate's `Log` trait so
//! internal `log::debug!` diagnostics reach stderr when verbose mode is on.

use crate::config::AppConfig;
use crate::models::{LogEntry, LogLevel};
use console::style;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::Cell;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mode of the log directory: world-readable, owner-writable.
pub const LOG_DIR_MODE: u32 = 0o755;
/// Mode of the log file: world-readable, owner-writable.
pub const LOG_FILE_MODE: u32 = 0o644;

/// Result of a purge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeOutcome {
    Removed,
    NotFound,
}

/// Append-only log file under a per-tool directory.
#[derive(Debug, Clone)]
pub struct LogStore {
    dir: PathBuf,
    file: PathBuf,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>, file_name: &str) -> Self {
        let dir = dir.into();
        let file = dir.join(file_name);
        LogStore { dir, file }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.log_dir.clone(), &config.log_file_name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn exists(&self) -> bool {
        self.file.is_file()
    }

    /// Create the directory and file with their fixed permissions.
    ///
    /// Existing content is never touched.
    pub fn initialize(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::set_permissions(&self.dir, fs::Permissions::from_mode(LOG_DIR_MODE))?;

        OpenOptions::new().create(true).append(true).open(&self.file)?;
        fs::set_permissions(&self.file, fs::Permissions::from_mode(LOG_FILE_MODE))?;
        Ok(())
    }

    /// Append one entry, creating the store first if it is missing.
    pub fn append(&self, entry: &LogEntry) -> io::Result<()> {
        if !self.exists() {
            self.initialize()?;
        }
        let mut file = OpenOptions::new().append(true).open(&self.file)?;
        writeln!(file, "{}", entry.to_line())?;
        file.flush()
    }

    /// Entire log contents, or `None` when no log exists.
    pub fn read_all(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.file) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Last `n` lines in their original order, or `None` when no log exists.
    pub fn read_tail(&self, n: usize) -> io::Result<Option<Vec<String>>> {
        Ok(self.read_all()?.map(|content| {
            let lines: Vec<&str> = content.lines().collect();
            let start = lines.len().saturating_sub(n);
            lines[start..].iter().map(|l| l.to_string()).collect()
        }))
    }

    /// Parsed entries; lines that do not parse are skipped.
    pub fn entries(&self) -> io::Result<Vec<LogEntry>> {
        Ok(self
            .read_all()?
            .map(|content| content.lines().filter_map(LogEntry::parse).collect())
            .unwrap_or_default())
    }

    /// Delete the whole store (directory and file).
    pub fn purge(&self) -> io::Result<PurgeOutcome> {
        if !self.dir.exists() {
            return Ok(PurgeOutcome::NotFound);
        }
        fs::remove_dir_all(&self.dir)?;
        Ok(PurgeOutcome::Removed)
    }
}

/// Where console lines end up.
#[derive(Debug, Clone, Default)]
enum ConsoleTarget {
    /// stdout for information, stderr for warnings and errors
    #[default]
    Terminal,
    /// Lines kept in memory, in emission order
    Buffer(Arc<Mutex<Vec<String>>>),
}

/// Read side of a captured console.
#[derive(Debug, Clone, Default)]
pub struct ConsoleCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl ConsoleCapture {
    /// Every line printed so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        self.lines().join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

/// Console sink. Printing cannot fail from the caller's point of view.
#[derive(Debug, Clone)]
pub struct Console {
    color: bool,
    pause: Duration,
    target: ConsoleTarget,
}

impl Console {
    pub fn new(color: bool, pause: Duration) -> Self {
        Console {
            color,
            pause,
            target: ConsoleTarget::Terminal,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.color, config.console_pause())
    }

    /// No colour, no pause.
    pub fn plain() -> Self {
        Self::new(false, Duration::ZERO)
    }

    /// A plain console that records lines instead of printing them.
    pub fn captured() -> (Self, ConsoleCapture) {
        let capture = ConsoleCapture::default();
        let console = Console {
            target: ConsoleTarget::Buffer(Arc::clone(&capture.lines)),
            ..Self::plain()
        };
        (console, capture)
    }

    pub fn info(&self, message: &str) {
        let tag = self.paint("[INFO]", |s| style(s).blue().bold().to_string());
        self.out(&format!("{} {}", tag, message));
        self.pace();
    }

    pub fn success(&self, message: &str) {
        let tag = self.paint("[OK]", |s| style(s).green().bold().to_string());
        self.out(&format!("{} {}", tag, message));
        self.pace();
    }

    pub fn warn(&self, message: &str) {
        let tag = self.paint("[WARNING]", |s| style(s).yellow().bold().to_string());
        self.err(&format!("{} {}", tag, message));
        self.pace();
    }

    pub fn error(&self, message: &str) {
        let tag = self.paint("[ERROR]", |s| style(s).red().bold().to_string());
        self.err(&format!("{} {}", tag, message));
        self.pace();
    }

    /// Section heading, e.g. `== GPU Status ==`.
    pub fn header(&self, title: &str) {
        let line = format!("== {} ==", title);
        self.out("");
        self.out(&self.paint(&line, |s| style(s).cyan().bold().to_string()));
    }

    /// Unadorned line, used for status tables and log dumps.
    pub fn line(&self, text: &str) {
        self.out(text);
    }

    /// Unadorned block on the error stream, one line at a time.
    pub fn block_err(&self, text: &str) {
        for line in text.lines() {
            self.err(line);
        }
    }

    fn out(&self, text: &str) {
        match &self.target {
            ConsoleTarget::Terminal => println!("{}", text),
            ConsoleTarget::Buffer(lines) => push_line(lines, text),
        }
    }

    fn err(&self, text: &str) {
        match &self.target {
            ConsoleTarget::Terminal => eprintln!("{}", text),
            ConsoleTarget::Buffer(lines) => push_line(lines, text),
        }
    }

    fn paint(&self, text: &str, f: impl Fn(&str) -> String) -> String {
        if self.color {
            f(text)
        } else {
            text.to_string()
        }
    }

    fn pace(&self) {
        if !self.pause.is_zero() {
            std::thread::sleep(self.pause);
        }
    }
}

fn push_line(lines: &Mutex<Vec<String>>, text: &str) {
    if let Ok(mut lines) = lines.lock() {
        lines.push(text.to_string());
    }
}

/// Operator-facing logger: console first, then best-effort persistence.
#[derive(Debug)]
pub struct Journal {
    console: Console,
    store: LogStore,
    warnings: Cell<usize>,
}

impl Journal {
    pub fn new(console: Console, store: LogStore) -> Self {
        Journal {
            console,
            store,
            warnings: Cell::new(0),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Console::from_config(config), LogStore::from_config(config))
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn info(&self, message: &str) {
        self.console.info(message);
        self.record(LogLevel::Info, message);
    }

    /// Informational, rendered as a success on the console.
    pub fn success(&self, message: &str) {
        self.console.success(message);
        self.record(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.warnings.set(self.warnings.get() + 1);
        self.console.warn(message);
        self.record(LogLevel::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.console.error(message);
        self.record(LogLevel::Error, message);
    }

    /// Persist one entry without printing. Returns whether it reached disk.
    pub fn record(&self, level: LogLevel, message: &str) -> bool {
        match self.store.append(&LogEntry::now(level, message)) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("[Log] dropped entry for {}: {}", self.store.path().display(), e);
                false
            }
        }
    }

    /// Warnings emitted through this journal so far.
    pub fn warnings(&self) -> usize {
        self.warnings.get()
    }
}

/// Bridge from the `log` facade to stderr for internal diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct LogCollector {
    level: LevelFilter,
}

impl LogCollector {
    pub fn new(verbose: bool) -> Self {
        LogCollector {
            level: if verbose { LevelFilter::Debug } else { LevelFilter::Warn },
        }
    }

    /// Register as the global logger. Safe to call once per process.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self)).map(|()| log::set_max_level(self.level))
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let tag = match record.level() {
                Level::Error => "error",
                Level::Warn => "warn",
                Level::Info => "info",
                Level::Debug | Level::Trace => "debug",
            };
            eprintln!("[{}] {}", tag, record.args());
        }
    }

    fn flush(&self) {}
}
