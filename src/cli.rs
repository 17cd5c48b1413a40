//! Command-line parser.

use clap::{Parser, Subcommand};

/// Default number of lines shown by `recent-logs`.
pub const DEFAULT_RECENT_LINES: u64 = 50;

/// GPU driver and compute toolkit installer.
#[derive(Parser, Debug)]
#[command(name = "gpu-setup")]
#[command(about = "Detect the GPU and install the matching driver and compute toolkit")]
#[command(version)]
pub struct Cli {
    /// Print internal diagnostics to stderr
    ///
    /// `GPU_SETUP_DEBUG` accepts any value; empty, `0`, `false`, `no`, `off`
    /// and `n` mean off.
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        env = "GPU_SETUP_DEBUG",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install GPU drivers and compute toolkit
    Build,
    /// Show live GPU, driver and toolkit status
    Status,
    /// Install this tool to the system binary location
    Install,
    /// Remove the installed binary and all logs
    Uninstall,
    /// Print the full install log
    Logs,
    /// Print the last N lines of the install log
    RecentLogs {
        /// Number of lines to show
        #[arg(default_value_t = DEFAULT_RECENT_LINES, value_parser = clap::value_parser!(u64).range(1..))]
        lines: u64,
    },
    /// Delete the install log
    DeleteLogs,
    /// Print name and version
    Version,
}

/// Whether `--verbose`/`-v` appears before any parsing happens.
///
/// `main` needs this to install the diagnostic logger before the parser runs.
pub fn wants_verbose(args: &[String]) -> bool {
    args.iter().skip(1).any(|a| a == "-v" || a == "--verbose")
        || std::env::var("GPU_SETUP_DEBUG").is_ok_and(|v| env_flag_enabled(&v))
}

/// Same truth table as clap's `FalseyValueParser`.
pub fn env_flag_enabled(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || ["0", "false", "no", "off", "n", "f"]
            .iter()
            .any(|falsey| value.eq_ignore_ascii_case(falsey)))
}
