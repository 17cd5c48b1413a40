//! Command dispatch.
//!
//! Maps each CLI command to its handler and each handler result to an exit
//! status. Handlers return `anyhow::Result`; the error message is printed once
//! here.

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::context::SetupContext;
use crate::log_collector::{Journal, PurgeOutcome, LOG_DIR_MODE};
use crate::orchestrator::Orchestrator;
use crate::status::StatusReporter;
use crate::system::CommandRunner;
use crate::vendor::StrategyRegistry;
use anyhow::{bail, Context};
use clap::error::{ContextKind, ErrorKind};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// Mode of the installed binary.
pub const BINARY_MODE: u32 = 0o755;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// The tool, wired to its collaborators.
pub struct App<'a> {
    ctx: SetupContext<'a>,
    /// Binary copied by `install`; defaults to the running executable
    source_binary: Option<PathBuf>,
}

impl<'a> App<'a> {
    pub fn new(config: &'a AppConfig, runner: &'a dyn CommandRunner, journal: &'a Journal) -> Self {
        App {
            ctx: SetupContext::new(config, runner, journal),
            source_binary: None,
        }
    }

    pub fn with_invoking_user(mut self, user: Option<String>) -> Self {
        self.ctx = self.ctx.with_invoking_user(user);
        self
    }

    pub fn with_source_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_binary = Some(path.into());
        self
    }

    /// Parse `args` (including the program name) and run the command.
    pub fn run<I, T>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Cli::try_parse_from(args) {
            Ok(cli) => self.dispatch(cli.command),
            Err(e) => self.handle_parse_error(e),
        }
    }

    /// Run one already-parsed command.
    pub fn dispatch(&self, command: Option<Commands>) -> i32 {
        let result = match command {
            None => {
                self.print_help();
                Ok(())
            }
            Some(Commands::Build) => self.build(),
            Some(Commands::Status) => self.status(),
            Some(Commands::Install) => self.install(),
            Some(Commands::Uninstall) => self.uninstall(),
            Some(Commands::Logs) => self.logs(),
            Some(Commands::RecentLogs { lines }) => self.recent_logs(lines),
            Some(Commands::DeleteLogs) => self.delete_logs(),
            Some(Commands::Version) => {
                self.ctx
                    .journal
                    .console()
                    .line(&format!("{} version {}", crate::NAME, crate::VERSION));
                Ok(())
            }
        };

        match result {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                self.ctx.journal.error(&format!("{:#}", e));
                EXIT_FAILURE
            }
        }
    }

    fn handle_parse_error(&self, e: clap::Error) -> i32 {
        let console = self.ctx.journal.console();
        match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            | ErrorKind::DisplayVersion => {
                for line in e.render().to_string().lines() {
                    console.line(line);
                }
                EXIT_SUCCESS
            }
            ErrorKind::InvalidSubcommand => {
                let name = e
                    .get(ContextKind::InvalidSubcommand)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                console.error(&format!("Unknown command: {}", name));
                self.print_help();
                EXIT_FAILURE
            }
            _ => {
                console.block_err(&e.render().to_string());
                EXIT_FAILURE
            }
        }
    }

    fn build(&self) -> anyhow::Result<()> {
        match Orchestrator::new(&self.ctx).build() {
            Ok(summary) => {
                log::debug!("[App] build finished: {:?}", summary);
                Ok(())
            }
            Err(e) => match e.aborted_state() {
                Some(state) => bail!("{} (stopped at state: {})", e.user_message(), state),
                None => bail!("{}", e.user_message()),
            },
        }
    }

    fn status(&self) -> anyhow::Result<()> {
        let registry = StrategyRegistry::default();
        StatusReporter::new(&self.ctx, &registry).render();
        Ok(())
    }

    /// Copy the running binary into place and create the log directory.
    fn install(&self) -> anyhow::Result<()> {
        let console = self.ctx.journal.console();
        let target = &self.ctx.config.install_path;
        let source = match &self.source_binary {
            Some(path) => path.clone(),
            None => std::env::current_exe().context("Cannot locate the running executable")?,
        };

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }

        // Running the installed copy: copying onto itself would truncate it
        let same_file = match (fs::canonicalize(&source), fs::canonicalize(target)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            fs::copy(&source, target).with_context(|| {
                format!("Failed to copy {} to {}", source.display(), target.display())
            })?;
        }
        fs::set_permissions(target, fs::Permissions::from_mode(BINARY_MODE))
            .with_context(|| format!("Failed to set permissions on {}", target.display()))?;

        let store = self.ctx.journal.store();
        store.initialize().with_context(|| {
            format!("Failed to create log directory {}", store.dir().display())
        })?;

        console.success(&format!("Installed {} to {}", crate::NAME, target.display()));
        console.info(&format!(
            "Log directory: {} (mode {:o})",
            store.dir().display(),
            LOG_DIR_MODE
        ));
        self.ctx
            .journal
            .record(crate::models::LogLevel::Info, &format!("Installed to {}", target.display()));
        console.info(&format!("Run 'sudo {} build' to set up your GPU", crate::NAME));
        Ok(())
    }

    /// Remove the installed binary and purge logs. Nothing is logged to disk
    /// afterwards, so the store stays gone.
    fn uninstall(&self) -> anyhow::Result<()> {
        let console = self.ctx.journal.console();
        let target = &self.ctx.config.install_path;

        if target.exists() {
            fs::remove_file(target)
                .with_context(|| format!("Failed to remove {}", target.display()))?;
            console.success(&format!("Removed {}", target.display()));
        } else {
            console.info(&format!("{} is not installed at {}", crate::NAME, target.display()));
        }

        self.purge_logs()?;
        console.success(&format!("{} uninstalled", crate::NAME));
        Ok(())
    }

    fn logs(&self) -> anyhow::Result<()> {
        let console = self.ctx.journal.console();
        let store = self.ctx.journal.store();
        match store.read_all().context("Failed to read log file")? {
            None => console.info(&format!("No logs found at {}", store.path().display())),
            Some(content) if content.trim().is_empty() => console.info("Log file is empty"),
            Some(content) => {
                console.header(&format!("Install log: {}", store.path().display()));
                for line in content.lines() {
                    console.line(line);
                }
            }
        }
        Ok(())
    }

    fn recent_logs(&self, lines: u64) -> anyhow::Result<()> {
        let console = self.ctx.journal.console();
        let store = self.ctx.journal.store();
        let count = usize::try_from(lines).unwrap_or(usize::MAX);
        match store.read_tail(count).context("Failed to read log file")? {
            None => console.info(&format!("No logs found at {}", store.path().display())),
            Some(tail) if tail.is_empty() => console.info("Log file is empty"),
            Some(tail) => {
                console.header(&format!("Last {} log lines", tail.len()));
                for line in &tail {
                    console.line(line);
                }
            }
        }
        Ok(())
    }

    fn delete_logs(&self) -> anyhow::Result<()> {
        self.purge_logs()
    }

    fn print_help(&self) {
        let console = self.ctx.journal.console();
        for line in Cli::command().render_help().to_string().lines() {
            console.line(line);
        }
    }

    fn purge_logs(&self) -> anyhow::Result<()> {
        let console = self.ctx.journal.console();
        let store = self.ctx.journal.store();
        match store
            .purge()
            .with_context(|| format!("Failed to delete {}", store.dir().display()))?
        {
            PurgeOutcome::Removed => {
                console.success(&format!("Deleted log directory {}", store.dir().display()))
            }
            PurgeOutcome::NotFound => console.info(&format!(
                "Log directory {} does not exist",
                store.dir().display()
            )),
        }
        Ok(())
    }
}
