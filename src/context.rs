//! Everything a setup step needs, bundled once per invocation.

use crate::config::AppConfig;
use crate::error::SetupError;
use crate::log_collector::Journal;
use crate::models::{InstallOutcome, InstallStep};
use crate::orchestrator::{SetupProgress, SetupState};
use crate::packages::PackageInstaller;
use crate::system::CommandRunner;

/// Shared, read-only collaborators for the orchestrator, strategies and
/// status reporter.
pub struct SetupContext<'a> {
    pub config: &'a AppConfig,
    pub runner: &'a dyn CommandRunner,
    pub journal: &'a Journal,
    pub packages: PackageInstaller<'a>,
    /// Non-root user who ran the tool through sudo
    pub invoking_user: Option<String>,
}

impl<'a> SetupContext<'a> {
    pub fn new(config: &'a AppConfig, runner: &'a dyn CommandRunner, journal: &'a Journal) -> Self {
        SetupContext {
            config,
            runner,
            journal,
            packages: PackageInstaller::new(runner),
            invoking_user: None,
        }
    }

    pub fn with_invoking_user(mut self, user: Option<String>) -> Self {
        self.invoking_user = user;
        self
    }

    /// Ensure `package` is installed, logging the outcome under `step`.
    ///
    /// Failures are WARNINGs unless the step is fatal.
    pub fn ensure(&self, step: &InstallStep, package: &str) -> Result<InstallOutcome, SetupError> {
        let outcome = self.packages.ensure_installed(package);
        match &outcome {
            InstallOutcome::AlreadyPresent => {
                self.journal.info(&format!("{} is already installed", package))
            }
            InstallOutcome::Installed => self.journal.success(&format!("Installed {}", package)),
            InstallOutcome::Failed(reason) => {
                self.fail(step, format!("Failed to install {}: {}", package, reason))?
            }
        }
        Ok(outcome)
    }

    /// Ensure every package in `packages`, one step each.
    pub fn ensure_all(&self, step: &InstallStep, packages: &[String]) -> Result<(), SetupError> {
        for package in packages {
            self.ensure(step, package)?;
        }
        Ok(())
    }

    /// Report a failed step: fatal steps return an error for the caller to
    /// propagate, others are logged as a WARNING.
    pub fn fail(&self, step: &InstallStep, message: impl Into<String>) -> Result<(), SetupError> {
        let message = message.into();
        if step.fatal {
            Err(SetupError::step(step.name, message))
        } else {
            self.journal.warn(&message);
            Ok(())
        }
    }

    /// Run `action`; on a `String` error report it under `step`.
    pub fn check(
        &self,
        step: &InstallStep,
        action: impl FnOnce() -> Result<(), String>,
    ) -> Result<bool, SetupError> {
        self.journal.info(&step.description);
        match action() {
            Ok(()) => Ok(true),
            Err(reason) => {
                self.fail(step, format!("{} failed: {}", step.description, reason))?;
                Ok(false)
            }
        }
    }

    /// Advance the vendor state machine.
    pub fn advance(&self, progress: &mut SetupProgress, next: SetupState) -> Result<(), SetupError> {
        progress
            .transition_to(next)
            .map_err(SetupError::InvalidTransition)
    }
}
