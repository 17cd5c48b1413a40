//! Setup Orchestration: distribution check -> detection -> prerequisites -> vendor strategy -> status.

pub mod state;

pub use state::{SetupProgress, SetupState};

use crate::context::SetupContext;
use crate::error::SetupError;
use crate::hardware::HardwareDetector;
use crate::models::{InstallStep, VendorKind};
use crate::status::StatusReporter;
use crate::system::{kernel_release, OsRelease};
use crate::vendor::StrategyRegistry;
use chrono::{DateTime, Local};
use std::time::Duration;

/// What a completed `build` run did.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub vendor: VendorKind,
    pub final_state: SetupState,
    pub warnings: usize,
    /// The vendor's live driver check still fails after setup
    pub restart_required: bool,
    /// When the vendor strategy started
    pub started_at: DateTime<Local>,
    /// Strategy run through status report
    pub elapsed: Duration,
}

/// Drives the full `build` operation and decides fatal vs recoverable.
pub struct Orchestrator<'a> {
    ctx: &'a SetupContext<'a>,
    registry: StrategyRegistry,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ctx: &'a SetupContext<'a>) -> Self {
        Self::with_registry(ctx, StrategyRegistry::default())
    }

    pub fn with_registry(ctx: &'a SetupContext<'a>, registry: StrategyRegistry) -> Self {
        Orchestrator { ctx, registry }
    }

    /// Run the end-to-end setup.
    ///
    /// Detection happens once, before any package is touched, so an
    /// unsupported host aborts without installing anything.
    pub fn build(&self) -> Result<BuildSummary, SetupError> {
        let ctx = self.ctx;
        let journal = ctx.journal;
        journal.info(&format!("Starting GPU setup ({} v{})", crate::NAME, crate::VERSION));

        self.check_distribution();

        let vendor = HardwareDetector::new(ctx.runner).detect();
        if !vendor.is_supported() {
            return Err(SetupError::UnsupportedHardware);
        }
        journal.info(&format!("Detected {} GPU", vendor));

        let refresh = InstallStep::new("package-index", "Refreshing package indices").fatal();
        ctx.check(&refresh, || ctx.packages.update_indices())?;

        let common = InstallStep::new("common-prerequisites", "Installing common prerequisites");
        journal.info(&common.description);
        ctx.ensure_all(&common, &self.common_packages())?;

        let extras = InstallStep::new("vendor-packages", format!("Installing {} utilities", vendor));
        if !ctx.config.vendor_packages(vendor).is_empty() {
            journal.info(&extras.description);
        }
        ctx.ensure_all(&extras, ctx.config.vendor_packages(vendor))?;

        if ctx.config.full_upgrade {
            let upgrade = InstallStep::new("full-upgrade", "Upgrading installed packages");
            ctx.check(&upgrade, || ctx.packages.full_upgrade())?;
        }

        journal.store().initialize().map_err(|e| SetupError::LogStore {
            path: journal.store().path().to_path_buf(),
            reason: e.to_string(),
        })?;

        let strategy = self
            .registry
            .get(vendor)
            .ok_or(SetupError::UnsupportedHardware)?;
        let mut progress = SetupProgress::new(vendor);
        if let Err(e) = strategy.run(ctx, &mut progress) {
            log::debug!(
                "[Setup] {} aborted after {:.1}s",
                progress.vendor,
                progress.elapsed().as_secs_f64()
            );
            return Err(SetupError::Aborted {
                state: progress.state,
                source: Box::new(e),
            });
        }

        StatusReporter::new(ctx, &self.registry).render_vendor(vendor);

        let restart_required = !strategy.driver_active(ctx);
        if restart_required {
            journal.info("Restart required: reboot the system to load the new GPU driver, then run 'gpu-setup status'");
        }

        let summary = BuildSummary {
            vendor,
            final_state: progress.state,
            warnings: journal.warnings(),
            restart_required,
            started_at: progress.started_at,
            elapsed: progress.elapsed(),
        };
        let took = format!("{}s", summary.elapsed.as_secs());
        if summary.warnings == 0 {
            journal.success(&format!("GPU setup completed in {}", took));
        } else {
            journal.success(&format!(
                "GPU setup completed in {} with {} warning(s); see 'gpu-setup logs'",
                took, summary.warnings
            ));
        }
        Ok(summary)
    }

    /// Warn, but continue, on a distribution other than the expected one.
    fn check_distribution(&self) {
        let ctx = self.ctx;
        let expected = &ctx.config.expected_distro;
        match OsRelease::load(&ctx.config.os_release_path) {
            Ok(release) if release.id == *expected => {
                log::debug!("[Setup] distribution: {}", release.display_name());
            }
            Ok(release) => ctx.journal.warn(&format!(
                "This tool is designed for {} but detected {}; continuing anyway",
                expected,
                release.display_name()
            )),
            Err(e) => ctx.journal.warn(&format!(
                "Could not read {} ({}); continuing without distribution check",
                ctx.config.os_release_path.display(),
                e
            )),
        }
    }

    /// Configured common packages plus headers for the running kernel.
    fn common_packages(&self) -> Vec<String> {
        let mut packages = self.ctx.config.common_packages.clone();
        if self.ctx.config.kernel_headers {
            match kernel_release(self.ctx.runner) {
                Some(release) => packages.push(format!("linux-headers-{}", release)),
                None => self.ctx.journal.warn("Could not determine running kernel; skipping kernel headers"),
            }
        }
        packages
    }
}
