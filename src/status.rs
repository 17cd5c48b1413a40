//! Live GPU, driver and toolkit status.
//!
//! Everything is queried from the running system on each call; the install
//! log is never consulted and never written.

use crate::context::SetupContext;
use crate::hardware::HardwareDetector;
use crate::models::VendorKind;
use crate::vendor::StrategyRegistry;
use std::fmt;

/// Snapshot of live status for one vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub vendor: VendorKind,
    pub model: Option<String>,
    pub devices: Vec<String>,
    pub driver: Option<String>,
    pub toolkit_name: &'static str,
    pub toolkit: Option<String>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vendor.is_supported() {
            return writeln!(f, "No supported GPU detected (NVIDIA or AMD required)");
        }

        writeln!(f, "Vendor:  {}", self.vendor)?;
        if let Some(model) = &self.model {
            writeln!(f, "Model:   {}", model)?;
        }
        writeln!(f, "Devices:")?;
        if self.devices.is_empty() {
            writeln!(f, "  (none listed by lspci)")?;
        }
        for device in &self.devices {
            writeln!(f, "  {}", device)?;
        }
        match &self.driver {
            Some(version) => writeln!(f, "Driver:  loaded (version {})", version)?,
            None => writeln!(f, "Driver:  not loaded")?,
        }
        match &self.toolkit {
            Some(version) => writeln!(f, "{}:    {}", self.toolkit_name, version),
            None => writeln!(f, "{}:    not installed", self.toolkit_name),
        }
    }
}

/// Read-only status queries.
pub struct StatusReporter<'a> {
    ctx: &'a SetupContext<'a>,
    registry: &'a StrategyRegistry,
}

impl<'a> StatusReporter<'a> {
    pub fn new(ctx: &'a SetupContext<'a>, registry: &'a StrategyRegistry) -> Self {
        StatusReporter { ctx, registry }
    }

    /// Detect the vendor and collect its status.
    pub fn report(&self) -> StatusReport {
        let vendor = HardwareDetector::new(self.ctx.runner).detect();
        self.report_vendor(vendor)
    }

    /// Collect status for an already detected vendor.
    pub fn report_vendor(&self, vendor: VendorKind) -> StatusReport {
        let detector = HardwareDetector::new(self.ctx.runner);
        match self.registry.get(vendor) {
            Some(strategy) => StatusReport {
                vendor,
                model: detector.gpu_model(),
                devices: detector.matching_devices(vendor),
                driver: strategy.driver_version(self.ctx),
                toolkit_name: strategy.toolkit_name(),
                toolkit: strategy.toolkit_version(self.ctx),
            },
            None => StatusReport {
                vendor: VendorKind::Unknown,
                model: None,
                devices: Vec::new(),
                driver: None,
                toolkit_name: "Toolkit",
                toolkit: None,
            },
        }
    }

    /// Detect, then print to the console.
    pub fn render(&self) -> StatusReport {
        let report = self.report();
        self.print(&report);
        report
    }

    /// Print status for an already detected vendor.
    pub fn render_vendor(&self, vendor: VendorKind) -> StatusReport {
        let report = self.report_vendor(vendor);
        self.print(&report);
        report
    }

    fn print(&self, report: &StatusReport) {
        let console = self.ctx.journal.console();
        console.header("GPU Status");
        for line in report.to_string().lines() {
            console.line(line);
        }
    }
}
