//! Hardware detection public API module.
//!
//! Detection reads the PCI device list through the injected
//! [`CommandRunner`], so it works the same against the real `lspci` and a
//! scripted test runner.

pub mod gpu;

pub use gpu::{classify, clean_gpu_model, vendor_devices};

use crate::models::VendorKind;
use crate::system::CommandRunner;

/// Classifies the installed accelerator from the live PCI listing.
///
/// Nothing is cached: every call queries `lspci` again. The orchestrator
/// calls [`HardwareDetector::detect`] once per run and reuses the result.
pub struct HardwareDetector<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> HardwareDetector<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        HardwareDetector { runner }
    }

    /// Raw `lspci` output; empty when the tool is missing or fails.
    pub fn pci_listing(&self) -> String {
        let output = self.runner.run("lspci", &[]);
        if output.success() {
            output.stdout
        } else {
            log::debug!("[HW] lspci unavailable: {}", output.failure_reason());
            String::new()
        }
    }

    /// Vendor of the installed accelerator. Never fails: no match is `Unknown`.
    pub fn detect(&self) -> VendorKind {
        let vendor = classify(&self.pci_listing());
        log::debug!("[HW] detected vendor: {}", vendor);
        vendor
    }

    /// PCI entries belonging to `vendor`.
    pub fn matching_devices(&self, vendor: VendorKind) -> Vec<String> {
        vendor_devices(&self.pci_listing(), vendor)
    }

    /// Cleaned model name of the first display device.
    pub fn gpu_model(&self) -> Option<String> {
        gpu::model_from_listing(&self.pci_listing())
    }
}
