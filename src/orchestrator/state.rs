//! Setup State Management
//!
//! State tracking for one vendor strategy run.
//!
//! - `SetupState`: discrete states of the vendor state machine
//! - `SetupProgress`: current state, restart flag, and start time
//!
//! Transitions are strictly sequential with no retries. A fatal step leaves
//! the progress at the last state it reached; the error carries that state.

use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

use crate::models::VendorKind;

/// Vendor setup state enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupState {
    NotStarted,
    PrerequisitesChecked,
    DriverEnsured,
    ToolkitEnsured,
    Verified,
}

impl SetupState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupState::NotStarted => "not-started",
            SetupState::PrerequisitesChecked => "prerequisites-checked",
            SetupState::DriverEnsured => "driver-ensured",
            SetupState::ToolkitEnsured => "toolkit-ensured",
            SetupState::Verified => "verified",
        }
    }

    /// The single forward successor, if any.
    pub fn next(&self) -> Option<SetupState> {
        match self {
            SetupState::NotStarted => Some(SetupState::PrerequisitesChecked),
            SetupState::PrerequisitesChecked => Some(SetupState::DriverEnsured),
            SetupState::DriverEnsured => Some(SetupState::ToolkitEnsured),
            SetupState::ToolkitEnsured => Some(SetupState::Verified),
            SetupState::Verified => None,
        }
    }

    pub fn can_transition_to(&self, next: SetupState) -> bool {
        self.next() == Some(next)
    }

    pub fn is_terminal(&self) -> bool {
        *self == SetupState::Verified
    }
}

impl fmt::Display for SetupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one vendor strategy run.
#[derive(Debug, Clone)]
pub struct SetupProgress {
    pub vendor: VendorKind,
    pub state: SetupState,
    /// A driver was installed in this run and needs a reboot to load
    pub restart_required: bool,
    pub started_at: DateTime<Local>,
}

impl SetupProgress {
    pub fn new(vendor: VendorKind) -> Self {
        SetupProgress {
            vendor,
            state: SetupState::NotStarted,
            restart_required: false,
            started_at: Local::now(),
        }
    }

    /// Attempt to transition to the next state.
    pub fn transition_to(&mut self, next: SetupState) -> Result<(), String> {
        if !self.state.can_transition_to(next) {
            return Err(format!(
                "{} -> {}",
                self.state.as_str(),
                next.as_str()
            ));
        }
        log::debug!("[Setup] {}: {} -> {}", self.vendor, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Wall-clock time since the run started. Zero if the clock went backwards.
    pub fn elapsed(&self) -> Duration {
        (Local::now() - self.started_at).to_std().unwrap_or_default()
    }

    pub fn is_verified(&self) -> bool {
        self.state == SetupState::Verified
    }
}
