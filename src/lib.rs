//! GPU Setup
//!
//! Detects the GPU on an Ubuntu host, installs the matching vendor driver and
//! compute toolkit (CUDA for NVIDIA, ROCm for AMD), reports live status, and
//! keeps an append-only install log.
//!
//! The system is organized into functional modules:
//! - **error**: Fatal setup and configuration errors
//! - **models**: Core data types (vendor kind, log entries, install outcomes)
//! - **config**: Immutable configuration and the JSON override loader
//! - **system**: Subprocess abstraction, privilege checks, os-release, signals
//! - **log_collector**: Console and persisted log sinks
//! - **hardware**: PCI-based vendor detection
//! - **packages**: Idempotent apt installation
//! - **vendor**: NVIDIA and AMD setup strategies
//! - **orchestrator**: The `build` sequence and setup state machine
//! - **status**: Live status queries
//! - **cli** / **app**: Command-line surface and dispatch

pub mod error;
pub mod models;

pub mod config;
pub mod system;

pub mod log_collector;

pub mod hardware;
pub mod packages;

pub mod context;
pub mod vendor;

pub mod orchestrator;
pub mod status;

pub mod app;
pub mod cli;

// ============================================================================
// PUBLIC RE-EXPORTS FOR CONVENIENCE
// ============================================================================

pub use error::{ConfigError, SetupError};

pub use models::{CommandOutput, InstallOutcome, InstallStep, LogEntry, LogLevel, VendorKind};

pub use config::AppConfig;

pub use system::{CommandRunner, SystemRunner};

pub use log_collector::{Console, ConsoleCapture, Journal, LogCollector, LogStore, PurgeOutcome};

pub use hardware::HardwareDetector;

pub use packages::PackageInstaller;

pub use context::SetupContext;

pub use vendor::{AmdStrategy, NvidiaStrategy, StrategyRegistry, VendorStrategy};

pub use orchestrator::{BuildSummary, Orchestrator, SetupProgress, SetupState};

pub use status::{StatusReport, StatusReporter};

pub use app::App;

/// Tool name as shown to operators
pub const NAME: &str = "gpu-setup";

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
