use std::process::ExitCode;

use gpu_setup::cli::wants_verbose;
use gpu_setup::config::{config_path, load_config};
use gpu_setup::system::{privilege, signals, SystemRunner};
use gpu_setup::{App, Journal, LogCollector};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // =========================================================================
    // PRIVILEGE CHECK - MUST BE FIRST
    // =========================================================================
    if !privilege::is_root() {
        eprintln!("[ERROR] {} must be run as root (try: sudo {})", gpu_setup::NAME, args.join(" "));
        return ExitCode::from(1);
    }

    // Diagnostics through the `log` facade; operator output goes through Journal
    if let Err(e) = LogCollector::new(wants_verbose(&args)).install() {
        eprintln!("[WARNING] Failed to register diagnostic logger: {}", e);
    }

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[ERROR] Failed to load configuration from {}: {}", config_path().display(), e);
            return ExitCode::from(1);
        }
    };

    if let Err(e) = signals::install_interrupt_handler() {
        log::warn!("[Main] interrupt handler unavailable: {}", e);
    }

    let runner = SystemRunner::new();
    let journal = Journal::from_config(&config);
    let app = App::new(&config, &runner, &journal).with_invoking_user(privilege::invoking_user());

    let code = app.run(&args);
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
