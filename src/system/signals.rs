//! Interrupt handling.
//!
//! SIGINT and SIGTERM print a notice and exit at once. Nothing is rolled back:
//! every step is idempotent, so the next `build` resumes from what is already
//! installed.

use tokio::signal::unix::{signal, SignalKind};

/// Exit status used after an interrupt (128 + SIGINT).
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Spawn a watcher thread that terminates the process on SIGINT/SIGTERM.
pub fn install_interrupt_handler() -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?;

    std::thread::Builder::new()
        .name("signal-watch".to_string())
        .spawn(move || {
            runtime.block_on(async {
                let (mut interrupt, mut terminate) = match (
                    signal(SignalKind::interrupt()),
                    signal(SignalKind::terminate()),
                ) {
                    (Ok(i), Ok(t)) => (i, t),
                    (Err(e), _) | (_, Err(e)) => {
                        log::warn!("[Signals] could not register handlers: {}", e);
                        return;
                    }
                };

                let name = tokio::select! {
                    _ = interrupt.recv() => "interrupt",
                    _ = terminate.recv() => "termination",
                };

                eprintln!();
                eprintln!("Received {} signal. Installation interrupted; exiting now.", name);
                eprintln!("Re-run 'gpu-setup build' to continue from the current state.");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            });
        })?;

    Ok(())
}
