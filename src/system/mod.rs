//! System module: subprocess execution, privilege checks, host facts, signals

pub mod os_release;
pub mod privilege;
pub mod signals;

pub use os_release::OsRelease;

use crate::models::CommandOutput;
use std::process::Command;

/// Exit code reported when a program cannot be spawned at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 127;

/// Run an external program and capture its result.
///
/// Every vendor strategy and the package installer talk to the host only
/// through this trait, so tests can substitute a scripted runner.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> CommandOutput;

    /// Whether `program` resolves on `PATH`.
    fn command_exists(&self, program: &str) -> bool {
        self.run("which", &[program]).success()
    }
}

/// Production runner backed by `std::process::Command`.
///
/// Commands run non-interactively: apt never prompts, and output is captured
/// rather than inherited.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> CommandOutput {
        log::debug!("[System] exec: {} {}", program, args.join(" "));

        // SAFE: arguments are passed individually, never through a shell
        match Command::new(program)
            .args(args)
            .env("DEBIAN_FRONTEND", "noninteractive")
            .output()
        {
            Ok(output) => {
                let result = CommandOutput {
                    // Killed by a signal: report as a generic failure
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                };
                if !result.success() {
                    log::debug!(
                        "[System] {} exited with {}: {}",
                        program,
                        result.exit_code,
                        result.stderr.trim()
                    );
                }
                result
            }
            Err(e) => {
                log::debug!("[System] failed to spawn {}: {}", program, e);
                CommandOutput::failed(
                    SPAWN_FAILURE_EXIT_CODE,
                    format!("Failed to execute {}: {}", program, e),
                )
            }
        }
    }
}

/// Release string of the running kernel (`uname -r`).
pub fn kernel_release(runner: &dyn CommandRunner) -> Option<String> {
    let output = runner.run("uname", &["-r"]);
    let release = output.stdout.trim();
    if output.success() && !release.is_empty() {
        Some(release.to_string())
    } else {
        None
    }
}
