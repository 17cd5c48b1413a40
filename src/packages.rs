//! Idempotent package installation over apt/dpkg.
//!
//! Presence is always checked live with `dpkg-query` before `apt-get install`
//! runs, so asking for the same package twice installs it at most once.

use crate::models::{CommandOutput, InstallOutcome};
use crate::system::CommandRunner;
use once_cell::sync::Lazy;
use regex::Regex;

static PACKAGE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9+.\-]*$").expect("package name pattern is valid"));

/// Debian package names: lowercase alphanumerics plus `+ - .`.
pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME_RE.is_match(name)
}

/// apt front end used by the orchestrator and vendor strategies.
pub struct PackageInstaller<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> PackageInstaller<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        PackageInstaller { runner }
    }

    /// Whether dpkg reports the package as fully installed.
    pub fn is_installed(&self, package: &str) -> bool {
        let output = self
            .runner
            .run("dpkg-query", &["-W", "-f=${Status}", package]);
        output.success() && output.stdout.contains("install ok installed")
    }

    /// Install `package` unless it is already present.
    pub fn ensure_installed(&self, package: &str) -> InstallOutcome {
        // VALIDATE: never hand apt something that looks like a flag or a path
        if !is_valid_package_name(package) {
            return InstallOutcome::Failed(format!("invalid package name '{}'", package));
        }

        if self.is_installed(package) {
            log::debug!("[Packages] {} already installed", package);
            return InstallOutcome::AlreadyPresent;
        }

        log::debug!("[Packages] installing {}", package);
        let output = self
            .runner
            .run("apt-get", &["install", "-y", "--", package]);
        if output.success() {
            InstallOutcome::Installed
        } else {
            InstallOutcome::Failed(output.failure_reason())
        }
    }

    /// `apt-get update`.
    pub fn update_indices(&self) -> Result<(), String> {
        check(self.runner.run("apt-get", &["update"]))
    }

    /// `apt-get upgrade -y`.
    pub fn full_upgrade(&self) -> Result<(), String> {
        check(self.runner.run("apt-get", &["upgrade", "-y"]))
    }

    /// Whether a program is on `PATH`.
    pub fn command_available(&self, program: &str) -> bool {
        self.runner.command_exists(program)
    }
}

fn check(output: CommandOutput) -> Result<(), String> {
    if output.success() {
        Ok(())
    } else {
        Err(output.failure_reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// Minimal dpkg/apt double: tracks installs and counts apt invocations.
    #[derive(Default)]
    struct AptDouble {
        installed: RefCell<HashSet<String>>,
        broken: HashSet<String>,
        apt_installs: RefCell<usize>,
    }

    impl CommandRunner for AptDouble {
        fn run(&self, program: &str, args: &[&str]) -> CommandOutput {
            let package = args.last().copied().unwrap_or_default();
            match (program, args.first().copied()) {
                ("dpkg-query", _) if self.installed.borrow().contains(package) => {
                    CommandOutput::ok("install ok installed")
                }
                ("dpkg-query", _) => CommandOutput::failed(1, "no packages found"),
                ("apt-get", Some("install")) => {
                    *self.apt_installs.borrow_mut() += 1;
                    if self.broken.contains(package) {
                        CommandOutput::failed(100, "E: Unable to locate package")
                    } else {
                        self.installed.borrow_mut().insert(package.to_string());
                        CommandOutput::ok("")
                    }
                }
                ("apt-get", _) => CommandOutput::ok(""),
                _ => CommandOutput::failed(127, "not found"),
            }
        }
    }

    #[test]
    fn test_second_install_is_already_present() {
        let apt = AptDouble::default();
        let installer = PackageInstaller::new(&apt);

        assert_eq!(installer.ensure_installed("dkms"), InstallOutcome::Installed);
        assert_eq!(installer.ensure_installed("dkms"), InstallOutcome::AlreadyPresent);
        assert_eq!(*apt.apt_installs.borrow(), 1);
    }

    #[test]
    fn test_failed_install_reports_reason() {
        let mut apt = AptDouble::default();
        apt.broken.insert("rocm-hip-sdk".to_string());
        let installer = PackageInstaller::new(&apt);

        assert_eq!(
            installer.ensure_installed("rocm-hip-sdk"),
            InstallOutcome::Failed("E: Unable to locate package".to_string())
        );
    }

    #[test]
    fn test_invalid_name_never_reaches_apt() {
        let apt = AptDouble::default();
        let installer = PackageInstaller::new(&apt);

        assert!(!installer.ensure_installed("--purge").is_success());
        assert!(!installer.ensure_installed("pkg; rm -rf /").is_success());
        assert_eq!(*apt.apt_installs.borrow(), 0);
    }

    #[test]
    fn test_package_name_validation() {
        assert!(is_valid_package_name("linux-headers-6.8.0-45-generic"));
        assert!(is_valid_package_name("g++"));
        assert!(!is_valid_package_name("Upper"));
        assert!(!is_valid_package_name(""));
    }
}
