//! Shared test harness: a scripted command runner and a temp-dir host.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use gpu_setup::{AppConfig, CommandOutput, CommandRunner, Console, ConsoleCapture, Journal, LogStore};
use tempfile::TempDir;

pub const NVIDIA_LSPCI: &str = "00:00.0 Host bridge: Intel Corporation 8th Gen Core Processor Host Bridge\n\
01:00.0 VGA compatible controller: NVIDIA Corporation TU104 [GeForce RTX 2080] (rev a1)\n\
01:00.1 Audio device: NVIDIA Corporation TU104 HD Audio Controller (rev a1)\n";

pub const AMD_LSPCI: &str = "00:00.0 Host bridge: Advanced Micro Devices, Inc. [AMD] Starship/Matisse Root Complex\n\
0b:00.0 VGA compatible controller: Advanced Micro Devices, Inc. [AMD/ATI] Navi 21 [Radeon RX 6800/6800 XT / 6900 XT] (rev c1)\n";

pub const INTEL_LSPCI: &str = "00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 630 (rev 02)\n";

pub const UBUNTU_2204: &str = "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nVERSION_CODENAME=jammy\nID=ubuntu\nPRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\n";

pub const NVCC_BANNER: &str = "nvcc: NVIDIA (R) Cuda compiler driver\nCopyright (c) 2005-2023 NVIDIA Corporation\nCuda compilation tools, release 12.0, V12.0.140\n";

/// Scripted host: tracks dpkg state, answers registered commands, and
/// records every invocation.
#[derive(Default)]
pub struct FakeRunner {
    installed: RefCell<HashSet<String>>,
    broken_packages: HashSet<String>,
    responses: HashMap<String, CommandOutput>,
    /// Output for any invocation of a program without an exact response
    fallbacks: HashMap<String, CommandOutput>,
    /// program -> package that provides it
    provided_by: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        let mut runner = FakeRunner::default();
        runner.respond("apt-get update", CommandOutput::ok("Reading package lists... Done"));
        runner.respond("apt-get upgrade -y", CommandOutput::ok(""));
        runner.respond("uname -r", CommandOutput::ok("6.5.0-41-generic\n"));
        runner
    }

    /// Register the output for an exact command line.
    pub fn respond(&mut self, command_line: &str, output: CommandOutput) -> &mut Self {
        self.responses.insert(command_line.to_string(), output);
        self
    }

    /// Register the output for every invocation of `program`.
    pub fn respond_any(&mut self, program: &str, output: CommandOutput) -> &mut Self {
        self.fallbacks.insert(program.to_string(), output);
        self
    }

    pub fn lspci(&mut self, listing: &str) -> &mut Self {
        self.respond("lspci", CommandOutput::ok(listing))
    }

    pub fn preinstalled(&mut self, package: &str) -> &mut Self {
        self.installed.borrow_mut().insert(package.to_string());
        self
    }

    pub fn broken(&mut self, package: &str) -> &mut Self {
        self.broken_packages.insert(package.to_string());
        self
    }

    /// `program` only exists once `package` is installed.
    pub fn provides(&mut self, package: &str, program: &str) -> &mut Self {
        self.provided_by.insert(program.to_string(), package.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn called(&self, command_line: &str) -> bool {
        self.calls.borrow().iter().any(|c| c == command_line)
    }

    pub fn count(&self, command_line: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == command_line).count()
    }

    /// Calls that would change the host's package state.
    pub fn apt_installs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("apt-get install"))
            .cloned()
            .collect()
    }

    pub fn is_installed(&self, package: &str) -> bool {
        self.installed.borrow().contains(package)
    }

    fn program_present(&self, program: &str) -> bool {
        match self.provided_by.get(program) {
            Some(package) => self.is_installed(package),
            None => {
                self.fallbacks.contains_key(program)
                    || self
                        .responses
                        .keys()
                        .any(|k| k.split_whitespace().next() == Some(program))
            }
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str]) -> CommandOutput {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(line.clone());

        let target = args.last().copied().unwrap_or_default();
        match program {
            "dpkg-query" => {
                if self.is_installed(target) {
                    CommandOutput::ok("install ok installed")
                } else {
                    CommandOutput::failed(1, format!("dpkg-query: no packages found matching {}", target))
                }
            }
            "apt-get" if args.first() == Some(&"install") => {
                if self.broken_packages.contains(target) {
                    CommandOutput::failed(100, format!("E: Unable to locate package {}", target))
                } else {
                    self.installed.borrow_mut().insert(target.to_string());
                    CommandOutput::ok("")
                }
            }
            "which" => {
                if self.program_present(target) {
                    CommandOutput::ok(format!("/usr/bin/{}\n", target))
                } else {
                    CommandOutput::failed(1, "")
                }
            }
            _ if !self.program_present(program) => {
                CommandOutput::failed(127, format!("{}: command not found", program))
            }
            _ => self
                .responses
                .get(&line)
                .or_else(|| self.fallbacks.get(program))
                .cloned()
                .unwrap_or_else(|| CommandOutput::failed(1, format!("unscripted: {}", line))),
        }
    }
}

/// Temp-dir host: every path the tool writes lives under `root`.
pub struct TestHost {
    pub root: TempDir,
    pub config: AppConfig,
}

impl TestHost {
    pub fn new() -> Self {
        let root = TempDir::new().expect("temp dir");
        let base = root.path().to_path_buf();

        let mut config = AppConfig::default();
        config.log_dir = base.join("var/log/gpu-setup");
        config.install_path = base.join("usr/local/bin/gpu-setup");
        config.os_release_path = base.join("etc/os-release");
        config.console_pause_ms = 0;
        config.color = false;
        config.amd.keyring_path = base.join("etc/apt/keyrings/rocm.gpg");
        config.amd.source_list_path = base.join("etc/apt/sources.list.d/rocm.list");
        config.amd.env_file_path = base.join("etc/profile.d/rocm.sh");
        config.amd.rocm_root = base.join("opt/rocm");

        let host = TestHost { root, config };
        host.write_os_release(UBUNTU_2204);
        host
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn write_os_release(&self, content: &str) {
        let path = &self.config.os_release_path;
        fs::create_dir_all(path.parent().expect("os-release has a parent")).expect("mkdir");
        fs::write(path, content).expect("write os-release");
    }

    pub fn journal(&self) -> Journal {
        Journal::new(Console::plain(), LogStore::from_config(&self.config))
    }

    /// Journal whose console lines are recorded for assertions.
    pub fn captured_journal(&self) -> (Journal, ConsoleCapture) {
        let (console, capture) = Console::captured();
        (Journal::new(console, LogStore::from_config(&self.config)), capture)
    }

    pub fn log_text(&self) -> String {
        fs::read_to_string(self.config.log_file()).unwrap_or_default()
    }
}
