//! Configuration for GPU Setup.
//!
//! All paths, package lists and tunables live in one immutable [`AppConfig`]
//! built once at startup and passed by reference to every component.
//!
//! # Module Structure
//!
//! - `loader`: reads the optional JSON override file and validates it
//!
//! Every field has a default, so an override file only needs the keys it
//! changes:
//!
//! ```json
//! { "full_upgrade": true, "console_pause_ms": 0 }
//! ```

pub mod loader;

pub use loader::{config_path, load_config, load_config_from_file, DEFAULT_CONFIG_PATH};

use crate::models::VendorKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the install log
    pub log_dir: PathBuf,
    /// File name of the install log inside `log_dir`
    pub log_file_name: String,
    /// Where `install` copies the running binary
    pub install_path: PathBuf,
    /// os-release file used for the distribution check and ROCm channel choice
    pub os_release_path: PathBuf,
    /// Distribution ID the tool is written for; other IDs only warn
    pub expected_distro: String,
    /// Run `apt-get upgrade` during `build`
    pub full_upgrade: bool,
    /// Pause after each console message, in milliseconds
    pub console_pause_ms: u64,
    /// Colourise console output
    pub color: bool,
    /// Packages every host gets before vendor setup
    pub common_packages: Vec<String>,
    /// Also install `linux-headers-<running kernel>`
    pub kernel_headers: bool,
    pub nvidia: NvidiaConfig,
    pub amd: AmdConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_dir: PathBuf::from("/var/log/gpu-setup"),
            log_file_name: "install.log".to_string(),
            install_path: PathBuf::from("/usr/local/bin/gpu-setup"),
            os_release_path: PathBuf::from("/etc/os-release"),
            expected_distro: "ubuntu".to_string(),
            full_upgrade: false,
            console_pause_ms: 300,
            color: true,
            common_packages: strings(&["build-essential", "dkms", "pciutils", "curl", "wget"]),
            kernel_headers: true,
            nvidia: NvidiaConfig::default(),
            amd: AmdConfig::default(),
        }
    }
}

impl AppConfig {
    /// Full path of the install log.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(&self.log_file_name)
    }

    pub fn console_pause(&self) -> Duration {
        Duration::from_millis(self.console_pause_ms)
    }

    /// Small package subset installed right after detection, before the
    /// vendor strategy runs.
    pub fn vendor_packages(&self, vendor: VendorKind) -> &[String] {
        match vendor {
            VendorKind::Nvidia => &self.nvidia.extra_packages,
            VendorKind::Amd => &self.amd.extra_packages,
            VendorKind::Unknown => &[],
        }
    }
}

/// NVIDIA driver and CUDA settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NvidiaConfig {
    /// Provides `ubuntu-drivers`
    pub helper_package: String,
    pub toolkit_package: String,
    pub extra_packages: Vec<String>,
}

impl Default for NvidiaConfig {
    fn default() -> Self {
        NvidiaConfig {
            helper_package: "ubuntu-drivers-common".to_string(),
            toolkit_package: "nvidia-cuda-toolkit".to_string(),
            extra_packages: strings(&["nvtop"]),
        }
    }
}

/// One ROCm apt channel, selected by distribution release.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RocmChannel {
    /// `VERSION_ID` from os-release, e.g. `22.04`
    pub release: String,
    /// Ubuntu codename used in the apt source line
    pub codename: String,
    /// ROCm version directory on the repository
    pub rocm_version: String,
}

impl RocmChannel {
    fn new(release: &str, codename: &str, rocm_version: &str) -> Self {
        RocmChannel {
            release: release.to_string(),
            codename: codename.to_string(),
            rocm_version: rocm_version.to_string(),
        }
    }
}

/// AMD ROCm settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmdConfig {
    pub kernel_module: String,
    pub prerequisites: Vec<String>,
    pub key_url: String,
    pub keyring_path: PathBuf,
    pub repo_base_url: String,
    pub source_list_path: PathBuf,
    pub channels: Vec<RocmChannel>,
    pub fallback_channel: RocmChannel,
    pub toolkit_packages: Vec<String>,
    pub monitor_command: String,
    pub monitor_package: String,
    pub device_groups: Vec<String>,
    pub rocm_root: PathBuf,
    pub env_file_path: PathBuf,
    pub extra_packages: Vec<String>,
}

impl Default for AmdConfig {
    fn default() -> Self {
        AmdConfig {
            kernel_module: "amdgpu".to_string(),
            prerequisites: strings(&["wget", "gnupg2", "gawk", "curl"]),
            key_url: "https://repo.radeon.com/rocm/rocm.gpg.key".to_string(),
            keyring_path: PathBuf::from("/etc/apt/keyrings/rocm.gpg"),
            repo_base_url: "https://repo.radeon.com/rocm/apt".to_string(),
            source_list_path: PathBuf::from("/etc/apt/sources.list.d/rocm.list"),
            channels: vec![
                RocmChannel::new("24.04", "noble", "6.1.2"),
                RocmChannel::new("22.04", "jammy", "6.0.2"),
                RocmChannel::new("20.04", "focal", "5.7.3"),
            ],
            fallback_channel: RocmChannel::new("22.04", "jammy", "6.0.2"),
            toolkit_packages: strings(&["rocm-hip-sdk", "rocm-opencl-runtime", "rocm-smi-lib"]),
            monitor_command: "rocm-smi".to_string(),
            monitor_package: "rocm-smi".to_string(),
            device_groups: strings(&["render", "video"]),
            rocm_root: PathBuf::from("/opt/rocm"),
            env_file_path: PathBuf::from("/etc/profile.d/rocm.sh"),
            extra_packages: strings(&["radeontop", "mesa-utils"]),
        }
    }
}

impl AmdConfig {
    /// Channel registered for a distribution release, if any.
    pub fn channel_for(&self, release: &str) -> Option<&RocmChannel> {
        self.channels.iter().find(|c| c.release == release)
    }

    /// Contents of the environment profile written after ROCm installs.
    pub fn env_file_contents(&self) -> String {
        let root = self.rocm_root.display();
        format!(
            "# Added by gpu-setup\nexport PATH=\"$PATH:{root}/bin\"\nexport LD_LIBRARY_PATH=\"$LD_LIBRARY_PATH:{root}/lib\"\n"
        )
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
