//! Host platform model and detection.
//!
//! - [`Distribution`] / [`DistributionConfig`]: static registry of known distributions
//! - [`detect`]: builds a [`PlatformInfo`] snapshot of the running host
//! - [`platform_paths`]: install/bin/config/cache directories per platform

mod detect;
mod distro;

pub use detect::{detect, detect_with};
pub use distro::{Distribution, DistributionConfig, Family};

#[cfg(test)]
pub(crate) use detect::tests::FakeHost;

use std::fmt;
use std::path::PathBuf;

use crate::package::PackageManager;

/// Kernel / OS family the process runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    Macos,
    Windows,
    /// Termux and native Android userlands
    Android,
    /// iSH on iOS
    Ios,
    /// ChromeOS Linux container (Crostini)
    Chromeos,
    Freebsd,
    Openbsd,
    Netbsd,
    Dragonfly,
}

impl OsFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Chromeos => "chromeos",
            Self::Freebsd => "freebsd",
            Self::Openbsd => "openbsd",
            Self::Netbsd => "netbsd",
            Self::Dragonfly => "dragonfly",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X64,
    Arm64,
    Arm,
    X86,
}

impl Architecture {
    /// Map `uname -m` output (or a Rust target arch) to an architecture.
    /// Anything unrecognized is x64.
    pub fn from_uname(machine: &str) -> Self {
        match machine.trim() {
            "x86_64" => Self::X64,
            "aarch64" | "arm64" => Self::Arm64,
            "armv7l" | "armhf" | "arm" => Self::Arm,
            "i386" | "i686" | "x86" => Self::X86,
            _ => Self::X64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::X86 => "x86",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details about a mobile sandbox (Termux or iSH).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileConfig {
    pub is_termux: bool,
    pub is_ish: bool,
    pub is_rooted: bool,
    pub storage_path: PathBuf,
    pub has_proot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Router,
    /// Single-board computer, e.g. a Raspberry Pi
    Sbc,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Router => "router",
            Self::Sbc => "sbc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedConfig {
    pub device_type: DeviceType,
    pub has_limited_storage: bool,
    pub has_limited_ram: bool,
    pub architecture: Architecture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallType {
    Iptables,
    Nftables,
}

impl FirewallType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iptables => "iptables",
            Self::Nftables => "nftables",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub firewall_type: Option<FirewallType>,
    pub has_web_interface: bool,
    pub default_interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPaths {
    pub install_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
}

/// Snapshot of the running host, built once per process.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub os: OsFamily,
    pub arch: Architecture,
    pub distribution: &'static DistributionConfig,
    pub is_mobile: bool,
    pub mobile_config: Option<MobileConfig>,
    pub is_embedded: bool,
    pub embedded_config: Option<EmbeddedConfig>,
    pub is_network_os: bool,
    pub network_config: Option<NetworkConfig>,
    pub is_wsl: bool,
    pub is_container: bool,
    pub is_live_cd: bool,
    pub is_portable: bool,
    pub shell: String,
    pub package_manager: &'static PackageManager,
    pub paths: PlatformPaths,
}

impl PlatformInfo {
    /// Short human summary, e.g. `Ubuntu (linux-x64)`.
    pub fn summary(&self) -> String {
        format!("{} ({}-{})", self.distribution.name, self.os, self.arch)
    }
}

/// Resolve filesystem locations for the installer.
///
/// Pure function of its inputs: mobile sandboxes get fixed paths, Windows is
/// relative to the user profile, everything else follows XDG-style layout.
pub fn platform_paths(
    os: OsFamily,
    mobile: Option<&MobileConfig>,
    home: &str,
    local_app_data: Option<&str>,
) -> PlatformPaths {
    if let Some(mobile) = mobile {
        if mobile.is_termux {
            return PlatformPaths {
                install_dir: "/data/data/com.termux/files/usr/opt/ultimate-installer".into(),
                bin_dir: "/data/data/com.termux/files/usr/bin".into(),
                config_dir: "/data/data/com.termux/files/home/.config/ultimate-installer".into(),
                cache_dir: "/data/data/com.termux/files/usr/tmp/ui-cache".into(),
            };
        }
        if mobile.is_ish {
            return PlatformPaths {
                install_dir: "/opt/ultimate-installer".into(),
                bin_dir: "/usr/local/bin".into(),
                config_dir: "/root/.config/ultimate-installer".into(),
                cache_dir: "/tmp/ui-cache".into(),
            };
        }
    }

    match os {
        OsFamily::Windows => {
            let local_app_data = local_app_data.unwrap_or(home);
            PlatformPaths {
                install_dir: format!("{home}\\.ultimate-installer").into(),
                bin_dir: format!("{local_app_data}\\Microsoft\\WindowsApps").into(),
                config_dir: format!("{home}\\AppData\\Roaming\\ultimate-installer").into(),
                cache_dir: format!("{home}\\AppData\\Local\\Temp\\ui-cache").into(),
            }
        }
        OsFamily::Macos => PlatformPaths {
            install_dir: "/opt/ultimate-installer".into(),
            bin_dir: "/usr/local/bin".into(),
            config_dir: format!("{home}/Library/Application Support/ultimate-installer").into(),
            cache_dir: format!("{home}/Library/Caches/ultimate-installer").into(),
        },
        _ => PlatformPaths {
            install_dir: "/opt/ultimate-installer".into(),
            bin_dir: "/usr/local/bin".into(),
            config_dir: format!("{home}/.config/ultimate-installer").into(),
            cache_dir: "/var/cache/ultimate-installer".into(),
        },
    }
}
