//! Host detection.
//!
//! All reads go through [`Host`] so the decision logic can be exercised
//! against a fake host in tests.

use std::path::Path;

use duct::cmd;

use super::{
    Architecture, DeviceType, Distribution, EmbeddedConfig, FirewallType, MobileConfig,
    NetworkConfig, OsFamily, PlatformInfo, platform_paths,
};
use crate::error::InstallerError;
use crate::package::PackageManager;

const TERMUX_PREFIX: &str = "/data/data/com.termux/files/usr";
const TERMUX_HOME: &str = "/data/data/com.termux/files/home";

/// Read-only view of the host used by detection.
pub trait Host {
    /// Rust target OS of the running binary (`std::env::consts::OS`).
    fn target_os(&self) -> &str;
    fn env_var(&self, key: &str) -> Option<String>;
    fn path_exists(&self, path: &str) -> bool;
    fn read_to_string(&self, path: &str) -> Option<String>;
    /// Output of `uname <flag>`, trimmed. `None` when uname is unavailable.
    fn uname(&self, flag: &str) -> Option<String>;
    /// Architecture the binary was built for (`std::env::consts::ARCH`).
    fn native_arch(&self) -> &str;
}

/// Host backed by the real process environment and filesystem.
pub struct SystemHost;

impl Host for SystemHost {
    fn target_os(&self) -> &str {
        std::env::consts::OS
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn path_exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn read_to_string(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn uname(&self, flag: &str) -> Option<String> {
        cmd!("uname", flag)
            .stderr_null()
            .read()
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn native_arch(&self) -> &str {
        std::env::consts::ARCH
    }
}

/// Detect the running host.
pub fn detect() -> Result<PlatformInfo, InstallerError> {
    detect_with(&SystemHost)
}

/// Detect through an arbitrary [`Host`] implementation.
///
/// Never fails for Linux: every ambiguity degrades to the generic
/// distribution. Fails only when the kernel family itself is unknown.
pub fn detect_with(host: &dyn Host) -> Result<PlatformInfo, InstallerError> {
    // Windows has no uname
    let arch = match host.uname("-m") {
        Some(machine) => Architecture::from_uname(&machine),
        None => Architecture::from_uname(host.native_arch()),
    };

    let os;
    let mut distribution;
    let mut mobile_config = None;
    let mut is_wsl = false;
    let mut is_container = false;

    match host.target_os() {
        "linux" | "android" => {
            if let Some(mobile) = detect_termux(host) {
                os = OsFamily::Android;
                distribution = Distribution::Termux;
                mobile_config = Some(mobile);
            } else if let Some(mobile) = detect_ish(host) {
                os = OsFamily::Ios;
                distribution = Distribution::Ish;
                mobile_config = Some(mobile);
            } else {
                distribution = detect_linux_distribution(host);
                os = if distribution == Distribution::ChromeOS {
                    OsFamily::Chromeos
                } else {
                    OsFamily::Linux
                };

                is_wsl = host.uname("-r").is_some_and(|release| {
                    let release = release.to_lowercase();
                    release.contains("microsoft") || release.contains("wsl")
                });
                is_container =
                    host.path_exists("/.dockerenv") || host.path_exists("/run/.containerenv");
            }
        }
        "macos" => {
            os = OsFamily::Macos;
            distribution = Distribution::MacOS;
        }
        "windows" => {
            os = OsFamily::Windows;
            distribution = Distribution::Windows;
        }
        other => {
            let kernel = host
                .uname("-s")
                .unwrap_or_else(|| other.to_string())
                .to_lowercase();
            let (bsd_os, bsd_distribution) = classify_bsd(&kernel)
                .ok_or_else(|| InstallerError::UnsupportedOperatingSystem(kernel.clone()))?;
            os = bsd_os;
            distribution = bsd_distribution;
            if distribution == Distribution::FreeBSD && host.path_exists("/etc/ghostbsd-release")
            {
                distribution = Distribution::GhostBSD;
            }
        }
    }

    let config = distribution.config();
    let package_manager = PackageManager::for_kind(config.package_manager);
    let is_mobile = mobile_config.is_some();

    let (embedded_config, network_config) = match distribution {
        Distribution::OpenWrt => (
            Some(EmbeddedConfig {
                device_type: DeviceType::Router,
                has_limited_storage: true,
                has_limited_ram: true,
                architecture: arch,
            }),
            Some(NetworkConfig {
                firewall_type: openwrt_firewall(host),
                has_web_interface: host.path_exists("/www/luci-static"),
                default_interfaces: vec!["br-lan".to_string(), "wan".to_string()],
            }),
        ),
        Distribution::Raspbian => (
            Some(EmbeddedConfig {
                device_type: DeviceType::Sbc,
                has_limited_storage: false,
                has_limited_ram: matches!(arch, Architecture::Arm),
                architecture: arch,
            }),
            None,
        ),
        _ => (None, None),
    };

    let home = host
        .env_var("HOME")
        .or_else(|| host.env_var("USERPROFILE"))
        .unwrap_or_else(|| "/root".to_string());
    let local_app_data = host.env_var("LOCALAPPDATA");
    let paths = platform_paths(os, mobile_config.as_ref(), &home, local_app_data.as_deref());

    let shell = if is_mobile {
        "/bin/sh".to_string()
    } else if os == OsFamily::Windows {
        host
            .env_var("COMSPEC")
            .unwrap_or_else(|| "powershell.exe".to_string())
    } else {
        host
            .env_var("SHELL")
            .unwrap_or_else(|| "/bin/sh".to_string())
    };

    Ok(PlatformInfo {
        os,
        arch,
        distribution: config,
        is_mobile,
        mobile_config,
        is_embedded: embedded_config.is_some(),
        embedded_config,
        is_network_os: network_config.is_some(),
        network_config,
        is_wsl,
        is_container,
        is_live_cd: config.is_live_cd,
        is_portable: config.is_portable,
        shell,
        package_manager,
        paths,
    })
}

/// fw4 (OpenWrt 22.03+) drives nftables, fw3 drives iptables.
fn openwrt_firewall(host: &dyn Host) -> Option<FirewallType> {
    if host.path_exists("/sbin/fw4") {
        Some(FirewallType::Nftables)
    } else if host.path_exists("/sbin/fw3") {
        Some(FirewallType::Iptables)
    } else {
        None
    }
}

fn detect_termux(host: &dyn Host) -> Option<MobileConfig> {
    if host.env_var("TERMUX_VERSION").is_none() && !host.path_exists(TERMUX_PREFIX) {
        return None;
    }
    Some(MobileConfig {
        is_termux: true,
        is_ish: false,
        is_rooted: host.path_exists("/system/bin/su") || host.path_exists("/sbin/su"),
        storage_path: host
            .env_var("HOME")
            .unwrap_or_else(|| TERMUX_HOME.to_string())
            .into(),
        has_proot: host.path_exists(&format!("{TERMUX_PREFIX}/bin/proot")),
    })
}

fn detect_ish(host: &dyn Host) -> Option<MobileConfig> {
    if !host.path_exists("/ish") && !host.path_exists("/proc/ish") {
        return None;
    }
    // iSH always runs as root inside its sandbox, which is not a rooted device
    Some(MobileConfig {
        is_termux: false,
        is_ish: true,
        is_rooted: false,
        storage_path: "/root".into(),
        has_proot: false,
    })
}

fn classify_bsd(kernel: &str) -> Option<(OsFamily, Distribution)> {
    if kernel.contains("freebsd") {
        Some((OsFamily::Freebsd, Distribution::FreeBSD))
    } else if kernel.contains("openbsd") {
        Some((OsFamily::Openbsd, Distribution::OpenBSD))
    } else if kernel.contains("netbsd") {
        Some((OsFamily::Netbsd, Distribution::NetBSD))
    } else if kernel.contains("dragonfly") {
        Some((OsFamily::Dragonfly, Distribution::DragonFly))
    } else {
        None
    }
}

/// `ID` substrings in priority order. Derivatives come before their parent so
/// that e.g. Kodachi is not classified as Debian.
const ID_PRIORITY: &[(&str, Distribution)] = &[
    ("kodachi", Distribution::Kodachi),
    ("parrot", Distribution::Parrot),
    ("blackarch", Distribution::BlackArch),
    ("arch", Distribution::Arch),
    ("manjaro", Distribution::Manjaro),
    ("alpine", Distribution::Alpine),
    ("elementary", Distribution::Elementary),
    ("mint", Distribution::Mint),
    ("ubuntu", Distribution::Ubuntu),
    ("debian", Distribution::Debian),
    ("fedora", Distribution::Fedora),
    ("centos", Distribution::CentOS),
    ("rhel", Distribution::Rhel),
    ("rocky", Distribution::Rocky),
    ("alma", Distribution::Alma),
];

/// Exact `ID` values for distributions outside the priority list.
const ID_EXACT: &[(&str, Distribution)] = &[
    ("postmarketos", Distribution::PostmarketOS),
    ("kali", Distribution::Kali),
    ("pop", Distribution::PopOS),
    ("zorin", Distribution::Zorin),
    ("garuda", Distribution::Garuda),
    ("endeavouros", Distribution::EndeavourOS),
    ("arcolinux", Distribution::ArcoLinux),
    ("artix", Distribution::Artix),
    ("cachyos", Distribution::CachyOS),
    ("tails", Distribution::Tails),
    ("devuan", Distribution::Devuan),
    ("mx", Distribution::MXLinux),
    ("antix", Distribution::AntiX),
    ("deepin", Distribution::Deepin),
    ("pureos", Distribution::PureOS),
    ("raspbian", Distribution::Raspbian),
    ("qubes", Distribution::Qubes),
    ("opensuse", Distribution::OpenSUSE),
    ("opensuse-leap", Distribution::OpenSUSE),
    ("opensuse-tumbleweed", Distribution::OpenSUSE),
    ("nixos", Distribution::NixOS),
    ("guix", Distribution::Guix),
    ("gentoo", Distribution::Gentoo),
    ("pentoo", Distribution::Pentoo),
    ("slackware", Distribution::Slackware),
    ("void", Distribution::Void),
    ("solus", Distribution::Solus),
    ("clear-linux-os", Distribution::ClearLinux),
    ("openwrt", Distribution::OpenWrt),
    ("chromeos", Distribution::ChromeOS),
];

/// Markers that win over os-release. These hosts report their parent's
/// `ID` (Crostini and Tails say `debian`, Qubes dom0 says `fedora`).
const OVERRIDE_MARKERS: &[(&str, Distribution)] = &[
    ("/dev/.cros_milestone", Distribution::ChromeOS),
    ("/etc/cros-release", Distribution::ChromeOS),
    ("/etc/amnesia/version", Distribution::Tails),
    ("/live/persistence/TailsData", Distribution::Tails),
    ("/etc/qubes-release", Distribution::Qubes),
    ("/usr/bin/qubesdb-read", Distribution::Qubes),
];

/// Marker files consulted when os-release gives no answer.
const MARKERS: &[(&str, Distribution)] = &[
    ("/etc/NIXOS", Distribution::NixOS),
    ("/run/current-system/nixos-version", Distribution::NixOS),
    ("/etc/guix-system", Distribution::Guix),
    ("/etc/postmarketos-release", Distribution::PostmarketOS),
    ("/etc/openwrt_release", Distribution::OpenWrt),
    ("/etc/void-release", Distribution::Void),
    ("/etc/gentoo-release", Distribution::Gentoo),
    ("/etc/slackware-version", Distribution::Slackware),
];

fn first_marker(host: &dyn Host, markers: &[(&str, Distribution)]) -> Option<Distribution> {
    markers
        .iter()
        .find(|(path, _)| host.path_exists(path))
        .map(|(_, dist)| *dist)
}

/// `ID` / `ID_LIKE` values extracted from an os-release file.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct OsRelease {
    pub id: String,
    pub id_like: String,
}

pub(crate) fn parse_os_release(content: &str) -> OsRelease {
    let mut release = OsRelease::default();
    for line in content.lines() {
        let line = line.trim();
        if let Some(val) = line.strip_prefix("ID=") {
            release.id = unquote(val).to_lowercase();
        } else if let Some(val) = line.strip_prefix("ID_LIKE=") {
            release.id_like = unquote(val).to_lowercase();
        }
    }
    release
}

fn unquote(val: &str) -> &str {
    val.trim().trim_matches('"').trim_matches('\'')
}

/// Classify from os-release values alone. `None` when nothing matches.
pub(crate) fn classify_os_release(release: &OsRelease) -> Option<Distribution> {
    if !release.id.is_empty() {
        if let Some((_, dist)) = ID_PRIORITY
            .iter()
            .find(|(needle, _)| release.id.contains(needle))
        {
            return Some(*dist);
        }
        if let Some((_, dist)) = ID_EXACT.iter().find(|(id, _)| release.id == *id) {
            return Some(*dist);
        }
    }

    let like = &release.id_like;
    if like.contains("debian") {
        Some(Distribution::Debian)
    } else if like.contains("arch") {
        Some(Distribution::Arch)
    } else if like.contains("fedora") || like.contains("rhel") {
        Some(Distribution::Fedora)
    } else {
        None
    }
}

fn detect_linux_distribution(host: &dyn Host) -> Distribution {
    if let Some(dist) = first_marker(host, OVERRIDE_MARKERS) {
        return dist;
    }
    if let Some(dist) = host
        .read_to_string("/etc/os-release")
        .map(|content| parse_os_release(&content))
        .and_then(|release| classify_os_release(&release))
    {
        return dist;
    }

    if host.path_exists("/etc/arch-release") {
        return Distribution::Arch;
    }
    if host.path_exists("/etc/debian_version") {
        return Distribution::Debian;
    }
    if host.path_exists("/etc/redhat-release") {
        let content = host
            .read_to_string("/etc/redhat-release")
            .unwrap_or_default()
            .to_lowercase();
        return if content.contains("centos") {
            Distribution::CentOS
        } else if content.contains("fedora") {
            Distribution::Fedora
        } else {
            Distribution::Rhel
        };
    }
    if host.path_exists("/etc/alpine-release") {
        return Distribution::Alpine;
    }

    first_marker(host, MARKERS).unwrap_or(Distribution::Generic)
}
