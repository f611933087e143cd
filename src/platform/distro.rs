use std::fmt;
use std::str::FromStr;

use super::Architecture;
use crate::package::PackageManagerKind;

use Architecture::{Arm, Arm64, X64, X86};

/// Lineage a distribution belongs to. Drives per-family package names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Debian,
    Redhat,
    Arch,
    Alpine,
    Bsd,
    Mobile,
    Suse,
    Gentoo,
    Slackware,
    Nix,
    Independent,
    Embedded,
    Darwin,
    Windows,
}

/// Every distribution the installer knows about.
///
/// Variant order matches [`DISTRIBUTIONS`]; `config()` indexes by discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distribution {
    Termux,
    Ish,
    Android,
    Alpine,
    PostmarketOS,
    Arch,
    BlackArch,
    Manjaro,
    Garuda,
    EndeavourOS,
    ArcoLinux,
    Artix,
    CachyOS,
    Debian,
    Ubuntu,
    Mint,
    Elementary,
    Kodachi,
    Parrot,
    Kali,
    PopOS,
    Zorin,
    Tails,
    Devuan,
    MXLinux,
    AntiX,
    Deepin,
    PureOS,
    Raspbian,
    ChromeOS,
    Fedora,
    CentOS,
    Rhel,
    Rocky,
    Alma,
    Qubes,
    OpenSUSE,
    NixOS,
    Guix,
    Gentoo,
    Pentoo,
    Slackware,
    Void,
    Solus,
    ClearLinux,
    OpenWrt,
    FreeBSD,
    OpenBSD,
    NetBSD,
    DragonFly,
    GhostBSD,
    MacOS,
    Windows,
    Generic,
}

/// Static metadata for a distribution.
#[derive(Debug, PartialEq, Eq)]
pub struct DistributionConfig {
    pub id: Distribution,
    pub key: &'static str,
    pub name: &'static str,
    pub family: Family,
    pub package_manager: PackageManagerKind,
    pub is_security_focused: bool,
    pub is_privacy_focused: bool,
    pub is_live_cd: bool,
    pub is_portable: bool,
    pub default_repos: &'static [&'static str],
    pub supported_architectures: &'static [Architecture],
}

const ALL_ARCH: &[Architecture] = &[X64, Arm64, Arm, X86];
const DESKTOP_ARCH: &[Architecture] = &[X64, Arm64];
const X64_ONLY: &[Architecture] = &[X64];

const fn entry(
    id: Distribution,
    key: &'static str,
    name: &'static str,
    family: Family,
    package_manager: PackageManagerKind,
) -> DistributionConfig {
    DistributionConfig {
        id,
        key,
        name,
        family,
        package_manager,
        is_security_focused: false,
        is_privacy_focused: false,
        is_live_cd: false,
        is_portable: false,
        default_repos: &[],
        supported_architectures: DESKTOP_ARCH,
    }
}

impl DistributionConfig {
    const fn security(mut self) -> Self {
        self.is_security_focused = true;
        self
    }

    const fn privacy(mut self) -> Self {
        self.is_privacy_focused = true;
        self
    }

    const fn live_cd(mut self) -> Self {
        self.is_live_cd = true;
        self
    }

    const fn portable(mut self) -> Self {
        self.is_portable = true;
        self
    }

    const fn repos(mut self, repos: &'static [&'static str]) -> Self {
        self.default_repos = repos;
        self
    }

    const fn archs(mut self, archs: &'static [Architecture]) -> Self {
        self.supported_architectures = archs;
        self
    }

    pub fn supports(&self, arch: Architecture) -> bool {
        self.supported_architectures.contains(&arch)
    }
}

use Distribution as D;
use Family as F;
use PackageManagerKind as P;

pub static DISTRIBUTIONS: &[DistributionConfig] = &[
    // Mobile
    entry(D::Termux, "termux", "Termux (Android)", F::Mobile, P::TermuxPkg)
        .repos(&["https://packages.termux.dev/apt/termux-main"])
        .archs(&[Arm64, Arm, X64]),
    entry(D::Ish, "ish", "iSH (iOS)", F::Alpine, P::Apk)
        .repos(&[
            "https://dl-cdn.alpinelinux.org/alpine/edge/main",
            "https://dl-cdn.alpinelinux.org/alpine/edge/community",
        ])
        .archs(&[X86]),
    entry(D::Android, "android", "Android", F::Mobile, P::TermuxPkg).archs(&[Arm64, Arm]),
    // Alpine
    entry(D::Alpine, "alpine", "Alpine Linux", F::Alpine, P::Apk)
        .repos(&[
            "https://dl-cdn.alpinelinux.org/alpine/latest-stable/main",
            "https://dl-cdn.alpinelinux.org/alpine/latest-stable/community",
        ])
        .archs(ALL_ARCH),
    entry(D::PostmarketOS, "postmarketos", "postmarketOS", F::Alpine, P::Apk)
        .archs(&[Arm64, Arm]),
    // Arch
    entry(D::Arch, "arch", "Arch Linux", F::Arch, P::Pacman).archs(X64_ONLY),
    entry(D::BlackArch, "blackarch", "BlackArch Linux", F::Arch, P::Pacman)
        .security()
        .repos(&["https://blackarch.org/blackarch/blackarch/os/x86_64"])
        .archs(X64_ONLY),
    entry(D::Manjaro, "manjaro", "Manjaro", F::Arch, P::Pacman),
    entry(D::Garuda, "garuda", "Garuda Linux", F::Arch, P::Pacman).archs(X64_ONLY),
    entry(D::EndeavourOS, "endeavouros", "EndeavourOS", F::Arch, P::Pacman).archs(X64_ONLY),
    entry(D::ArcoLinux, "arcolinux", "ArcoLinux", F::Arch, P::Pacman).archs(X64_ONLY),
    entry(D::Artix, "artix", "Artix Linux", F::Arch, P::Pacman).archs(X64_ONLY),
    entry(D::CachyOS, "cachyos", "CachyOS", F::Arch, P::Pacman).archs(X64_ONLY),
    // Debian
    entry(D::Debian, "debian", "Debian", F::Debian, P::Apt).archs(ALL_ARCH),
    entry(D::Ubuntu, "ubuntu", "Ubuntu", F::Debian, P::Apt),
    entry(D::Mint, "mint", "Linux Mint", F::Debian, P::Apt),
    entry(D::Elementary, "elementary", "elementary OS", F::Debian, P::Apt).archs(X64_ONLY),
    entry(D::Kodachi, "kodachi", "Linux Kodachi", F::Debian, P::Apt)
        .security()
        .privacy()
        .live_cd()
        .archs(X64_ONLY),
    entry(D::Parrot, "parrot", "Parrot OS", F::Debian, P::Apt)
        .security()
        .privacy()
        .repos(&["https://deb.parrot.sh/parrot"]),
    entry(D::Kali, "kali", "Kali Linux", F::Debian, P::Apt)
        .security()
        .repos(&["http://http.kali.org/kali"])
        .archs(ALL_ARCH),
    entry(D::PopOS, "pop", "Pop!_OS", F::Debian, P::Apt),
    entry(D::Zorin, "zorin", "Zorin OS", F::Debian, P::Apt).archs(X64_ONLY),
    entry(D::Tails, "tails", "Tails", F::Debian, P::Apt)
        .security()
        .privacy()
        .live_cd()
        .portable()
        .archs(X64_ONLY),
    entry(D::Devuan, "devuan", "Devuan", F::Debian, P::Apt).archs(ALL_ARCH),
    entry(D::MXLinux, "mxlinux", "MX Linux", F::Debian, P::Apt).archs(&[X64, X86]),
    entry(D::AntiX, "antix", "antiX", F::Debian, P::Apt)
        .live_cd()
        .archs(&[X64, X86]),
    entry(D::Deepin, "deepin", "Deepin", F::Debian, P::Apt),
    entry(D::PureOS, "pureos", "PureOS", F::Debian, P::Apt).privacy(),
    entry(D::Raspbian, "raspbian", "Raspberry Pi OS", F::Debian, P::Apt)
        .repos(&["http://raspbian.raspberrypi.org/raspbian"])
        .archs(&[Arm, Arm64]),
    entry(D::ChromeOS, "chromeos", "ChromeOS (Crostini)", F::Debian, P::Apt),
    // Red Hat
    entry(D::Fedora, "fedora", "Fedora", F::Redhat, P::Dnf),
    entry(D::CentOS, "centos", "CentOS", F::Redhat, P::Yum),
    entry(D::Rhel, "rhel", "Red Hat Enterprise Linux", F::Redhat, P::Dnf),
    entry(D::Rocky, "rocky", "Rocky Linux", F::Redhat, P::Dnf),
    entry(D::Alma, "alma", "AlmaLinux", F::Redhat, P::Dnf),
    entry(D::Qubes, "qubes", "Qubes OS", F::Redhat, P::Dnf)
        .security()
        .privacy()
        .archs(X64_ONLY),
    // SUSE
    entry(D::OpenSUSE, "opensuse", "openSUSE", F::Suse, P::Zypper),
    // Nix / Guix
    entry(D::NixOS, "nixos", "NixOS", F::Nix, P::Nix),
    entry(D::Guix, "guix", "GNU Guix System", F::Nix, P::Guix),
    // Gentoo
    entry(D::Gentoo, "gentoo", "Gentoo", F::Gentoo, P::Portage).archs(ALL_ARCH),
    entry(D::Pentoo, "pentoo", "Pentoo", F::Gentoo, P::Portage)
        .security()
        .live_cd()
        .archs(X64_ONLY),
    // Slackware
    entry(D::Slackware, "slackware", "Slackware", F::Slackware, P::Slackpkg).archs(&[X64, X86]),
    // Independent
    entry(D::Void, "void", "Void Linux", F::Independent, P::Xbps).archs(ALL_ARCH),
    entry(D::Solus, "solus", "Solus", F::Independent, P::Eopkg).archs(X64_ONLY),
    entry(D::ClearLinux, "clear", "Clear Linux", F::Independent, P::Swupd).archs(X64_ONLY),
    // Embedded / network
    entry(D::OpenWrt, "openwrt", "OpenWrt", F::Embedded, P::Opkg)
        .repos(&["https://downloads.openwrt.org/releases"])
        .archs(ALL_ARCH),
    // BSD
    entry(D::FreeBSD, "freebsd", "FreeBSD", F::Bsd, P::BsdPkg),
    entry(D::OpenBSD, "openbsd", "OpenBSD", F::Bsd, P::PkgAdd).security(),
    entry(D::NetBSD, "netbsd", "NetBSD", F::Bsd, P::Pkgin).archs(ALL_ARCH),
    entry(D::DragonFly, "dragonfly", "DragonFly BSD", F::Bsd, P::BsdPkg).archs(X64_ONLY),
    entry(D::GhostBSD, "ghostbsd", "GhostBSD", F::Bsd, P::BsdPkg).archs(X64_ONLY),
    // Non-Unix desktops
    entry(D::MacOS, "macos", "macOS", F::Darwin, P::Brew),
    entry(D::Windows, "windows", "Windows", F::Windows, P::Winget),
    // Fallback
    entry(D::Generic, "generic", "Unknown", F::Debian, P::Apt).archs(X64_ONLY),
];

impl Distribution {
    pub const ALL: &'static [Distribution] = &[
        D::Termux,
        D::Ish,
        D::Android,
        D::Alpine,
        D::PostmarketOS,
        D::Arch,
        D::BlackArch,
        D::Manjaro,
        D::Garuda,
        D::EndeavourOS,
        D::ArcoLinux,
        D::Artix,
        D::CachyOS,
        D::Debian,
        D::Ubuntu,
        D::Mint,
        D::Elementary,
        D::Kodachi,
        D::Parrot,
        D::Kali,
        D::PopOS,
        D::Zorin,
        D::Tails,
        D::Devuan,
        D::MXLinux,
        D::AntiX,
        D::Deepin,
        D::PureOS,
        D::Raspbian,
        D::ChromeOS,
        D::Fedora,
        D::CentOS,
        D::Rhel,
        D::Rocky,
        D::Alma,
        D::Qubes,
        D::OpenSUSE,
        D::NixOS,
        D::Guix,
        D::Gentoo,
        D::Pentoo,
        D::Slackware,
        D::Void,
        D::Solus,
        D::ClearLinux,
        D::OpenWrt,
        D::FreeBSD,
        D::OpenBSD,
        D::NetBSD,
        D::DragonFly,
        D::GhostBSD,
        D::MacOS,
        D::Windows,
        D::Generic,
    ];

    /// Static record for this distribution.
    pub fn config(self) -> &'static DistributionConfig {
        &DISTRIBUTIONS[self as usize]
    }

    /// Stable lowercase identifier, e.g. `"kodachi"`.
    pub fn key(self) -> &'static str {
        self.config().key
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }

    pub fn is_mobile(self) -> bool {
        matches!(self, D::Termux | D::Ish | D::Android)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        DISTRIBUTIONS
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.id)
            .ok_or_else(|| format!("unknown distribution '{}'", s))
    }
}
