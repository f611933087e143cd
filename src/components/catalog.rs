//! The component catalog: package lists per platform.

use super::{Component, Markers, MobileSupport};
use crate::platform::{Distribution, Family, OsFamily, PlatformInfo};

use OsFamily::*;

const UNIX: &[OsFamily] = &[
    Linux, Macos, Chromeos, Android, Ios, Freebsd, Openbsd, Netbsd, Dragonfly,
];
const EVERYWHERE: &[OsFamily] = &[
    Linux, Macos, Windows, Chromeos, Android, Ios, Freebsd, Openbsd, Netbsd, Dragonfly,
];
const LINUX_AND_BSD: &[OsFamily] = &[
    Linux, Chromeos, Android, Ios, Freebsd, Openbsd, Netbsd, Dragonfly,
];
const DESKTOP_UNIX: &[OsFamily] = &[Linux, Macos, Chromeos, Freebsd, Openbsd, Netbsd, Dragonfly];
const LINUX_AND_MAC: &[OsFamily] = &[Linux, Macos, Chromeos];
const MOBILE: &[OsFamily] = &[Android, Ios];

pub static CATALOG: &[Component] = &[
    Component {
        id: "core",
        name: "Core Tools",
        description: "Essential system tools and utilities",
        category: "system",
        default: true,
        platforms: EVERYWHERE,
        mobile: MobileSupport::Any,
        update_first: false,
        removable: false,
        installed: Markers::All(&["git", "curl"]),
        resolve: core_tools,
    },
    Component {
        id: "devtools",
        name: "Development Tools",
        description: "Programming languages, compilers and build tools",
        category: "development",
        default: true,
        platforms: EVERYWHERE,
        mobile: MobileSupport::Any,
        update_first: true,
        removable: true,
        installed: Markers::Any(&["python3", "python"]),
        resolve: devtools,
    },
    Component {
        id: "security-research",
        name: "Security Research Tools",
        description: "Scanning, exploitation, reverse engineering and OSINT toolkit",
        category: "security",
        default: false,
        platforms: LINUX_AND_BSD,
        mobile: MobileSupport::Any,
        update_first: true,
        removable: true,
        installed: Markers::Any(&["nmap"]),
        resolve: security_research,
    },
    Component {
        id: "privacy",
        name: "Privacy Tools",
        description: "Anonymization, encryption and privacy utilities",
        category: "privacy",
        default: false,
        platforms: UNIX,
        mobile: MobileSupport::Any,
        update_first: false,
        removable: true,
        installed: Markers::Any(&["gpg"]),
        resolve: privacy,
    },
    Component {
        id: "forensics",
        name: "Digital Forensics",
        description: "Digital forensics and incident response tools",
        category: "security",
        default: false,
        platforms: DESKTOP_UNIX,
        mobile: MobileSupport::DesktopOnly,
        update_first: false,
        removable: true,
        installed: Markers::Any(&["fls", "autopsy"]),
        resolve: forensics,
    },
    Component {
        id: "network",
        name: "Network Tools",
        description: "Packet capture, diagnostics and protocol analysis",
        category: "network",
        default: false,
        platforms: UNIX,
        mobile: MobileSupport::Any,
        update_first: false,
        removable: true,
        installed: Markers::Any(&["tcpdump", "wireshark"]),
        resolve: network,
    },
    Component {
        id: "embedded",
        name: "Embedded Development",
        description: "IoT and microcontroller development tools",
        category: "development",
        default: false,
        platforms: LINUX_AND_MAC,
        mobile: MobileSupport::DesktopOnly,
        update_first: false,
        removable: true,
        installed: Markers::Any(&["platformio", "arduino-cli"]),
        resolve: embedded,
    },
    Component {
        id: "mobile-dev",
        name: "Mobile Development Tools",
        description: "Development environment tuned for Termux and iSH",
        category: "development",
        default: false,
        platforms: MOBILE,
        mobile: MobileSupport::MobileOnly,
        update_first: true,
        removable: true,
        installed: Markers::All(&["git"]),
        resolve: mobile_dev,
    },
];

fn is(platform: &PlatformInfo, dist: Distribution) -> bool {
    platform.distribution.id == dist
}

fn core_tools(p: &PlatformInfo) -> Vec<&'static str> {
    const BASE: &[&str] = &["git", "curl", "wget", "unzip", "tar", "vim", "nano"];

    if p.os == Windows {
        return vec!["Git.Git", "cURL.cURL", "JernejSimoncic.Wget", "7zip.7zip", "vim.vim", "GNU.Nano"];
    }
    let mut packages = BASE.to_vec();
    if p.is_mobile {
        if is(p, Distribution::Termux) {
            packages.extend(["termux-api", "termux-tools", "tsu", "proot", "proot-distro"]);
        }
        return packages;
    }
    packages.extend(["htop", "tmux", "zsh", "fish"]);
    if p.os != Macos {
        packages.push("sudo");
    }
    if p.distribution.family == Family::Debian {
        packages.push("software-properties-common");
    }
    packages
}

fn devtools(p: &PlatformInfo) -> Vec<&'static str> {
    if p.os == Windows {
        return vec![
            "Python.Python.3.12",
            "OpenJS.NodeJS.LTS",
            "GoLang.Go",
            "Rustlang.Rustup",
            "EclipseAdoptium.Temurin.17.JDK",
            "Kitware.CMake",
        ];
    }
    if is(p, Distribution::Termux) {
        return vec![
            "python", "nodejs", "ruby", "golang", "rust", "kotlin", "gradle", "maven", "clang",
            "make", "cmake",
        ];
    }
    if p.is_mobile || p.distribution.family == Family::Alpine {
        return vec![
            "python3", "py3-pip", "nodejs", "npm", "ruby", "go", "rust", "cargo", "make", "cmake",
        ];
    }
    if p.distribution.family == Family::Redhat {
        return vec![
            "python3",
            "python3-pip",
            "nodejs",
            "npm",
            "golang",
            "rust",
            "cargo",
            "java-17-openjdk-devel",
            "cmake",
            "gcc",
            "gcc-c++",
            "make",
        ];
    }
    if p.os == Macos {
        return vec![
            "python", "node", "ruby", "go", "rust", "openjdk@17", "kotlin", "gradle", "maven",
            "cmake",
        ];
    }
    vec![
        "python3",
        "python3-pip",
        "python3-venv",
        "nodejs",
        "npm",
        "ruby",
        "ruby-dev",
        "golang",
        "rustc",
        "cargo",
        "openjdk-17-jdk",
        "kotlin",
        "gradle",
        "maven",
        "clang",
        "make",
        "cmake",
        "gdb",
    ]
}

type ToolTable = &'static [(&'static str, &'static [&'static str])];

/// Security tool categories, each keyed by distribution key. `generic` is the
/// last resort when neither the distribution nor its family parent is listed.
const SECURITY_TOOLS: &[(&str, ToolTable)] = &[
    (
        "network scanning",
        &[
            ("termux", &["nmap", "masscan"]),
            ("ish", &["nmap"]),
            ("alpine", &["nmap"]),
            ("arch", &["nmap", "masscan", "zmap", "unicornscan"]),
            ("blackarch", &["nmap", "masscan", "zmap", "unicornscan", "rustscan", "naabu"]),
            ("manjaro", &["nmap", "masscan"]),
            ("debian", &["nmap", "masscan"]),
            ("ubuntu", &["nmap", "masscan"]),
            ("mint", &["nmap", "masscan"]),
            ("kodachi", &["nmap", "masscan", "zmap"]),
            ("parrot", &["nmap", "masscan", "zmap", "rustscan"]),
            ("fedora", &["nmap", "masscan"]),
            ("generic", &["nmap"]),
        ],
    ),
    (
        "vulnerability scanning",
        &[
            ("termux", &["nikto"]),
            ("ish", &[]),
            ("alpine", &["nikto"]),
            ("arch", &["nikto", "openvas"]),
            ("blackarch", &["nikto", "openvas", "nessus", "nexpose"]),
            ("debian", &["nikto", "openvas-scanner"]),
            ("ubuntu", &["nikto", "openvas-scanner"]),
            ("kodachi", &["nikto", "openvas"]),
            ("parrot", &["nikto", "openvas", "gvm"]),
            ("netbsd", &[]),
            ("generic", &["nikto"]),
        ],
    ),
    (
        "wireless security",
        &[
            ("termux", &["aircrack-ng"]),
            ("ish", &[]),
            ("alpine", &["aircrack-ng", "wireshark"]),
            ("arch", &["aircrack-ng", "wireshark-cli", "wireshark-qt", "kismet", "wifite"]),
            (
                "blackarch",
                &[
                    "aircrack-ng",
                    "wireshark-cli",
                    "wireshark-qt",
                    "kismet",
                    "wifite",
                    "fern-wifi-cracker",
                    "pixiewps",
                ],
            ),
            ("manjaro", &["aircrack-ng", "wireshark-cli"]),
            ("debian", &["aircrack-ng", "wireshark"]),
            ("ubuntu", &["aircrack-ng", "wireshark"]),
            ("mint", &["aircrack-ng", "wireshark"]),
            ("kodachi", &["aircrack-ng", "wireshark", "kismet", "wifite", "reaver"]),
            ("parrot", &["aircrack-ng", "wireshark", "kismet", "wifite", "fern-wifi-cracker"]),
            ("fedora", &["aircrack-ng", "wireshark-cli"]),
            ("openbsd", &[]),
            ("netbsd", &[]),
            ("generic", &["aircrack-ng"]),
        ],
    ),
    (
        "forensics",
        &[
            ("termux", &["sleuthkit"]),
            ("arch", &["sleuthkit", "autopsy", "volatility3", "bulk-extractor"]),
            (
                "blackarch",
                &["sleuthkit", "autopsy", "volatility3", "bulk-extractor", "dff", "dff-gui"],
            ),
            ("debian", &["sleuthkit", "autopsy"]),
            ("ubuntu", &["sleuthkit", "autopsy"]),
            ("kodachi", &["sleuthkit", "autopsy", "volatility"]),
            ("parrot", &["sleuthkit", "autopsy", "volatility3", "bulk-extractor"]),
            ("generic", &["sleuthkit"]),
        ],
    ),
    (
        "reverse engineering",
        &[
            ("arch", &["radare2", "ghidra"]),
            ("blackarch", &["radare2", "ghidra", "cutter", "rizin"]),
            ("manjaro", &["radare2", "ghidra"]),
            ("debian", &["radare2", "ghidra"]),
            ("ubuntu", &["radare2", "ghidra"]),
            ("kodachi", &["radare2", "ghidra"]),
            ("parrot", &["radare2", "ghidra", "cutter"]),
            ("fedora", &["radare2", "ghidra"]),
            ("generic", &["radare2"]),
        ],
    ),
    (
        "exploitation",
        &[
            ("termux", &["metasploit-framework"]),
            ("ish", &[]),
            ("alpine", &[]),
            ("arch", &["metasploit", "exploitdb", "beef"]),
            (
                "blackarch",
                &["metasploit", "exploitdb", "beef", "set", "routersploit", "commix"],
            ),
            ("manjaro", &["metasploit"]),
            ("kodachi", &["metasploit", "exploitdb"]),
            ("parrot", &["metasploit", "exploitdb", "beef", "set"]),
            ("freebsd", &[]),
            ("openbsd", &[]),
            ("netbsd", &[]),
            ("generic", &["exploitdb"]),
        ],
    ),
    (
        "osint",
        &[
            ("arch", &["theharvester", "spiderfoot", "recon-ng"]),
            (
                "blackarch",
                &["theharvester", "maltego", "spiderfoot", "recon-ng", "osrframework", "tinfoleak"],
            ),
            ("ubuntu", &["theharvester", "maltego"]),
            ("kodachi", &["theharvester", "maltego", "spiderfoot"]),
            ("parrot", &["theharvester", "maltego", "spiderfoot", "recon-ng"]),
            ("generic", &["theharvester"]),
        ],
    ),
];

/// The distribution whose table a family member borrows when it has none.
fn family_parent(family: Family) -> Option<&'static str> {
    match family {
        Family::Debian => Some("debian"),
        Family::Arch => Some("arch"),
        Family::Redhat => Some("fedora"),
        Family::Alpine => Some("alpine"),
        _ => None,
    }
}

fn lookup(table: ToolTable, key: &str) -> Option<&'static [&'static str]> {
    table.iter().find(|(k, _)| *k == key).map(|(_, tools)| *tools)
}

fn security_research(p: &PlatformInfo) -> Vec<&'static str> {
    let config = p.distribution;
    SECURITY_TOOLS
        .iter()
        .flat_map(|(_, table)| {
            lookup(table, config.key)
                .or_else(|| family_parent(config.family).and_then(|parent| lookup(table, parent)))
                .or_else(|| lookup(table, "generic"))
                .unwrap_or(&[])
        })
        .copied()
        .collect()
}

fn privacy(p: &PlatformInfo) -> Vec<&'static str> {
    if p.is_mobile {
        return vec!["gnupg", "tor"];
    }
    vec![
        "gnupg",
        "tor",
        "torsocks",
        "proxychains-ng",
        "veracrypt",
        "i2p",
        "wireguard-tools",
        "openvpn",
    ]
}

fn forensics(_: &PlatformInfo) -> Vec<&'static str> {
    vec![
        "sleuthkit",
        "autopsy",
        "volatility3",
        "foremost",
        "scalpel",
        "binwalk",
        "exiftool",
        "pdf-parser",
        "oledump",
        "pcapfix",
    ]
}

fn network(p: &PlatformInfo) -> Vec<&'static str> {
    let mut packages = vec![
        "wireshark",
        "tcpdump",
        "tshark",
        "netcat",
        "nmap",
        "iperf3",
        "mtr",
        "traceroute",
        "whois",
        "dig",
        "curl",
        "wget",
    ];
    if is(p, Distribution::Termux) {
        packages.push("termux-api");
    }
    packages
}

fn embedded(_: &PlatformInfo) -> Vec<&'static str> {
    vec![
        "platformio",
        "arduino-cli",
        "avrdude",
        "esptool",
        "openocd",
        "gdb-multiarch",
        "minicom",
        "picocom",
        "mosquitto",
        "nodejs",
    ]
}

fn mobile_dev(p: &PlatformInfo) -> Vec<&'static str> {
    if is(p, Distribution::Termux) {
        return vec![
            "git", "curl", "wget", "vim", "nano", "python", "nodejs", "ruby", "clang", "make",
            "cmake", "autoconf", "automake", "libtool", "pkg-config", "openssl", "openssh", "tmux",
            "zsh", "fish", "proot", "proot-distro", "termux-api", "termux-tools", "ffmpeg",
            "imagemagick", "sqlite", "postgresql", "redis", "nginx", "php", "composer", "golang",
            "rust", "kotlin", "gradle", "maven", "ant", "ndk-sysroot",
        ];
    }
    vec![
        "git", "curl", "wget", "vim", "nano", "python3", "py3-pip", "nodejs", "npm", "ruby",
        "build-base", "abuild", "binutils", "cmake", "autoconf", "automake", "libtool", "pkgconf",
        "openssl", "openssh", "tmux", "zsh", "fish", "ffmpeg", "imagemagick", "sqlite",
        "postgresql", "redis", "nginx", "php", "composer", "go", "rust", "cargo", "gradle",
        "maven", "openjdk11", "kotlin",
    ]
}
