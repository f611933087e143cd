//! Package manager registry.
//!
//! Every [`PackageManagerKind`] maps to exactly one static [`PackageManager`]
//! record. Commands are stored pre-tokenized: a program plus fixed flags, with
//! package names appended as separate argv elements at the call site.

use std::fmt;
use std::str::FromStr;

use super::Operation;

/// A base executable plus its fixed leading arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: &'static str,
    pub args: &'static [&'static str],
    /// Non-zero exit codes that still mean success.
    pub ok_codes: &'static [i32],
}

impl CommandSpec {
    pub const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self {
            program,
            args,
            ok_codes: &[],
        }
    }

    pub const fn accepting(mut self, codes: &'static [i32]) -> Self {
        self.ok_codes = codes;
        self
    }

    /// Whether a finished process counts as successful for this command.
    pub fn succeeded(&self, success: bool, code: Option<i32>) -> bool {
        success || code.is_some_and(|code| self.ok_codes.contains(&code))
    }

    /// Build the full argv, appending `extra` tokens verbatim.
    pub fn argv(&self, extra: &[&str]) -> Vec<String> {
        std::iter::once(self.program)
            .chain(self.args.iter().copied())
            .chain(extra.iter().copied())
            .map(str::to_string)
            .collect()
    }
}

/// Secondary package sources a manager's platform can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub aur: bool,
    pub snap: bool,
    pub flatpak: bool,
    pub nix: bool,
    pub guix: bool,
}

impl Capabilities {
    const NONE: Self = Self {
        aur: false,
        snap: false,
        flatpak: false,
        nix: false,
        guix: false,
    };

    /// Names of the reachable sources, in a stable order.
    pub fn sources(&self) -> Vec<&'static str> {
        [
            (self.aur, "aur"),
            (self.snap, "snap"),
            (self.flatpak, "flatpak"),
            (self.nix, "nix"),
            (self.guix, "guix"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

/// Identifies a package manager in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManagerKind {
    /// `pkg` inside Termux
    TermuxPkg,
    Apk,
    Apt,
    Pacman,
    Dnf,
    Yum,
    Zypper,
    Nix,
    Guix,
    Portage,
    Slackpkg,
    Xbps,
    Swupd,
    Eopkg,
    Opkg,
    /// `pkg` on FreeBSD and derivatives
    BsdPkg,
    PkgAdd,
    Pkgin,
    Brew,
    Winget,
}

impl PackageManagerKind {
    pub const ALL: &'static [Self] = &[
        Self::TermuxPkg,
        Self::Apk,
        Self::Apt,
        Self::Pacman,
        Self::Dnf,
        Self::Yum,
        Self::Zypper,
        Self::Nix,
        Self::Guix,
        Self::Portage,
        Self::Slackpkg,
        Self::Xbps,
        Self::Swupd,
        Self::Eopkg,
        Self::Opkg,
        Self::BsdPkg,
        Self::PkgAdd,
        Self::Pkgin,
        Self::Brew,
        Self::Winget,
    ];

    /// Registry record for this kind.
    pub fn manager(self) -> &'static PackageManager {
        PackageManager::for_kind(self)
    }

    /// Stable key used in settings and JSON output.
    pub fn key(self) -> &'static str {
        self.manager().key
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.manager().display_name)
    }
}

impl FromStr for PackageManagerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| format!("unknown package manager '{s}'"))
    }
}

/// Command templates and elevation policy for one package manager.
#[derive(Debug, PartialEq, Eq)]
pub struct PackageManager {
    pub kind: PackageManagerKind,
    pub key: &'static str,
    pub display_name: &'static str,
    pub install: CommandSpec,
    pub uninstall: CommandSpec,
    pub update: CommandSpec,
    pub upgrade: CommandSpec,
    pub search: CommandSpec,
    pub info: CommandSpec,
    /// Run in order, stopping at the first failure. May be empty.
    pub clean: &'static [CommandSpec],
    pub needs_sudo: bool,
    pub capabilities: Capabilities,
}

impl PackageManager {
    pub fn for_kind(kind: PackageManagerKind) -> &'static Self {
        use PackageManagerKind as K;
        match kind {
            K::TermuxPkg => &TERMUX_PKG,
            K::Apk => &APK,
            K::Apt => &APT,
            K::Pacman => &PACMAN,
            K::Dnf => &DNF,
            K::Yum => &YUM,
            K::Zypper => &ZYPPER,
            K::Nix => &NIX,
            K::Guix => &GUIX,
            K::Portage => &PORTAGE,
            K::Slackpkg => &SLACKPKG,
            K::Xbps => &XBPS,
            K::Swupd => &SWUPD,
            K::Eopkg => &EOPKG,
            K::Opkg => &OPKG,
            K::BsdPkg => &BSD_PKG,
            K::PkgAdd => &PKG_ADD,
            K::Pkgin => &PKGIN,
            K::Brew => &BREW,
            K::Winget => &WINGET,
        }
    }

    /// Command sequence for an operation.
    pub fn commands(&self, op: Operation) -> &[CommandSpec] {
        match op {
            Operation::Install => std::slice::from_ref(&self.install),
            Operation::Uninstall => std::slice::from_ref(&self.uninstall),
            Operation::Update => std::slice::from_ref(&self.update),
            Operation::Upgrade => std::slice::from_ref(&self.upgrade),
            Operation::Search => std::slice::from_ref(&self.search),
            Operation::Info => std::slice::from_ref(&self.info),
            Operation::Clean => self.clean,
        }
    }

    /// Executable whose presence on PATH indicates the manager is usable.
    pub fn binary(&self) -> &'static str {
        self.install.program
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name)
    }
}

const fn c(program: &'static str, args: &'static [&'static str]) -> CommandSpec {
    CommandSpec::new(program, args)
}

static TERMUX_PKG: PackageManager = PackageManager {
    kind: PackageManagerKind::TermuxPkg,
    key: "pkg",
    display_name: "pkg (Termux)",
    install: c("pkg", &["install", "-y"]),
    uninstall: c("pkg", &["uninstall", "-y"]),
    update: c("pkg", &["update"]),
    upgrade: c("pkg", &["upgrade", "-y"]),
    search: c("pkg", &["search"]),
    info: c("pkg", &["show"]),
    clean: &[c("pkg", &["autoclean"])],
    needs_sudo: false,
    capabilities: Capabilities::NONE,
};

static APK: PackageManager = PackageManager {
    kind: PackageManagerKind::Apk,
    key: "apk",
    display_name: "APK",
    install: c("apk", &["add"]),
    uninstall: c("apk", &["del"]),
    update: c("apk", &["update"]),
    upgrade: c("apk", &["upgrade"]),
    search: c("apk", &["search"]),
    info: c("apk", &["info"]),
    clean: &[c("apk", &["cache", "clean"])],
    needs_sudo: true,
    capabilities: Capabilities::NONE,
};

static APT: PackageManager = PackageManager {
    kind: PackageManagerKind::Apt,
    key: "apt",
    display_name: "APT",
    install: c("apt", &["install", "-y"]),
    uninstall: c("apt", &["remove", "-y"]),
    update: c("apt", &["update"]),
    upgrade: c("apt", &["upgrade", "-y"]),
    search: c("apt", &["search"]),
    info: c("apt", &["show"]),
    clean: &[c("apt", &["autoremove", "-y"]), c("apt", &["clean"])],
    needs_sudo: true,
    capabilities: Capabilities {
        snap: true,
        flatpak: true,
        ..Capabilities::NONE
    },
};

static PACMAN: PackageManager = PackageManager {
    kind: PackageManagerKind::Pacman,
    key: "pacman",
    display_name: "Pacman",
    install: c("pacman", &["-S", "--noconfirm"]),
    uninstall: c("pacman", &["-R", "--noconfirm"]),
    update: c("pacman", &["-Sy"]),
    upgrade: c("pacman", &["-Syu", "--noconfirm"]),
    search: c("pacman", &["-Ss"]),
    info: c("pacman", &["-Si"]),
    clean: &[c("pacman", &["-Sc", "--noconfirm"])],
    needs_sudo: true,
    capabilities: Capabilities {
        aur: true,
        flatpak: true,
        ..Capabilities::NONE
    },
};

static DNF: PackageManager = PackageManager {
    kind: PackageManagerKind::Dnf,
    key: "dnf",
    display_name: "DNF",
    install: c("dnf", &["install", "-y"]),
    uninstall: c("dnf", &["remove", "-y"]),
    // Exit 100 means updates are available
    update: c("dnf", &["check-update"]).accepting(&[100]),
    upgrade: c("dnf", &["upgrade", "-y"]),
    search: c("dnf", &["search"]),
    info: c("dnf", &["info"]),
    clean: &[c("dnf", &["clean", "all"])],
    needs_sudo: true,
    capabilities: Capabilities {
        flatpak: true,
        ..Capabilities::NONE
    },
};

static YUM: PackageManager = PackageManager {
    kind: PackageManagerKind::Yum,
    key: "yum",
    display_name: "YUM",
    install: c("yum", &["install", "-y"]),
    uninstall: c("yum", &["remove", "-y"]),
    update: c("yum", &["check-update"]).accepting(&[100]),
    upgrade: c("yum", &["update", "-y"]),
    search: c("yum", &["search"]),
    info: c("yum", &["info"]),
    clean: &[c("yum", &["clean", "all"])],
    needs_sudo: true,
    capabilities: Capabilities::NONE,
};

static ZYPPER: PackageManager = PackageManager {
    kind: PackageManagerKind::Zypper,
    key: "zypper",
    display_name: "Zypper",
    install: c("zypper", &["install", "-y"]),
    uninstall: c("zypper", &["remove", "-y"]),
    update: c("zypper", &["refresh"]),
    upgrade: c("zypper", &["update", "-y"]),
    search: c("zypper", &["search"]),
    info: c("zypper", &["info"]),
    clean: &[c("zypper", &["clean"])],
    needs_sudo: true,
    capabilities: Capabilities {
        flatpak: true,
        ..Capabilities::NONE
    },
};

static NIX: PackageManager = PackageManager {
    kind: PackageManagerKind::Nix,
    key: "nix",
    display_name: "Nix",
    install: c("nix-env", &["-iA"]),
    uninstall: c("nix-env", &["-e"]),
    update: c("nix-channel", &["--update"]),
    upgrade: c("nix-env", &["-u"]),
    search: c("nix", &["search"]),
    info: c("nix", &["eval"]),
    clean: &[c("nix-collect-garbage", &["-d"])],
    needs_sudo: false,
    capabilities: Capabilities {
        nix: true,
        ..Capabilities::NONE
    },
};

static GUIX: PackageManager = PackageManager {
    kind: PackageManagerKind::Guix,
    key: "guix",
    display_name: "GNU Guix",
    install: c("guix", &["install"]),
    uninstall: c("guix", &["remove"]),
    update: c("guix", &["pull"]),
    upgrade: c("guix", &["upgrade"]),
    search: c("guix", &["search"]),
    info: c("guix", &["show"]),
    clean: &[c("guix", &["gc"])],
    needs_sudo: false,
    capabilities: Capabilities {
        guix: true,
        ..Capabilities::NONE
    },
};

static PORTAGE: PackageManager = PackageManager {
    kind: PackageManagerKind::Portage,
    key: "portage",
    display_name: "Portage",
    install: c("emerge", &[]),
    uninstall: c("emerge", &["--unmerge"]),
    update: c("emerge", &["--sync"]),
    upgrade: c("emerge", &["-uDU", "@world"]),
    search: c("emerge", &["-s"]),
    info: c("emerge", &["-pv"]),
    clean: &[c("emerge", &["--depclean"])],
    needs_sudo: true,
    capabilities: Capabilities::NONE,
};

static SLACKPKG: PackageManager = PackageManager {
    kind: PackageManagerKind::Slackpkg,
    key: "slackpkg",
    display_name: "slackpkg",
    install: c("slackpkg", &["install"]),
    uninstall: c("slackpkg", &["remove"]),
    update: c("slackpkg", &["update"]),
    upgrade: c("slackpkg", &["upgrade-all"]),
    search: c("slackpkg", &["search"]),
    info: c("slackpkg", &["info"]),
    clean: &[c("slackpkg", &["clean-system"])],
    needs_sudo: true,
    capabilities: Capabilities::NONE,
};

static XBPS: PackageManager = PackageManager {
    kind: PackageManagerKind::Xbps,
    key: "xbps",
    display_name: "XBPS",
    install: c("xbps-install", &["-y"]),
    uninstall: c("xbps-remove", &["-y"]),
    update: c("xbps-install", &["-Su"]),
    upgrade: c("xbps-install", &["-u"]),
    search: c("xbps-query", &["-Rs"]),
    info: c("xbps-query", &["-R"]),
    clean: &[c("xbps-remove", &["-o"])],
    needs_sudo: true,
    capabilities: Capabilities {
        flatpak: true,
        ..Capabilities::NONE
    },
};

static SWUPD: PackageManager = PackageManager {
    kind: PackageManagerKind::Swupd,
    key: "swupd",
    display_name: "swupd",
    install: c("swupd", &["bundle-add"]),
    uninstall: c("swupd", &["bundle-remove"]),
    update: c("swupd", &["update"]),
    upgrade: c("swupd", &["update"]),
    search: c("swupd", &["search"]),
    info: c("swupd", &["bundle-info"]),
    clean: &[c("swupd", &["clean"])],
    needs_sudo: true,
    capabilities: Capabilities {
        flatpak: true,
        ..Capabilities::NONE
    },
};

static EOPKG: PackageManager = PackageManager {
    kind: PackageManagerKind::Eopkg,
    key: "eopkg",
    display_name: "eopkg",
    install: c("eopkg", &["install", "-y"]),
    uninstall: c("eopkg", &["remove", "-y"]),
    update: c("eopkg", &["update-repo"]),
    upgrade: c("eopkg", &["upgrade", "-y"]),
    search: c("eopkg", &["search"]),
    info: c("eopkg", &["info"]),
    clean: &[c("eopkg", &["delete-cache"])],
    needs_sudo: true,
    capabilities: Capabilities {
        flatpak: true,
        ..Capabilities::NONE
    },
};

static OPKG: PackageManager = PackageManager {
    kind: PackageManagerKind::Opkg,
    key: "opkg",
    display_name: "opkg",
    install: c("opkg", &["install"]),
    uninstall: c("opkg", &["remove"]),
    update: c("opkg", &["update"]),
    upgrade: c("opkg", &["upgrade"]),
    search: c("opkg", &["find"]),
    info: c("opkg", &["info"]),
    clean: &[c("opkg", &["clean"])],
    needs_sudo: false,
    capabilities: Capabilities::NONE,
};

static BSD_PKG: PackageManager = PackageManager {
    kind: PackageManagerKind::BsdPkg,
    key: "pkg-bsd",
    display_name: "pkg (FreeBSD)",
    install: c("pkg", &["install", "-y"]),
    uninstall: c("pkg", &["delete", "-y"]),
    update: c("pkg", &["update"]),
    upgrade: c("pkg", &["upgrade", "-y"]),
    search: c("pkg", &["search"]),
    info: c("pkg", &["info"]),
    clean: &[c("pkg", &["clean", "-y"])],
    needs_sudo: true,
    capabilities: Capabilities::NONE,
};

static PKG_ADD: PackageManager = PackageManager {
    kind: PackageManagerKind::PkgAdd,
    key: "pkg_add",
    display_name: "pkg_add",
    install: c("pkg_add", &[]),
    uninstall: c("pkg_delete", &[]),
    update: c("pkg_add", &["-u"]),
    upgrade: c("pkg_add", &["-u"]),
    search: c("pkg_info", &["-Q"]),
    info: c("pkg_info", &[]),
    clean: &[c("pkg_delete", &["-a"])],
    needs_sudo: true,
    capabilities: Capabilities::NONE,
};

static PKGIN: PackageManager = PackageManager {
    kind: PackageManagerKind::Pkgin,
    key: "pkgin",
    display_name: "pkgin",
    install: c("pkgin", &["-y", "install"]),
    uninstall: c("pkgin", &["-y", "remove"]),
    update: c("pkgin", &["update"]),
    upgrade: c("pkgin", &["-y", "upgrade"]),
    search: c("pkgin", &["search"]),
    info: c("pkgin", &["show"]),
    clean: &[c("pkgin", &["clean"])],
    needs_sudo: true,
    capabilities: Capabilities::NONE,
};

static BREW: PackageManager = PackageManager {
    kind: PackageManagerKind::Brew,
    key: "brew",
    display_name: "Homebrew",
    install: c("brew", &["install"]),
    uninstall: c("brew", &["uninstall"]),
    update: c("brew", &["update"]),
    upgrade: c("brew", &["upgrade"]),
    search: c("brew", &["search"]),
    info: c("brew", &["info"]),
    clean: &[c("brew", &["cleanup"])],
    needs_sudo: false,
    capabilities: Capabilities::NONE,
};

static WINGET: PackageManager = PackageManager {
    kind: PackageManagerKind::Winget,
    key: "winget",
    display_name: "winget",
    install: c("winget", &["install", "-e", "--id"]),
    uninstall: c("winget", &["uninstall", "-e", "--id"]),
    update: c("winget", &["source", "update"]),
    upgrade: c("winget", &["upgrade", "--all"]),
    search: c("winget", &["search"]),
    info: c("winget", &["show"]),
    clean: &[],
    needs_sudo: false,
    capabilities: Capabilities::NONE,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Distribution;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_maps_to_its_record() {
        for kind in PackageManagerKind::ALL {
            assert_eq!(kind.manager().kind, *kind);
        }
    }

    #[test]
    fn test_keys_are_unique_and_parse_back() {
        let mut seen = HashSet::new();
        for kind in PackageManagerKind::ALL {
            assert!(seen.insert(kind.key()), "duplicate key {}", kind.key());
            assert_eq!(kind.key().parse::<PackageManagerKind>(), Ok(*kind));
        }
        assert!("portage-ng".parse::<PackageManagerKind>().is_err());
    }

    #[test]
    fn test_every_distribution_resolves_a_manager() {
        for dist in Distribution::ALL {
            let manager = dist.config().package_manager.manager();
            assert!(!manager.install.program.is_empty(), "{dist}");
        }
    }

    #[test]
    fn test_pacman_install_argv() {
        let argv = PackageManagerKind::Pacman.manager().install.argv(&["git"]);
        assert_eq!(argv, vec!["pacman", "-S", "--noconfirm", "git"]);
    }

    #[test]
    fn test_apt_clean_is_two_steps() {
        let clean = PackageManagerKind::Apt.manager().commands(Operation::Clean);
        assert_eq!(clean.len(), 2);
        assert_eq!(clean[0].argv(&[]), vec!["apt", "autoremove", "-y"]);
        assert_eq!(clean[1].argv(&[]), vec!["apt", "clean"]);
    }

    #[test]
    fn test_argv_keeps_odd_names_intact() {
        let argv = PackageManagerKind::Apt
            .manager()
            .install
            .argv(&["foo; rm -rf /", "two words"]);
        assert_eq!(argv.len(), 5);
        assert_eq!(argv[3], "foo; rm -rf /");
        assert_eq!(argv[4], "two words");
    }

    #[test]
    fn test_termux_and_bsd_pkg_differ_in_elevation() {
        let termux = PackageManagerKind::TermuxPkg.manager();
        let bsd = PackageManagerKind::BsdPkg.manager();
        assert_eq!(termux.binary(), bsd.binary());
        assert!(!termux.needs_sudo);
        assert!(bsd.needs_sudo);
        assert_ne!(termux.uninstall, bsd.uninstall);
    }

    #[test]
    fn test_user_level_managers_skip_sudo() {
        for kind in [
            PackageManagerKind::Nix,
            PackageManagerKind::Guix,
            PackageManagerKind::Brew,
            PackageManagerKind::Winget,
            PackageManagerKind::Opkg,
        ] {
            assert!(!kind.manager().needs_sudo, "{kind}");
        }
    }

    #[test]
    fn test_capability_sources() {
        assert_eq!(
            PackageManagerKind::Pacman.manager().capabilities.sources(),
            vec!["aur", "flatpak"]
        );
        assert_eq!(
            PackageManagerKind::Apt.manager().capabilities.sources(),
            vec!["snap", "flatpak"]
        );
        assert!(PackageManagerKind::Winget.manager().capabilities.sources().is_empty());
    }

    #[test]
    fn test_check_update_accepts_exit_100() {
        for kind in [PackageManagerKind::Dnf, PackageManagerKind::Yum] {
            let update = kind.manager().update;
            assert!(update.succeeded(false, Some(100)), "{kind}");
            assert!(!update.succeeded(false, Some(1)), "{kind}");
            assert!(!update.succeeded(false, None), "{kind}");
        }
        // Nothing else treats 100 as success
        let apt = PackageManagerKind::Apt.manager();
        assert!(!apt.update.succeeded(false, Some(100)));
        assert!(!apt.install.succeeded(false, Some(100)));
        assert!(apt.install.succeeded(true, Some(0)));
    }

    #[test]
    fn test_winget_has_no_clean_step() {
        assert!(
            PackageManagerKind::Winget
                .manager()
                .commands(Operation::Clean)
                .is_empty()
        );
    }
}
