//! Installable component bundles.
//!
//! A [`Component`] is static data: an id, an allow-list of platforms and a
//! resolver that picks package names for the detected host.

mod catalog;

pub use catalog::CATALOG;

use crate::error::InstallerError;
use crate::platform::{OsFamily, PlatformInfo};

/// Where a component may run relative to mobile sandboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileSupport {
    DesktopOnly,
    Any,
    MobileOnly,
}

/// Binaries whose presence on PATH means a component is already installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Markers {
    All(&'static [&'static str]),
    Any(&'static [&'static str]),
}

pub struct Component {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    /// Pre-selected in the interactive picker.
    pub default: bool,
    pub platforms: &'static [OsFamily],
    pub mobile: MobileSupport,
    /// Refresh package lists before installing.
    pub update_first: bool,
    /// Uninstall is refused for components the system depends on.
    pub removable: bool,
    pub installed: Markers,
    resolve: fn(&PlatformInfo) -> Vec<&'static str>,
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Component {
    /// Looks the marker binaries up on PATH.
    pub fn is_installed(&self) -> bool {
        self.installed_with(|bin| which::which(bin).is_ok())
    }

    pub(crate) fn installed_with(&self, on_path: impl Fn(&str) -> bool) -> bool {
        match self.installed {
            Markers::All(bins) => bins.iter().all(|bin| on_path(bin)),
            Markers::Any(bins) => bins.iter().any(|bin| on_path(bin)),
        }
    }

    pub fn mobile_compatible(&self) -> bool {
        self.mobile != MobileSupport::DesktopOnly
    }

    /// Package names for this host, deduplicated in first-seen order.
    pub fn packages_for(&self, platform: &PlatformInfo) -> Vec<&'static str> {
        let mut packages = (self.resolve)(platform);
        let mut seen = std::collections::HashSet::new();
        packages.retain(|pkg| seen.insert(*pkg));
        packages
    }

    pub fn is_supported_on(&self, platform: &PlatformInfo) -> bool {
        self.check_platform(platform).is_ok()
    }

    /// Explain why this component cannot run on `platform`.
    pub fn check_platform(&self, platform: &PlatformInfo) -> Result<(), InstallerError> {
        let mobile_ok = match self.mobile {
            MobileSupport::Any => true,
            MobileSupport::DesktopOnly => !platform.is_mobile,
            MobileSupport::MobileOnly => platform.is_mobile,
        };
        if mobile_ok && self.platforms.contains(&platform.os) {
            Ok(())
        } else {
            Err(InstallerError::UnsupportedPlatformForComponent {
                component: self.id.to_string(),
                platform: platform.distribution.name.to_string(),
            })
        }
    }
}

/// Look up a component by id.
pub fn find(id: &str) -> Result<&'static Component, InstallerError> {
    CATALOG
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| InstallerError::UnknownComponent(id.to_string()))
}

pub fn ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|c| c.id)
}
