//! Native package manager support.
//!
//! - [`manager`]: static registry of package managers and their command templates
//! - [`runner`]: subprocess execution seam
//! - [`handler`]: turns logical operations into elevated argv and runs them

mod handler;
mod manager;
mod runner;

pub use handler::{BatchResult, Elevation, HandlerOptions, PackageManagerHandler};
pub use manager::{CommandSpec, PackageManager, PackageManagerKind};
pub use runner::{CommandRunner, DuctRunner, Invocation};

#[cfg(test)]
pub(crate) use runner::tests::RecordingRunner;

use std::fmt;

/// Logical package-manager operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Install,
    Uninstall,
    Update,
    Upgrade,
    Search,
    Info,
    Clean,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Update => "update",
            Self::Upgrade => "upgrade",
            Self::Search => "search",
            Self::Info => "info",
            Self::Clean => "clean",
        }
    }

    /// Whether the operation changes system state and therefore needs elevation.
    pub fn mutates(self) -> bool {
        !matches!(self, Self::Search | Self::Info)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
