//! Error taxonomy shared by detection, package operations and configuration.
//!
//! Within an install or uninstall run only
//! [`InstallerError::UnsupportedOperatingSystem`] and
//! [`InstallerError::MobileOnlyRequiresMobile`] abort. Every other variant is
//! logged where it happens and the run carries on.

use std::path::PathBuf;

use thiserror::Error;

use crate::package::Operation;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Unsupported operating system: {0}")]
    UnsupportedOperatingSystem(String),

    #[error("{operation} failed for {target}: {reason}")]
    PackageOperationFailed {
        operation: Operation,
        target: String,
        reason: String,
    },

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Component '{component}' is not supported on {platform}")]
    UnsupportedPlatformForComponent { component: String, platform: String },

    #[error("Failed to load {}: {reason}", path.display())]
    ConfigLoadFailure { path: PathBuf, reason: String },

    #[error("--mobile-only requires a mobile platform, detected {0}")]
    MobileOnlyRequiresMobile(String),
}
