//! Health checks for the host and the installer's own setup.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

use super::{CheckStatus, DoctorCheck, DoctorContext};
use crate::components::CATALOG;
use crate::config::ConfigStore;

const NOT_DETECTED: &str = "Platform not detected";

#[derive(Default)]
pub struct PlatformCheck;

#[async_trait]
impl DoctorCheck for PlatformCheck {
    fn id(&self) -> &'static str {
        "platform"
    }

    fn name(&self) -> &'static str {
        "Platform Detection"
    }

    async fn execute(&self, ctx: &DoctorContext) -> CheckStatus {
        match &ctx.platform {
            Ok(platform) => CheckStatus::Pass(platform.summary()),
            Err(reason) => CheckStatus::Fail(reason.clone()),
        }
    }
}

#[derive(Default)]
pub struct PackageManagerCheck;

#[async_trait]
impl DoctorCheck for PackageManagerCheck {
    fn id(&self) -> &'static str {
        "package-manager"
    }

    fn name(&self) -> &'static str {
        "Package Manager"
    }

    async fn execute(&self, ctx: &DoctorContext) -> CheckStatus {
        let Some(platform) = ctx.platform() else {
            return CheckStatus::Skipped(NOT_DETECTED.to_string());
        };
        let manager = platform.package_manager;
        match which::which(manager.binary()) {
            Ok(path) => CheckStatus::Pass(format!(
                "{} found at {}",
                manager.display_name,
                path.display()
            )),
            Err(_) => CheckStatus::Fail(format!(
                "{} expected but `{}` is not on PATH",
                manager.display_name,
                manager.binary()
            )),
        }
    }

    fn hint(&self) -> Option<String> {
        Some("Make sure the distribution's package manager is installed and on PATH.".to_string())
    }
}

#[derive(Default)]
pub struct ElevationCheck;

#[async_trait]
impl DoctorCheck for ElevationCheck {
    fn id(&self) -> &'static str {
        "elevation"
    }

    fn name(&self) -> &'static str {
        "Privilege Elevation"
    }

    async fn execute(&self, ctx: &DoctorContext) -> CheckStatus {
        let Some(platform) = ctx.platform() else {
            return CheckStatus::Skipped(NOT_DETECTED.to_string());
        };
        if !platform.package_manager.needs_sudo || platform.is_mobile {
            return CheckStatus::Pass(format!(
                "{} runs without elevation",
                platform.package_manager.display_name
            ));
        }
        if ctx.is_root {
            return CheckStatus::Pass("Running as root".to_string());
        }
        let wrapper = &ctx.settings.elevation_command;
        match which::which(wrapper) {
            Ok(_) => CheckStatus::Pass(format!("Using {wrapper}")),
            Err(_) => CheckStatus::Fail(format!("`{wrapper}` is not installed")),
        }
    }

    fn hint(&self) -> Option<String> {
        Some("Install sudo or set elevationCommand, e.g. `config set elevationCommand doas`.".to_string())
    }
}

/// Endpoints tried in order for outbound connectivity.
const CONNECT_ADDRS: &[&str] = &["1.1.1.1:443", "8.8.8.8:53"];
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Default)]
pub struct InternetCheck;

#[async_trait]
impl DoctorCheck for InternetCheck {
    fn id(&self) -> &'static str {
        "internet"
    }

    fn name(&self) -> &'static str {
        "Internet Connectivity"
    }

    async fn execute(&self, _ctx: &DoctorContext) -> CheckStatus {
        for addr in CONNECT_ADDRS {
            if let Ok(Ok(_)) = timeout(CONNECT_TIMEOUT, TcpStream::connect(*addr)).await {
                return CheckStatus::Pass("Internet connection is available".to_string());
            }
        }
        CheckStatus::Fail("No internet connection detected".to_string())
    }

    fn hint(&self) -> Option<String> {
        Some("Package downloads need network access. Check your connection or proxy.".to_string())
    }
}

#[derive(Default)]
pub struct ConfigCheck;

#[async_trait]
impl DoctorCheck for ConfigCheck {
    fn id(&self) -> &'static str {
        "config"
    }

    fn name(&self) -> &'static str {
        "Configuration File"
    }

    async fn execute(&self, ctx: &DoctorContext) -> CheckStatus {
        let (store, load_error) = ConfigStore::load(ctx.config_path.clone());
        if let Some(err) = load_error {
            return CheckStatus::Fail(err.to_string());
        }
        if !store.exists() {
            return CheckStatus::Warning(format!(
                "{} does not exist, using defaults",
                ctx.config_path.display()
            ));
        }
        let problems = store.settings.validate();
        if problems.is_empty() {
            CheckStatus::Pass(format!("{} is valid", ctx.config_path.display()))
        } else {
            CheckStatus::Warning(problems.join("; "))
        }
    }

    fn hint(&self) -> Option<String> {
        Some("Run `ultimate-installer config init` or `config reset` to write defaults.".to_string())
    }
}

#[derive(Default)]
pub struct EnvironmentCheck;

#[async_trait]
impl DoctorCheck for EnvironmentCheck {
    fn id(&self) -> &'static str {
        "environment"
    }

    fn name(&self) -> &'static str {
        "Runtime Environment"
    }

    async fn execute(&self, ctx: &DoctorContext) -> CheckStatus {
        let Some(platform) = ctx.platform() else {
            return CheckStatus::Skipped(NOT_DETECTED.to_string());
        };
        if platform.is_live_cd {
            CheckStatus::Warning("Live system detected, installs will not persist".to_string())
        } else if platform.is_container {
            CheckStatus::Warning(
                "Running inside a container, services and kernel modules may not work".to_string(),
            )
        } else if platform.is_wsl {
            CheckStatus::Pass("Windows Subsystem for Linux".to_string())
        } else if platform.is_mobile {
            CheckStatus::Pass("Mobile sandbox".to_string())
        } else {
            CheckStatus::Pass("Native host".to_string())
        }
    }
}

#[derive(Default)]
pub struct CatalogCheck;

#[async_trait]
impl DoctorCheck for CatalogCheck {
    fn id(&self) -> &'static str {
        "catalog"
    }

    fn name(&self) -> &'static str {
        "Component Coverage"
    }

    async fn execute(&self, ctx: &DoctorContext) -> CheckStatus {
        let Some(platform) = ctx.platform() else {
            return CheckStatus::Skipped(NOT_DETECTED.to_string());
        };
        let supported: Vec<&str> = CATALOG
            .iter()
            .filter(|c| c.is_supported_on(platform))
            .map(|c| c.id)
            .collect();
        let message = format!(
            "{} of {} components available: {}",
            supported.len(),
            CATALOG.len(),
            supported.join(", ")
        );
        if supported.len() > 1 {
            CheckStatus::Pass(message)
        } else {
            CheckStatus::Warning(message)
        }
    }
}
