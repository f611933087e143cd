//! Component installation orchestration.
//!
//! Resolves component ids against the catalog, filters packages for the host
//! and drives the package manager handler one component at a time.

use serde::Serialize;

use crate::components::{self, Component};
use crate::config::Settings;
use crate::error::InstallerError;
use crate::package::{BatchResult, PackageManagerHandler};
use crate::platform::PlatformInfo;
use crate::ui::Renderer;

/// Why a requested component was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    Unknown,
    UnsupportedPlatform,
    NotMobileCompatible,
    Required,
    NothingToDo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ComponentOutcome {
    pub id: String,
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

/// Aggregate result of an install or uninstall run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallReport {
    /// Nothing ran; `succeeded` lists what would have been processed.
    pub dry_run: bool,
    pub components: Vec<ComponentOutcome>,
    pub skipped: Vec<Skipped>,
    /// Failed system-level steps such as the package list refresh.
    pub system_failures: Vec<String>,
}

impl InstallReport {
    pub fn failed_packages(&self) -> usize {
        self.components.iter().map(|c| c.failed.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_packages() > 0
            || !self.system_failures.is_empty()
            || self.skipped.iter().any(|s| s.reason == SkipReason::Unknown)
    }

    /// `0` when everything requested went through, `2` on partial failure.
    pub fn exit_code(&self) -> u8 {
        if self.has_failures() { 2 } else { 0 }
    }

    fn record(&mut self, id: &str, result: BatchResult) {
        self.components.push(ComponentOutcome {
            id: id.to_string(),
            succeeded: result.succeeded,
            failed: result.failed.into_iter().map(|f| f.package).collect(),
        });
    }

    fn skip(&mut self, id: &str, reason: SkipReason) {
        self.skipped.push(Skipped {
            id: id.to_string(),
            reason,
        });
    }
}

pub struct Installer<'a> {
    platform: &'a PlatformInfo,
    handler: &'a PackageManagerHandler<'a>,
    settings: &'a Settings,
    renderer: &'a Renderer,
    mobile_only: bool,
}

impl<'a> Installer<'a> {
    /// Fails when `mobile_only` is requested on a non-mobile host.
    pub fn new(
        platform: &'a PlatformInfo,
        handler: &'a PackageManagerHandler<'a>,
        settings: &'a Settings,
        renderer: &'a Renderer,
        mobile_only: bool,
    ) -> Result<Self, InstallerError> {
        if mobile_only && !platform.is_mobile {
            return Err(InstallerError::MobileOnlyRequiresMobile(
                platform.distribution.name.to_string(),
            ));
        }
        Ok(Self {
            platform,
            handler,
            settings,
            renderer,
            mobile_only,
        })
    }

    /// Packages a component would install here, minus excluded apps.
    pub fn packages_for(&self, component: &Component) -> Vec<String> {
        component
            .packages_for(self.platform)
            .into_iter()
            .filter(|pkg| {
                let excluded = self.settings.is_excluded(pkg);
                if excluded {
                    self.renderer
                        .debug("install.excluded", &format!("{pkg} is in excludedApps"));
                }
                !excluded
            })
            .map(str::to_string)
            .collect()
    }

    /// Resolve ids to catalog entries usable on this host, recording skips.
    fn resolve(&self, ids: &[String], report: &mut InstallReport) -> Vec<&'static Component> {
        let mut resolved: Vec<&'static Component> = Vec::new();
        for id in ids {
            let component = match components::find(id) {
                Ok(component) => component,
                Err(err) => {
                    self.renderer.warn("component.unknown", &err.to_string());
                    report.skip(id, SkipReason::Unknown);
                    continue;
                }
            };
            if resolved.iter().any(|c| c.id == component.id) {
                continue;
            }
            if self.mobile_only && !component.mobile_compatible() {
                self.renderer.warn(
                    "component.not_mobile",
                    &format!("Skipping {id}: not available in mobile-only mode"),
                );
                report.skip(id, SkipReason::NotMobileCompatible);
                continue;
            }
            if let Err(err) = component.check_platform(self.platform) {
                self.renderer.warn("component.unsupported", &err.to_string());
                report.skip(id, SkipReason::UnsupportedPlatform);
                continue;
            }
            resolved.push(component);
        }
        resolved
    }

    fn report(&self) -> InstallReport {
        InstallReport {
            dry_run: self.handler.is_dry_run(),
            ..Default::default()
        }
    }

    pub fn install(&self, ids: &[String]) -> InstallReport {
        let mut report = self.report();
        let mut refreshed = false;

        for component in self.resolve(ids, &mut report) {
            let packages = self.packages_for(component);
            if packages.is_empty() {
                self.renderer.warn(
                    "component.empty",
                    &format!("No packages for {} on {}", component.id, self.platform.summary()),
                );
                report.skip(component.id, SkipReason::NothingToDo);
                continue;
            }

            if component.update_first && !refreshed {
                refreshed = true;
                self.renderer.step("package.update", "Refreshing package lists");
                if let Err(err) = self.handler.update() {
                    self.renderer.warn("package.update.failed", &err.to_string());
                    report.system_failures.push(err.to_string());
                }
            }

            self.renderer.step(
                "component.install",
                &format!("Installing {} ({} packages)", component.name, packages.len()),
            );
            let result = self.handler.install(&packages);
            self.summarize(component, &result);
            report.record(component.id, result);
        }

        report
    }

    pub fn uninstall(&self, ids: &[String]) -> InstallReport {
        let mut report = self.report();

        for component in self.resolve(ids, &mut report) {
            if !component.removable {
                self.renderer.warn(
                    "component.required",
                    &format!(
                        "{} are required for system operation. Skipping uninstall.",
                        component.name
                    ),
                );
                report.skip(component.id, SkipReason::Required);
                continue;
            }

            let packages = self.packages_for(component);
            self.renderer.step(
                "component.uninstall",
                &format!("Removing {} ({} packages)", component.name, packages.len()),
            );
            let result = self.handler.uninstall(&packages);
            self.summarize(component, &result);
            report.record(component.id, result);
        }

        report
    }

    /// Install loose packages, e.g. a profile's `apps`, as a pseudo-component.
    pub fn install_packages(&self, label: &str, packages: &[String], report: &mut InstallReport) {
        let packages: Vec<String> = packages
            .iter()
            .filter(|pkg| !self.settings.is_excluded(pkg))
            .cloned()
            .collect();
        if packages.is_empty() {
            return;
        }
        self.renderer
            .step("profile.apps", &format!("Installing {label} apps"));
        let result = self.handler.install(&packages);
        report.record(label, result);
    }

    fn summarize(&self, component: &Component, result: &BatchResult) {
        if result.is_success() {
            self.renderer
                .success("component.done", &format!("{} complete", component.name));
        } else {
            self.renderer.warn(
                "component.partial",
                &format!(
                    "{}: {} of {} packages failed",
                    component.name,
                    result.failed.len(),
                    result.attempted()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{Elevation, HandlerOptions, RecordingRunner};
    use crate::platform::{FakeHost, detect_with};
    use crate::ui::OutputFormat;

    fn quiet() -> Renderer {
        Renderer::new(OutputFormat::Text, false, false, true)
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn ubuntu() -> PlatformInfo {
        detect_with(&FakeHost::linux().with_os_release("ID=ubuntu\nID_LIKE=debian\n")).unwrap()
    }

    #[test]
    fn test_partial_failure_reports_exit_code_two() {
        let platform = ubuntu();
        // "tor" is the second privacy package
        let runner = RecordingRunner::failing_on("tor", 100);
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, false).unwrap();

        let report = installer.install(&ids(&["privacy"]));

        let outcome = &report.components[0];
        assert_eq!(outcome.failed, vec!["tor"]);
        assert_eq!(outcome.succeeded.len(), 7);
        // Every package after the failing one was still attempted
        assert_eq!(runner.calls.borrow().len(), 8);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_unknown_and_unsupported_are_skipped() {
        let platform = ubuntu();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, false).unwrap();

        let report = installer.install(&ids(&["bogus", "mobile-dev", "forensics"]));

        assert_eq!(
            report.skipped,
            vec![
                Skipped {
                    id: "bogus".into(),
                    reason: SkipReason::Unknown
                },
                Skipped {
                    id: "mobile-dev".into(),
                    reason: SkipReason::UnsupportedPlatform
                },
            ]
        );
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn test_devtools_refreshes_once_before_installing() {
        let platform = ubuntu();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, false).unwrap();

        let report = installer.install(&ids(&["devtools", "security-research", "devtools"]));

        let argvs = runner.argvs();
        assert_eq!(argvs[0], vec!["apt", "update"]);
        let updates = argvs.iter().filter(|a| a[1] == "update").count();
        assert_eq!(updates, 1);
        assert_eq!(report.components.len(), 2);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_fedora_refresh_with_pending_updates_is_not_a_failure() {
        let platform = detect_with(&FakeHost::linux().with_os_release("ID=fedora\n")).unwrap();
        // dnf check-update exits 100 when updates are available
        let runner = RecordingRunner::failing_on("check-update", 100);
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, false).unwrap();

        let report = installer.install(&ids(&["devtools"]));

        assert_eq!(runner.argvs()[0], vec!["dnf", "check-update"]);
        assert!(report.system_failures.is_empty());
        assert_eq!(report.failed_packages(), 0);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_dry_run_report_is_marked() {
        let platform = ubuntu();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions {
                dry_run: true,
                ..Default::default()
            },
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, false).unwrap();

        let report = installer.install(&ids(&["privacy"]));
        assert!(report.dry_run);
        assert_eq!(report.components[0].succeeded.len(), 8);
        assert!(runner.calls.borrow().is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dryRun"], true);
        assert!(json["systemFailures"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_excluded_apps_are_filtered() {
        let platform = ubuntu();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let settings = Settings {
            excluded_apps: vec!["veracrypt".into(), "i2p".into()],
            ..Settings::default()
        };
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, false).unwrap();

        installer.install(&ids(&["privacy"]));
        let installed: Vec<String> = runner.argvs().into_iter().map(|a| a[3].clone()).collect();
        assert!(!installed.contains(&"veracrypt".to_string()));
        assert!(!installed.contains(&"i2p".to_string()));
        assert_eq!(installed.len(), 6);
    }

    #[test]
    fn test_mobile_only_rejected_on_desktop() {
        let platform = ubuntu();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let err = Installer::new(&platform, &handler, &settings, &renderer, true)
            .err()
            .unwrap();
        assert!(matches!(err, InstallerError::MobileOnlyRequiresMobile(_)));
    }

    #[test]
    fn test_mobile_only_skips_desktop_components() {
        let platform =
            detect_with(&FakeHost::linux().with_env("TERMUX_VERSION", "0.118")).unwrap();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, true).unwrap();

        let report = installer.install(&ids(&["embedded", "privacy"]));
        assert_eq!(report.skipped[0].reason, SkipReason::NotMobileCompatible);
        assert_eq!(report.components[0].succeeded, vec!["gnupg", "tor"]);
        assert!(runner.argvs().iter().all(|a| a[0] == "pkg"));
    }

    #[test]
    fn test_core_uninstall_is_refused() {
        let platform = ubuntu();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let settings = Settings::default();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let installer = Installer::new(&platform, &handler, &settings, &renderer, false).unwrap();

        let report = installer.uninstall(&ids(&["core", "network"]));
        assert_eq!(report.skipped[0].reason, SkipReason::Required);
        assert_eq!(report.components[0].id, "network");
        assert!(runner.argvs().iter().all(|a| a[1] == "remove"));
        assert_eq!(report.exit_code(), 0);
    }
}
