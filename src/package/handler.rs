//! Executes package operations against the detected package manager.

use std::time::Duration;

use sudo::RunningAs;

use super::{CommandRunner, CommandSpec, Invocation, Operation, PackageManager};
use crate::error::InstallerError;
use crate::platform::PlatformInfo;
use crate::ui::Renderer;

/// How mutating commands gain root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Elevation {
    None,
    /// Prefix argv with this helper, e.g. `sudo` or `doas`.
    Wrapper(String),
}

impl Elevation {
    /// Pick the elevation policy for a platform.
    ///
    /// No wrapper when the manager runs as the user, inside a mobile sandbox,
    /// or when the process already runs as root.
    pub fn for_platform(platform: &PlatformInfo, wrapper: &str) -> Self {
        Self::decide(platform, wrapper, matches!(sudo::check(), RunningAs::Root))
    }

    pub(crate) fn decide(platform: &PlatformInfo, wrapper: &str, is_root: bool) -> Self {
        if !platform.package_manager.needs_sudo || platform.is_mobile || is_root {
            Self::None
        } else {
            Self::Wrapper(wrapper.to_string())
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    pub dry_run: bool,
    pub timeout: Option<Duration>,
    /// Retry a failed package once before recording it as failed.
    pub retry_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFailure {
    pub package: String,
    pub reason: String,
}

/// Outcome of a multi-package operation. In a dry run `succeeded` holds the
/// packages that would have been processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<PackageFailure>,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

pub struct PackageManagerHandler<'a> {
    manager: &'static PackageManager,
    runner: &'a dyn CommandRunner,
    elevation: Elevation,
    options: HandlerOptions,
    renderer: &'a Renderer,
}

impl<'a> PackageManagerHandler<'a> {
    pub fn new(
        platform: &PlatformInfo,
        runner: &'a dyn CommandRunner,
        elevation: Elevation,
        options: HandlerOptions,
        renderer: &'a Renderer,
    ) -> Self {
        Self {
            manager: platform.package_manager,
            runner,
            elevation,
            options,
            renderer,
        }
    }

    pub fn manager(&self) -> &'static PackageManager {
        self.manager
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn install(&self, packages: &[String]) -> BatchResult {
        self.batch(Operation::Install, packages)
    }

    pub fn uninstall(&self, packages: &[String]) -> BatchResult {
        self.batch(Operation::Uninstall, packages)
    }

    pub fn update(&self) -> Result<(), InstallerError> {
        self.system_op(Operation::Update)
    }

    pub fn upgrade(&self) -> Result<(), InstallerError> {
        self.system_op(Operation::Upgrade)
    }

    /// Run the clean sequence, stopping at the first failing step.
    pub fn clean(&self) -> Result<(), InstallerError> {
        self.system_op(Operation::Clean)
    }

    /// Search the native repositories. Output lines are passed through as-is.
    pub fn search(&self, query: &str) -> Result<Vec<String>, InstallerError> {
        self.query(Operation::Search, query)
    }

    pub fn info(&self, package: &str) -> Result<Vec<String>, InstallerError> {
        self.query(Operation::Info, package)
    }

    /// Build the argv for one command, applying elevation for mutating operations.
    pub fn argv(&self, op: Operation, spec: &CommandSpec, extra: &[&str]) -> Vec<String> {
        let mut argv = spec.argv(extra);
        if let Elevation::Wrapper(wrapper) = &self.elevation {
            if op.mutates() {
                argv.insert(0, wrapper.clone());
            }
        }
        argv
    }

    fn batch(&self, op: Operation, packages: &[String]) -> BatchResult {
        let mut result = BatchResult::default();
        let spec = &self.manager.commands(op)[0];

        for package in packages {
            let argv = self.argv(op, spec, &[package.as_str()]);
            match self.execute_with_retry(spec, argv) {
                Ok(()) => {
                    // The dry-run line already names the package
                    if !self.options.dry_run {
                        self.renderer.success(
                            &format!("package.{op}.ok"),
                            &format!("{op} {package}"),
                        );
                    }
                    result.succeeded.push(package.clone());
                }
                Err(reason) => {
                    let err = InstallerError::PackageOperationFailed {
                        operation: op,
                        target: package.clone(),
                        reason: reason.clone(),
                    };
                    self.renderer
                        .error(&format!("package.{op}.failed"), &err.to_string());
                    result.failed.push(PackageFailure {
                        package: package.clone(),
                        reason,
                    });
                }
            }
        }

        result
    }

    fn system_op(&self, op: Operation) -> Result<(), InstallerError> {
        for spec in self.manager.commands(op) {
            let argv = self.argv(op, spec, &[]);
            self.execute_with_retry(spec, argv)
                .map_err(|reason| InstallerError::PackageOperationFailed {
                    operation: op,
                    target: self.manager.display_name.to_string(),
                    reason,
                })?;
        }
        Ok(())
    }

    fn query(&self, op: Operation, term: &str) -> Result<Vec<String>, InstallerError> {
        let spec = &self.manager.commands(op)[0];
        let argv = self.argv(op, spec, &[term]);
        if self.options.dry_run {
            self.log_dry_run(&argv);
            return Ok(Vec::new());
        }

        let fail = |reason: String| InstallerError::PackageOperationFailed {
            operation: op,
            target: term.to_string(),
            reason,
        };
        let output = self
            .runner
            .run(&Invocation {
                argv,
                capture: true,
                timeout: self.options.timeout,
            })
            .map_err(|e| fail(format!("{e:#}")))?;
        if !spec.succeeded(output.success, output.code) {
            return Err(fail(output.failure_reason()));
        }

        Ok(output
            .stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn execute_with_retry(&self, spec: &CommandSpec, argv: Vec<String>) -> Result<(), String> {
        if self.options.dry_run {
            self.log_dry_run(&argv);
            return Ok(());
        }

        let invocation = Invocation {
            argv,
            capture: false,
            timeout: self.options.timeout,
        };
        match self.execute(spec, &invocation) {
            Err(reason) if self.options.retry_failed => {
                self.renderer.warn(
                    "package.retry",
                    &format!("{reason}, retrying: {}", shell_words::join(&invocation.argv)),
                );
                self.execute(spec, &invocation)
            }
            other => other,
        }
    }

    fn execute(&self, spec: &CommandSpec, invocation: &Invocation) -> Result<(), String> {
        self.renderer
            .debug("package.run", &shell_words::join(&invocation.argv));
        match self.runner.run(invocation) {
            Ok(output) if spec.succeeded(output.success, output.code) => Ok(()),
            Ok(output) => Err(output.failure_reason()),
            Err(e) => Err(format!("{e:#}")),
        }
    }

    fn log_dry_run(&self, argv: &[String]) {
        self.renderer.info(
            "package.dry_run",
            &format!("would run: {}", shell_words::join(argv)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::RecordingRunner;
    use crate::platform::{FakeHost, detect_with};
    use crate::ui::OutputFormat;

    fn quiet() -> Renderer {
        Renderer::new(OutputFormat::Text, false, false, true)
    }

    fn arch_host() -> PlatformInfo {
        detect_with(&FakeHost::linux().with_os_release("ID=arch\n")).unwrap()
    }

    fn pkgs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pacman_install_with_sudo() {
        let platform = arch_host();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::decide(&platform, "sudo", false),
            HandlerOptions::default(),
            &renderer,
        );

        let result = handler.install(&pkgs(&["git", "curl"]));

        assert!(result.is_success());
        assert_eq!(result.succeeded, pkgs(&["git", "curl"]));
        assert_eq!(
            runner.argvs(),
            vec![
                pkgs(&["sudo", "pacman", "-S", "--noconfirm", "git"]),
                pkgs(&["sudo", "pacman", "-S", "--noconfirm", "curl"]),
            ]
        );
    }

    #[test]
    fn test_package_names_are_never_split() {
        let platform = arch_host();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );

        handler.install(&pkgs(&["foo; rm -rf /", "$(whoami)", "a b"]));

        let argvs = runner.argvs();
        assert_eq!(argvs[0].last().unwrap(), "foo; rm -rf /");
        assert_eq!(argvs[1].last().unwrap(), "$(whoami)");
        assert_eq!(argvs[2].last().unwrap(), "a b");
        assert!(argvs.iter().all(|argv| argv.len() == 4));
    }

    #[test]
    fn test_dry_run_never_invokes_runner() {
        let platform = arch_host();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::Wrapper("sudo".into()),
            HandlerOptions {
                dry_run: true,
                ..Default::default()
            },
            &renderer,
        );

        let result = handler.install(&pkgs(&["git"]));
        handler.update().unwrap();
        handler.clean().unwrap();
        assert!(handler.search("vim").unwrap().is_empty());

        assert!(result.is_success());
        assert!(handler.is_dry_run());
        assert_eq!(result.succeeded, pkgs(&["git"]));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_batch_continues_past_failure() {
        let platform = arch_host();
        let runner = RecordingRunner::failing_on("b", 1);
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );

        let result = handler.install(&pkgs(&["a", "b", "c", "d"]));

        assert_eq!(result.attempted(), 4);
        assert_eq!(result.succeeded, pkgs(&["a", "c", "d"]));
        assert_eq!(
            result.failed,
            vec![PackageFailure {
                package: "b".into(),
                reason: "exit status 1".into(),
            }]
        );
        assert_eq!(runner.calls.borrow().len(), 4);
    }

    #[test]
    fn test_spawn_failure_counts_as_package_failure() {
        let platform = arch_host();
        let runner = RecordingRunner {
            unspawnable: vec!["pacman".into()],
            ..Default::default()
        };
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );

        let result = handler.install(&pkgs(&["git", "curl"]));
        assert_eq!(result.failed.len(), 2);
        assert!(result.failed[0].reason.contains("No such file"));
    }

    #[test]
    fn test_retry_runs_failed_package_twice() {
        let platform = arch_host();
        let runner = RecordingRunner::failing_on("broken", 1);
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions {
                retry_failed: true,
                ..Default::default()
            },
            &renderer,
        );

        let result = handler.install(&pkgs(&["ok", "broken"]));
        assert_eq!(result.failed.len(), 1);
        assert_eq!(runner.calls.borrow().len(), 3);
    }

    #[test]
    fn test_mobile_skips_elevation() {
        let platform = detect_with(&FakeHost::linux().with_env("TERMUX_VERSION", "0.118")).unwrap();
        assert_eq!(Elevation::decide(&platform, "sudo", false), Elevation::None);

        let runner = RecordingRunner::default();
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::decide(&platform, "sudo", false),
            HandlerOptions::default(),
            &renderer,
        );
        handler.install(&pkgs(&["python"]));
        assert_eq!(runner.argvs()[0][0], "pkg");
    }

    #[test]
    fn test_root_and_user_managers_skip_elevation() {
        let platform = arch_host();
        assert_eq!(Elevation::decide(&platform, "doas", true), Elevation::None);
        assert_eq!(
            Elevation::decide(&platform, "doas", false),
            Elevation::Wrapper("doas".into())
        );

        let mut host = FakeHost::linux();
        host.os = "macos";
        let mac = detect_with(&host).unwrap();
        assert_eq!(Elevation::decide(&mac, "sudo", false), Elevation::None);
    }

    #[test]
    fn test_apt_clean_runs_both_steps_elevated() {
        let platform =
            detect_with(&FakeHost::linux().with_os_release("ID=debian\n")).unwrap();
        let runner = RecordingRunner::default();
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::Wrapper("sudo".into()),
            HandlerOptions::default(),
            &renderer,
        );

        handler.clean().unwrap();
        assert_eq!(
            runner.argvs(),
            vec![
                pkgs(&["sudo", "apt", "autoremove", "-y"]),
                pkgs(&["sudo", "apt", "clean"]),
            ]
        );
    }

    #[test]
    fn test_clean_stops_at_first_failure() {
        let platform =
            detect_with(&FakeHost::linux().with_os_release("ID=debian\n")).unwrap();
        let runner = RecordingRunner::failing_on("autoremove", 100);
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );

        let err = handler.clean().unwrap_err();
        assert_eq!(err.to_string(), "clean failed for APT: exit status 100");
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_dnf_check_update_exit_100_is_a_successful_refresh() {
        let platform = detect_with(&FakeHost::linux().with_os_release("ID=fedora\n")).unwrap();
        let renderer = quiet();

        let runner = RecordingRunner::failing_on("check-update", 100);
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions {
                retry_failed: true,
                ..Default::default()
            },
            &renderer,
        );
        assert!(handler.update().is_ok());
        // Accepted on the first attempt, no retry
        assert_eq!(runner.argvs(), vec![pkgs(&["dnf", "check-update"])]);

        let runner = RecordingRunner::failing_on("check-update", 1);
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let err = handler.update().unwrap_err();
        assert_eq!(err.to_string(), "update failed for DNF: exit status 1");
    }

    #[test]
    fn test_exit_100_still_fails_a_dnf_install() {
        let platform = detect_with(&FakeHost::linux().with_os_release("ID=fedora\n")).unwrap();
        let runner = RecordingRunner::failing_on("nmap", 100);
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let result = handler.install(&pkgs(&["git", "nmap"]));
        assert_eq!(result.succeeded, pkgs(&["git"]));
        assert_eq!(result.failed[0].package, "nmap");
    }

    #[test]
    fn test_info_captures_output_without_elevation() {
        let platform =
            detect_with(&FakeHost::linux().with_os_release("ID=debian\n")).unwrap();
        let runner = RecordingRunner::with_stdout("Package: git\nVersion: 1:2.39.2-1.1\n");
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::Wrapper("sudo".into()),
            HandlerOptions::default(),
            &renderer,
        );

        let lines = handler.info("git").unwrap();
        assert_eq!(lines, vec!["Package: git", "Version: 1:2.39.2-1.1"]);
        assert_eq!(runner.argvs()[0], pkgs(&["apt", "show", "git"]));

        let runner = RecordingRunner::failing_on("ghost", 100);
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::None,
            HandlerOptions::default(),
            &renderer,
        );
        let err = handler.info("ghost").unwrap_err();
        assert_eq!(err.to_string(), "info failed for ghost: exit status 100");
    }

    #[test]
    fn test_search_splits_lines_without_elevation() {
        let platform = arch_host();
        let runner = RecordingRunner::with_stdout("extra/vim 9.1\n    Vi Improved\n\n");
        let renderer = quiet();
        let handler = PackageManagerHandler::new(
            &platform,
            &runner,
            Elevation::Wrapper("sudo".into()),
            HandlerOptions::default(),
            &renderer,
        );

        let lines = handler.search("vim").unwrap();
        assert_eq!(lines, vec!["extra/vim 9.1", "    Vi Improved"]);
        assert_eq!(runner.argvs()[0], pkgs(&["pacman", "-Ss", "vim"]));
        assert!(runner.calls.borrow()[0].capture);
    }
}
