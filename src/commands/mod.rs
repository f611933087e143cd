//! Subcommand handlers. Each returns the process exit code on success.

use std::cell::OnceCell;
use std::io::IsTerminal;

use anyhow::{Result, bail};

use crate::config::ConfigStore;
use crate::package::{CommandRunner, Elevation, HandlerOptions, PackageManagerHandler};
use crate::platform::{self, PlatformInfo};
use crate::ui::Renderer;

pub mod config;
mod install;
mod query;
mod update;

pub use config::{ConfigCommands, handle_config_command};
pub use install::{install, uninstall};
pub use query::{info, list, search};
pub use update::update;

/// Flags and state shared by every subcommand.
pub struct AppContext {
    pub renderer: Renderer,
    pub store: ConfigStore,
    pub dry_run: bool,
    pub assume_yes: bool,
    pub mobile_only: bool,
    platform: OnceCell<PlatformInfo>,
}

impl AppContext {
    pub fn new(
        renderer: Renderer,
        store: ConfigStore,
        dry_run: bool,
        assume_yes: bool,
        mobile_only: bool,
    ) -> Self {
        Self {
            renderer,
            store,
            dry_run,
            assume_yes,
            mobile_only,
            platform: OnceCell::new(),
        }
    }

    /// Detect the host once per process.
    pub fn platform(&self) -> Result<&PlatformInfo> {
        if let Some(platform) = self.platform.get() {
            return Ok(platform);
        }
        let detected = platform::detect()?;
        self.renderer.debug(
            "platform.detected",
            &format!(
                "{} via {}",
                detected.summary(),
                detected.package_manager.display_name
            ),
        );
        Ok(self.platform.get_or_init(|| detected))
    }

    pub fn handler<'a>(&'a self, runner: &'a dyn CommandRunner) -> Result<PackageManagerHandler<'a>> {
        let platform = self.platform()?;
        let settings = &self.store.settings;
        let options = HandlerOptions {
            dry_run: self.dry_run,
            timeout: settings.timeout(),
            retry_failed: settings.retry_failed,
        };
        let elevation = Elevation::for_platform(platform, &settings.elevation_command);
        Ok(PackageManagerHandler::new(
            platform,
            runner,
            elevation,
            options,
            &self.renderer,
        ))
    }

    /// Prompts are skipped for `--yes`, dry runs and JSON output.
    pub fn interactive(&self) -> bool {
        !self.assume_yes && !self.dry_run && !self.renderer.is_json()
    }

    /// Ask for confirmation, or fail when no terminal is attached.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if !self.interactive() {
            return Ok(true);
        }
        if !std::io::stdin().is_terminal() {
            bail!("Refusing to prompt without a terminal; pass --yes to continue");
        }
        Ok(dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::SETTINGS_FILE;
    use crate::ui::OutputFormat;
    use tempfile::TempDir;

    /// Non-interactive context backed by a settings file inside `dir`.
    pub(crate) fn context(dir: &TempDir) -> AppContext {
        let (store, _) = ConfigStore::load(dir.path().join(SETTINGS_FILE));
        let renderer = Renderer::new(OutputFormat::Text, false, false, true);
        AppContext::new(renderer, store, false, true, false)
    }

    #[test]
    fn test_assume_yes_skips_prompts() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        assert!(!ctx.interactive());
        assert!(ctx.confirm("Proceed?").unwrap());
    }
}
