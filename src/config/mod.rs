//! Persisted user settings.
//!
//! Settings live in `settings.json` under the platform config directory. A
//! missing file means defaults; an unreadable or malformed one also means
//! defaults, plus a [`InstallerError::ConfigLoadFailure`] for the caller to
//! report. Such a file is never overwritten by [`ConfigStore::save`]; only
//! [`ConfigStore::reset`] replaces it, after moving it aside.

mod profile;

pub use profile::{Profile, builtin_profiles};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InstallerError;

pub const APP_DIR: &str = "ultimate-installer";
pub const SETTINGS_FILE: &str = "settings.json";
pub const SETTINGS_VERSION: &str = "5.0";
pub const BACKUP_SUFFIX: &str = "bak";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub version: String,
    pub last_updated: NaiveDate,
    pub auto_check_updates: bool,
    pub update_check_interval_hours: u32,
    pub skip_update_prompts: bool,
    pub default_profile: String,
    #[serde(alias = "confirmOSDetection")]
    pub confirm_os_detection: bool,
    pub enable_privacy_mode: bool,
    /// Per package-manager invocation. Zero disables the limit.
    pub timeout_minutes: u32,
    pub retry_failed: bool,
    /// Wrapper used when a package manager needs root, e.g. `sudo` or `doas`.
    pub elevation_command: String,
    pub custom_repos: Vec<String>,
    pub excluded_apps: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION.to_string(),
            last_updated: Local::now().date_naive(),
            auto_check_updates: true,
            update_check_interval_hours: 24,
            skip_update_prompts: false,
            default_profile: "Default".to_string(),
            confirm_os_detection: true,
            enable_privacy_mode: false,
            timeout_minutes: 30,
            retry_failed: true,
            elevation_command: "sudo".to_string(),
            custom_repos: Vec::new(),
            excluded_apps: Vec::new(),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_minutes > 0).then(|| Duration::from_secs(u64::from(self.timeout_minutes) * 60))
    }

    pub fn is_excluded(&self, package: &str) -> bool {
        self.excluded_apps.iter().any(|app| app == package)
    }

    /// Sanity problems that would make commands misbehave. Empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.version.trim().is_empty() {
            problems.push("version must not be empty".to_string());
        }
        if self.update_check_interval_hours == 0 {
            problems.push("updateCheckIntervalHours must be at least 1".to_string());
        }
        if self.elevation_command.trim().is_empty() {
            problems.push("elevationCommand must not be empty".to_string());
        } else if which::which(&self.elevation_command).is_err() {
            problems.push(format!(
                "elevationCommand '{}' was not found on PATH",
                self.elevation_command
            ));
        }
        if self.default_profile.trim().is_empty() {
            problems.push("defaultProfile must not be empty".to_string());
        }
        let mut seen = std::collections::HashSet::new();
        for app in &self.excluded_apps {
            if !seen.insert(app) {
                problems.push(format!("excludedApps lists '{app}' more than once"));
            }
        }
        problems
    }
}

/// Default location of the settings file.
pub fn default_settings_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join(APP_DIR)
        .join(SETTINGS_FILE))
}

/// Settings bound to the file they were loaded from.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    pub settings: Settings,
    /// Why the file on disk could not be loaded.
    load_error: Option<String>,
}

impl ConfigStore {
    /// Load settings, falling back to defaults.
    ///
    /// The returned error, if any, is informational: the store is always usable.
    pub fn load(path: PathBuf) -> (Self, Option<InstallerError>) {
        match Self::read(&path) {
            Ok(settings) => (
                Self {
                    path,
                    settings,
                    load_error: None,
                },
                None,
            ),
            Err(reason) => {
                let err = InstallerError::ConfigLoadFailure {
                    path: path.clone(),
                    reason: reason.clone(),
                };
                (
                    Self {
                        path,
                        settings: Settings::default(),
                        load_error: Some(reason),
                    },
                    Some(err),
                )
            }
        }
    }

    fn read(path: &Path) -> Result<Settings, String> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(|dir| dir.join("profiles"))
            .unwrap_or_else(|| PathBuf::from("profiles"))
    }

    /// Write settings back to disk, stamping `lastUpdated`.
    ///
    /// Refuses while the file on disk failed to load.
    pub fn save(&mut self) -> Result<()> {
        if let Some(reason) = &self.load_error {
            bail!(
                "Refusing to overwrite {} because it could not be loaded ({reason}). \
                 Fix it by hand or run `config reset`",
                self.path.display()
            );
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory at {}", parent.display()))?;
        }
        self.settings.last_updated = Local::now().date_naive();
        let contents =
            serde_json::to_string_pretty(&self.settings).context("serializing settings")?;
        fs::write(&self.path, contents + "\n")
            .with_context(|| format!("writing settings file to {}", self.path.display()))?;
        Ok(())
    }

    /// Restore defaults in memory. A file that failed to load is renamed to
    /// `settings.json.bak` first; its new path is returned.
    pub fn reset(&mut self) -> Result<Option<PathBuf>> {
        self.settings = Settings::default();
        if self.load_error.is_none() || !self.exists() {
            self.load_error = None;
            return Ok(None);
        }
        let backup = self.path.with_extension(format!("json.{BACKUP_SUFFIX}"));
        fs::rename(&self.path, &backup).with_context(|| {
            format!("moving {} to {}", self.path.display(), backup.display())
        })?;
        self.load_error = None;
        Ok(Some(backup))
    }

    /// Read one setting by its on-disk (camelCase) name.
    pub fn get(&self, key: &str) -> Result<serde_json::Value> {
        let value = serde_json::to_value(&self.settings).context("serializing settings")?;
        value
            .get(key)
            .cloned()
            .with_context(|| format!("Unknown setting '{key}'"))
    }

    /// Update one setting. `raw` is parsed as JSON when possible, otherwise
    /// taken as a plain string; the result must still type-check.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut value = serde_json::to_value(&self.settings).context("serializing settings")?;
        let Some(slot) = value.get_mut(key) else {
            bail!("Unknown setting '{key}'");
        };
        *slot = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        self.settings = serde_json::from_value(value)
            .with_context(|| format!("Invalid value for '{key}': {raw}"))?;
        Ok(())
    }

    /// Resolve a profile: a JSON file in the profiles directory wins over the
    /// built-in of the same name.
    pub fn profile(&self, name: &str) -> Result<Option<Profile>> {
        let path = self.profiles_dir().join(profile::file_name(name));
        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            let profile = serde_json::from_str(&contents)
                .with_context(|| format!("parsing profile {}", path.display()))?;
            return Ok(Some(profile));
        }
        Ok(builtin_profiles()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(name)))
    }

    /// Built-in profiles merged with any profile files on disk.
    pub fn profiles(&self) -> Result<Vec<Profile>> {
        let mut profiles = builtin_profiles();
        let dir = self.profiles_dir();
        if !dir.is_dir() {
            return Ok(profiles);
        }

        let mut entries: Vec<_> = fs::read_dir(&dir)
            .with_context(|| format!("reading profiles from {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        entries.sort();

        for path in entries {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            let profile: Profile = serde_json::from_str(&contents)
                .with_context(|| format!("parsing profile {}", path.display()))?;
            match profiles
                .iter_mut()
                .find(|p| p.name.eq_ignore_ascii_case(&profile.name))
            {
                Some(existing) => *existing = profile,
                None => profiles.push(profile),
            }
        }
        Ok(profiles)
    }

    /// Write default settings (if missing) and the built-in profile files.
    /// Existing files are left untouched. Returns the files created.
    pub fn init(&mut self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        if !self.exists() {
            self.save()?;
            created.push(self.path.clone());
        }

        let dir = self.profiles_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating profiles directory at {}", dir.display()))?;
        for profile in builtin_profiles() {
            let path = dir.join(profile::file_name(&profile.name));
            if path.exists() {
                continue;
            }
            let contents = serde_json::to_string_pretty(&profile).context("serializing profile")?;
            fs::write(&path, contents + "\n")
                .with_context(|| format!("writing profile {}", path.display()))?;
            created.push(path);
        }
        Ok(created)
    }
}
