use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated config location for one test.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Settings file passed to the binary via `--config`. Not created up front.
    pub fn settings_path(&self) -> PathBuf {
        self.path().join("settings.json")
    }

    pub fn write_settings(&self, contents: &str) -> Result<()> {
        std::fs::write(self.settings_path(), contents)?;
        Ok(())
    }
}
