//! Shell completion scripts generated from the clap command tree.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use clap_complete::Shell;

use crate::BIN_NAME;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SupportedShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

impl SupportedShell {
    fn as_complete_shell(self) -> Shell {
        match self {
            SupportedShell::Bash => Shell::Bash,
            SupportedShell::Zsh => Shell::Zsh,
            SupportedShell::Fish => Shell::Fish,
            SupportedShell::PowerShell => Shell::PowerShell,
        }
    }

    fn file_name(self) -> String {
        match self {
            SupportedShell::Bash => format!("{BIN_NAME}.bash"),
            SupportedShell::Zsh => format!("_{BIN_NAME}"),
            SupportedShell::Fish => format!("{BIN_NAME}.fish"),
            SupportedShell::PowerShell => format!("{BIN_NAME}.ps1"),
        }
    }

    /// Where the shell picks up completions without extra setup, if anywhere.
    fn default_dir(self) -> PathBuf {
        let data = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
            .unwrap_or_else(|| PathBuf::from("."));
        match self {
            SupportedShell::Fish => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fish")
                .join("completions"),
            _ => data.join(BIN_NAME).join("completions"),
        }
    }

    fn install_instructions(self, install_path: &Path) -> String {
        let path = install_path.display();
        match self {
            SupportedShell::Bash => format!(
                "Add this to your ~/.bashrc:\n  [ -r \"{path}\" ] && source \"{path}\""
            ),
            SupportedShell::Zsh => format!(
                "Add this directory to your ~/.zshrc:\n  fpath=(\"{}\" $fpath)\nThen run: autoload -U compinit && compinit",
                install_path
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| install_path.to_string_lossy().into())
            ),
            SupportedShell::Fish => "Fish loads it automatically in new shells.".to_string(),
            SupportedShell::PowerShell => {
                format!("Add this to your $PROFILE:\n  . \"{path}\"")
            }
        }
    }
}

impl fmt::Display for SupportedShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportedShell::Bash => write!(f, "bash"),
            SupportedShell::Zsh => write!(f, "zsh"),
            SupportedShell::Fish => write!(f, "fish"),
            SupportedShell::PowerShell => write!(f, "powershell"),
        }
    }
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum CompletionCommands {
    /// Print the completion script to stdout
    Generate {
        #[arg(value_enum)]
        shell: SupportedShell,
    },
    /// Write the completion script to the shell's completion directory
    Install {
        #[arg(value_enum)]
        shell: SupportedShell,
        /// Custom destination file
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing script
        #[arg(long)]
        force: bool,
    },
}

pub fn generate(shell: SupportedShell) -> Result<String> {
    let mut command = crate::cli_command();
    let mut buffer = Vec::new();
    clap_complete::generate(shell.as_complete_shell(), &mut command, BIN_NAME, &mut buffer);
    String::from_utf8(buffer).context("rendering completions")
}

pub fn install(shell: SupportedShell, output: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let target_path = output.unwrap_or_else(|| shell.default_dir().join(shell.file_name()));

    if target_path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite",
            target_path.display()
        );
    }

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating completions directory {}", parent.display()))?;
    }

    let script = generate(shell)?;
    fs::write(&target_path, script)
        .with_context(|| format!("writing completion script to {}", target_path.display()))?;

    Ok(target_path)
}

pub fn instructions(shell: SupportedShell, install_path: &Path) -> String {
    shell.install_instructions(install_path)
}
