mod commands;
mod completions;
mod components;
mod config;
mod doctor;
mod error;
mod installer;
mod package;
mod platform;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use crate::commands::{AppContext, ConfigCommands};
use crate::completions::CompletionCommands;
use crate::config::{ConfigStore, default_settings_path};
use crate::doctor::{DEFAULT_MAX_CONCURRENCY, DoctorCommands, DoctorContext};
use crate::ui::{OutputFormat, Renderer};

pub const BIN_NAME: &str = "ultimate-installer";

/// Cross-platform installer for curated tool bundles
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Show debug output, including every command that runs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print package manager commands instead of running them
    #[arg(short, long, global = true)]
    dry_run: bool,

    /// Answer yes to every prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Only consider components that work inside mobile sandboxes
    #[arg(long, global = true)]
    mobile_only: bool,

    /// Disable colored output (also honors NO_COLOR)
    #[arg(long, global = true)]
    no_color: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    /// Use a different settings file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install components
    #[command(visible_alias = "i")]
    Install {
        /// Component ids; omit to choose interactively
        components: Vec<String>,
        /// Install every component supported on this host
        #[arg(long, conflicts_with_all = ["components", "profile"])]
        all: bool,
        /// Install the components and apps of a profile
        #[arg(long, conflicts_with = "components")]
        profile: Option<String>,
    },
    /// Remove components
    #[command(visible_aliases = ["remove", "rm"])]
    Uninstall {
        components: Vec<String>,
        /// Remove every removable component
        #[arg(long, conflicts_with = "components")]
        all: bool,
    },
    /// List components
    #[command(visible_alias = "ls")]
    List {
        /// Include components not supported on this host
        #[arg(long)]
        all: bool,
    },
    /// Refresh package lists and upgrade installed packages
    #[command(visible_alias = "upgrade")]
    Update {
        /// Only refresh package lists
        #[arg(long)]
        no_upgrade: bool,
        /// Clean the package cache afterwards
        #[arg(long)]
        clean: bool,
    },
    /// Search the native package repositories
    Search { query: String },
    /// Show system information, a component, or a native package
    Info {
        /// Component id, or a package name with --package
        name: Option<String>,
        /// Ask the package manager about a package instead of a component
        #[arg(long, requires = "name")]
        package: bool,
    },
    /// Check the host for problems
    Doctor {
        /// Maximum number of checks to run at once
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        max_concurrency: usize,
        #[command(subcommand)]
        command: Option<DoctorCommands>,
    },
    /// Manage settings and profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Shell completion scripts
    Completions {
        #[command(subcommand)]
        command: CompletionCommands,
    },
}

pub fn cli_command() -> clap::Command {
    Cli::command()
}

fn color_enabled(cli: &Cli) -> bool {
    let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    !cli.no_color && !no_color_env && cli.output == OutputFormat::Text
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let color = color_enabled(&cli);
    if !color {
        colored::control::set_override(false);
    }
    let renderer = Renderer::new(cli.output, color, cli.verbose, cli.quiet);

    match run(cli, renderer.clone()).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            renderer.error("fatal", &format!("{err:#}"));
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli, renderer: Renderer) -> Result<u8> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_settings_path()?,
    };
    let (store, load_error) = ConfigStore::load(config_path);
    if let Some(err) = load_error {
        renderer.warn("config.load_failed", &format!("{err}, using defaults"));
    }

    let Some(command) = cli.command else {
        cli_command().print_help()?;
        return Ok(0);
    };

    let mut ctx = AppContext::new(renderer, store, cli.dry_run, cli.yes, cli.mobile_only);

    match command {
        Commands::Install {
            components,
            all,
            profile,
        } => commands::install(&ctx, components, all, profile),
        Commands::Uninstall { components, all } => commands::uninstall(&ctx, components, all),
        Commands::List { all } => commands::list(&ctx, all),
        Commands::Update { no_upgrade, clean } => commands::update(&ctx, !no_upgrade, clean),
        Commands::Search { query } => commands::search(&ctx, &query),
        Commands::Info { name, package } => commands::info(&ctx, name, package),
        Commands::Doctor {
            max_concurrency,
            command,
        } => {
            let doctor_ctx = DoctorContext {
                platform: platform::detect().map_err(|e| e.to_string()),
                config_path: ctx.store.path().to_path_buf(),
                settings: ctx.store.settings.clone(),
                is_root: matches!(sudo::check(), sudo::RunningAs::Root),
            };
            doctor::handle_doctor_command(command, max_concurrency, doctor_ctx, &ctx.renderer).await
        }
        Commands::Config { command } => commands::handle_config_command(&mut ctx, command),
        Commands::Completions { command } => match command {
            CompletionCommands::Generate { shell } => {
                print!("{}", completions::generate(shell)?);
                Ok(0)
            }
            CompletionCommands::Install {
                shell,
                path,
                force,
            } => {
                let path = completions::install(shell, path, force)?;
                ctx.renderer.success(
                    "completions.installed",
                    &format!("Installed {shell} completions to {}", path.display()),
                );
                ctx.renderer
                    .info("completions.hint", &completions::instructions(shell, &path));
                Ok(0)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli_command().debug_assert();
    }

    #[test]
    fn test_aliases_parse() {
        let cli = Cli::try_parse_from([BIN_NAME, "rm", "network"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Uninstall { .. })));

        let cli = Cli::try_parse_from([BIN_NAME, "i", "core", "-d", "-y"]).unwrap();
        assert!(cli.dry_run && cli.yes);
        assert!(matches!(
            cli.command,
            Some(Commands::Install { ref components, .. }) if components == &["core"]
        ));
    }

    #[test]
    fn test_info_package_needs_a_name() {
        assert!(Cli::try_parse_from([BIN_NAME, "info", "--package"]).is_err());
        let cli = Cli::try_parse_from([BIN_NAME, "info", "--package", "nmap"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Info { ref name, package: true }) if name.as_deref() == Some("nmap")
        ));
    }

    #[test]
    fn test_all_conflicts_with_ids() {
        assert!(Cli::try_parse_from([BIN_NAME, "install", "core", "--all"]).is_err());
    }
}
