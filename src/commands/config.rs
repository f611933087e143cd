use anyhow::{Result, anyhow};
use clap::Subcommand;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use serde_json::json;

use super::AppContext;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Print the settings file location
    Path,
    /// Print all settings
    Show,
    /// Print one setting
    Get {
        /// Setting name, e.g. timeoutMinutes
        key: String,
    },
    /// Change one setting and save
    Set {
        key: String,
        /// JSON value, or a plain string
        value: String,
    },
    /// Restore defaults and save
    Reset,
    /// Check the settings for problems
    Validate,
    /// Write default settings and built-in profiles
    Init,
    /// List available profiles
    Profiles,
    /// Show one profile
    Profile { name: String },
}

pub fn handle_config_command(ctx: &mut AppContext, command: ConfigCommands) -> Result<u8> {
    match command {
        ConfigCommands::Path => {
            let path = ctx.store.path().display().to_string();
            ctx.renderer.data("config.path", &path, json!(path));
        }
        ConfigCommands::Show => {
            let settings = serde_json::to_value(&ctx.store.settings)?;
            if ctx.renderer.is_json() {
                ctx.renderer.data("config.show", "Settings", settings);
            } else {
                ctx.renderer.raw(&serde_json::to_string_pretty(&settings)?);
            }
        }
        ConfigCommands::Get { key } => {
            let value = ctx.store.get(&key)?;
            let text = match &value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let mut data = serde_json::Map::new();
            data.insert(key, value);
            ctx.renderer.data("config.get", &text, data.into());
        }
        ConfigCommands::Set { key, value } => {
            ctx.store.set(&key, &value)?;
            ctx.store.save()?;
            ctx.renderer
                .success("config.set", &format!("{key} = {}", ctx.store.get(&key)?));
        }
        ConfigCommands::Reset => {
            if let Some(backup) = ctx.store.reset()? {
                ctx.renderer.warn(
                    "config.backup",
                    &format!("Moved the unreadable settings file to {}", backup.display()),
                );
            }
            ctx.store.save()?;
            ctx.renderer.success(
                "config.reset",
                &format!("Restored defaults in {}", ctx.store.path().display()),
            );
        }
        ConfigCommands::Validate => {
            let problems = ctx.store.settings.validate();
            if problems.is_empty() {
                ctx.renderer.success("config.valid", "Settings are valid");
            } else {
                for problem in &problems {
                    ctx.renderer.warn("config.invalid", problem);
                }
                return Ok(2);
            }
        }
        ConfigCommands::Init => {
            let created = ctx.store.init()?;
            if created.is_empty() {
                ctx.renderer.info("config.init", "Configuration already initialized");
            }
            for path in created {
                ctx.renderer
                    .success("config.init", &format!("Created {}", path.display()));
            }
        }
        ConfigCommands::Profiles => {
            let profiles = ctx.store.profiles()?;
            if ctx.renderer.is_json() {
                ctx.renderer
                    .data("config.profiles", "Profiles", serde_json::to_value(&profiles)?);
                return Ok(0);
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["Name", "Components", "Apps", "Description"]);
            for profile in profiles {
                table.add_row(vec![
                    profile.name,
                    profile.components.join(", "),
                    profile.apps.join(", "),
                    profile.description,
                ]);
            }
            ctx.renderer.raw(&table.to_string());
        }
        ConfigCommands::Profile { name } => {
            let profile = ctx
                .store
                .profile(&name)?
                .ok_or_else(|| anyhow!("Unknown profile: {name}"))?;
            if ctx.renderer.is_json() {
                ctx.renderer
                    .data("config.profile", &profile.name, serde_json::to_value(&profile)?);
            } else {
                ctx.renderer.raw(&serde_json::to_string_pretty(&profile)?);
            }
        }
    }
    Ok(0)
}
