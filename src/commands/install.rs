use std::io::IsTerminal;

use anyhow::{Context, Result, anyhow, bail};
use colored::*;

use super::AppContext;
use crate::components::{self, CATALOG, Component};
use crate::installer::{ComponentOutcome, InstallReport, Installer};
use crate::package::DuctRunner;
use crate::platform::PlatformInfo;

/// What an install run should cover.
#[derive(Debug, Default)]
struct Selection {
    ids: Vec<String>,
    apps: Vec<String>,
    label: Option<String>,
}

pub fn install(
    ctx: &AppContext,
    requested: Vec<String>,
    all: bool,
    profile: Option<String>,
) -> Result<u8> {
    let platform = ctx.platform()?;
    let runner = DuctRunner;
    let handler = ctx.handler(&runner)?;
    let installer = Installer::new(
        platform,
        &handler,
        &ctx.store.settings,
        &ctx.renderer,
        ctx.mobile_only,
    )?;

    let selection = if let Some(name) = profile {
        from_profile(ctx, &name)?
    } else if all {
        Selection {
            ids: available(platform, ctx.mobile_only)
                .map(|c| c.id.to_string())
                .collect(),
            ..Default::default()
        }
    } else if !requested.is_empty() {
        Selection {
            ids: requested,
            ..Default::default()
        }
    } else {
        pick(ctx, platform, "Select components to install")?
    };

    if selection.ids.is_empty() && selection.apps.is_empty() {
        ctx.renderer.warn("install.empty", "Nothing selected");
        return Ok(0);
    }

    if ctx.store.settings.confirm_os_detection
        && !ctx.confirm(&format!("Detected {}. Is this correct?", platform.summary()))?
    {
        bail!("Aborted: platform detection was not confirmed");
    }

    ctx.renderer.info(
        "install.plan",
        &format!(
            "Installing {} on {} with {}",
            describe(&selection),
            platform.summary(),
            platform.package_manager.display_name
        ),
    );
    if !ctx.confirm("Proceed with installation?")? {
        ctx.renderer.info("install.cancelled", "Installation cancelled");
        return Ok(0);
    }

    let mut report = installer.install(&selection.ids);
    if let Some(label) = &selection.label {
        installer.install_packages(label, &selection.apps, &mut report);
    }
    print_report(ctx, &report, "installed")?;
    Ok(report.exit_code())
}

pub fn uninstall(ctx: &AppContext, requested: Vec<String>, all: bool) -> Result<u8> {
    let platform = ctx.platform()?;
    let runner = DuctRunner;
    let handler = ctx.handler(&runner)?;
    let installer = Installer::new(
        platform,
        &handler,
        &ctx.store.settings,
        &ctx.renderer,
        ctx.mobile_only,
    )?;

    let ids: Vec<String> = if all {
        available(platform, ctx.mobile_only)
            .filter(|c| c.removable)
            .map(|c| c.id.to_string())
            .collect()
    } else if !requested.is_empty() {
        requested
    } else {
        pick(ctx, platform, "Select components to remove")?.ids
    };

    if ids.is_empty() {
        ctx.renderer.warn("uninstall.empty", "Nothing selected");
        return Ok(0);
    }
    if !ctx.confirm(&format!("Remove {}?", ids.join(", ")))? {
        ctx.renderer.info("uninstall.cancelled", "Removal cancelled");
        return Ok(0);
    }

    let report = installer.uninstall(&ids);
    print_report(ctx, &report, "removed")?;
    Ok(report.exit_code())
}

fn available(platform: &PlatformInfo, mobile_only: bool) -> impl Iterator<Item = &'static Component> + '_ {
    CATALOG
        .iter()
        .filter(move |c| c.is_supported_on(platform) && (!mobile_only || c.mobile_compatible()))
}

fn from_profile(ctx: &AppContext, name: &str) -> Result<Selection> {
    let profile = ctx
        .store
        .profile(name)?
        .ok_or_else(|| anyhow!("Unknown profile: {name}"))?;
    if !profile.hooks.is_empty() {
        ctx.renderer.info(
            "profile.hooks",
            &format!("Profile hooks are informational only: {}", profile.hooks.join(", ")),
        );
    }
    Ok(Selection {
        ids: profile.components,
        apps: profile.apps,
        label: Some(profile.name),
    })
}

fn pick(ctx: &AppContext, platform: &PlatformInfo, prompt: &str) -> Result<Selection> {
    if !ctx.interactive() || !std::io::stdin().is_terminal() {
        bail!(
            "No components given. Pass component ids ({}) or --all",
            components::ids().collect::<Vec<_>>().join(", ")
        );
    }
    let choices: Vec<&Component> = available(platform, ctx.mobile_only).collect();
    let labels: Vec<String> = choices
        .iter()
        .map(|c| format!("{:<18} {}", c.name, c.description))
        .collect();
    let defaults: Vec<bool> = choices.iter().map(|c| c.default).collect();

    let picked = dialoguer::MultiSelect::new()
        .with_prompt(prompt)
        .items(&labels)
        .defaults(&defaults)
        .interact_opt()
        .context("Failed to show component picker")?
        .unwrap_or_default();

    Ok(Selection {
        ids: picked.into_iter().map(|i| choices[i].id.to_string()).collect(),
        ..Default::default()
    })
}

fn describe(selection: &Selection) -> String {
    let mut parts = Vec::new();
    if !selection.ids.is_empty() {
        parts.push(selection.ids.join(", "));
    }
    if !selection.apps.is_empty() {
        parts.push(format!("{} extra apps", selection.apps.len()));
    }
    parts.join(" + ")
}

/// One summary line per component, e.g. `privacy  7 installed, 1 failed`.
fn outcome_line(outcome: &ComponentOutcome, verb: &str, dry_run: bool) -> String {
    if dry_run {
        format!(
            "{:<20} {} would be {verb}",
            outcome.id,
            outcome.succeeded.len()
        )
    } else {
        format!(
            "{:<20} {} {verb}, {} failed",
            outcome.id,
            outcome.succeeded.len(),
            outcome.failed.len()
        )
    }
}

fn print_report(ctx: &AppContext, report: &InstallReport, verb: &str) -> Result<()> {
    if ctx.renderer.is_json() {
        let message = if report.dry_run {
            format!("Dry run: nothing {verb}")
        } else {
            format!("{} package operations failed", report.failed_packages())
        };
        ctx.renderer
            .data("report", &message, serde_json::to_value(report)?);
        return Ok(());
    }

    ctx.renderer.separator(true);
    for outcome in &report.components {
        let line = outcome_line(outcome, verb, report.dry_run);
        if report.dry_run {
            ctx.renderer.info("report.component", &line);
        } else if outcome.failed.is_empty() {
            ctx.renderer.success("report.component", &line);
        } else {
            ctx.renderer.warn(
                "report.component",
                &format!("{line}: {}", outcome.failed.join(", ").red()),
            );
        }
    }
    for skipped in &report.skipped {
        ctx.renderer.info(
            "report.skipped",
            &format!("{:<20} skipped ({:?})", skipped.id, skipped.reason),
        );
    }
    if report.dry_run {
        ctx.renderer.info("report.dry_run", "Dry run: no changes were made");
    } else if report.has_failures() {
        ctx.renderer.warn(
            "report.partial",
            &format!("{} package operations failed", report.failed_packages()),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> ComponentOutcome {
        ComponentOutcome {
            id: "privacy".into(),
            succeeded: vec!["gnupg".into(), "tor".into()],
            failed: vec!["i2p".into()],
        }
    }

    #[test]
    fn test_outcome_line_wording() {
        let line = outcome_line(&outcome(), "installed", false);
        assert!(line.ends_with("2 installed, 1 failed"), "{line}");

        let line = outcome_line(&outcome(), "installed", true);
        assert!(line.ends_with("2 would be installed"), "{line}");
        assert!(!line.contains("failed"));

        let line = outcome_line(&outcome(), "removed", true);
        assert!(line.ends_with("would be removed"), "{line}");
    }
}
