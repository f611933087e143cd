use anyhow::Result;

use super::AppContext;
use crate::package::{DuctRunner, PackageManagerHandler};

/// Refresh package lists, then optionally upgrade and clean.
pub fn update(ctx: &AppContext, upgrade: bool, clean: bool) -> Result<u8> {
    let runner = DuctRunner;
    let handler = ctx.handler(&runner)?;
    update_with(ctx, &handler, upgrade, clean)
}

/// Every requested step runs even if an earlier one failed.
pub(crate) fn update_with(
    ctx: &AppContext,
    handler: &PackageManagerHandler,
    upgrade: bool,
    clean: bool,
) -> Result<u8> {
    let name = handler.manager().display_name;
    let mut failures = 0;

    ctx.renderer
        .step("update.refresh", &format!("Refreshing {name} package lists"));
    if let Err(err) = handler.update() {
        ctx.renderer.error("update.refresh.failed", &err.to_string());
        failures += 1;
    }

    if upgrade {
        if !ctx.confirm("Upgrade all installed packages?")? {
            ctx.renderer.info("update.upgrade.skipped", "Upgrade skipped");
        } else {
            ctx.renderer.step("update.upgrade", "Upgrading installed packages");
            if let Err(err) = handler.upgrade() {
                ctx.renderer.error("update.upgrade.failed", &err.to_string());
                failures += 1;
            }
        }
    }

    if clean {
        ctx.renderer.step("update.clean", "Cleaning package cache");
        if let Err(err) = handler.clean() {
            ctx.renderer.error("update.clean.failed", &err.to_string());
            failures += 1;
        }
    }

    if failures > 0 {
        return Ok(2);
    }
    if handler.is_dry_run() {
        ctx.renderer
            .info("update.dry_run", "Dry run: no changes were made");
    } else {
        ctx.renderer.success("update.done", "System is up to date");
    }
    Ok(0)
}
