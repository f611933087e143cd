use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde_json::json;

use super::AppContext;
use crate::components::{self, CATALOG};
use crate::package::{DuctRunner, PackageManagerHandler};
use crate::platform::PlatformInfo;
use crate::ui::Renderer;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn flag_cell(flag: bool) -> Cell {
    if flag {
        Cell::new("yes").fg(Color::Green)
    } else {
        Cell::new("no").fg(Color::Red)
    }
}

/// Components for this host, or the whole catalog with `--all`.
pub fn list(ctx: &AppContext, all: bool) -> Result<u8> {
    let platform = ctx.platform()?;
    let rows: Vec<_> = CATALOG
        .iter()
        .map(|c| (c, c.is_supported_on(platform), c.is_installed()))
        .filter(|(_, supported, _)| all || *supported)
        .collect();

    if ctx.renderer.is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(c, supported, installed)| {
                json!({
                    "id": c.id,
                    "name": c.name,
                    "category": c.category,
                    "description": c.description,
                    "supported": supported,
                    "installed": installed,
                    "packages": if *supported { c.packages_for(platform) } else { Vec::new() },
                })
            })
            .collect();
        ctx.renderer.data(
            "list",
            &format!("Components for {}", platform.summary()),
            json!(items),
        );
        return Ok(0);
    }

    let mut out = table(vec![
        "ID",
        "Name",
        "Category",
        "Supported",
        "Installed",
        "Packages",
        "Description",
    ]);
    for (component, supported, installed) in rows {
        let count = if supported {
            component.packages_for(platform).len().to_string()
        } else {
            "-".to_string()
        };
        out.add_row(vec![
            Cell::new(component.id),
            Cell::new(component.name),
            Cell::new(component.category),
            flag_cell(supported),
            flag_cell(installed),
            Cell::new(count),
            Cell::new(component.description),
        ]);
    }
    ctx.renderer
        .info("list.platform", &format!("Components for {}", platform.summary()));
    ctx.renderer.raw(&out.to_string());
    Ok(0)
}

/// Property rows describing the host.
fn system_rows(ctx: &AppContext, platform: &PlatformInfo) -> Vec<(&'static str, String)> {
    let distro = platform.distribution;
    let manager = platform.package_manager;
    let sources = manager.capabilities.sources();
    let mut rows: Vec<(&'static str, String)> = vec![
        ("Operating system", platform.os.to_string()),
        ("Distribution", format!("{} ({})", distro.name, distro.key)),
        ("Family", format!("{:?}", distro.family)),
        ("Architecture", platform.arch.to_string()),
        ("Package manager", manager.display_name.to_string()),
        ("Needs elevation", yes_no(manager.needs_sudo).to_string()),
        (
            "Extra sources",
            if sources.is_empty() {
                "none".to_string()
            } else {
                sources.join(", ")
            },
        ),
        ("Shell", platform.shell.clone()),
        ("Mobile", yes_no(platform.is_mobile).to_string()),
        ("Embedded", yes_no(platform.is_embedded).to_string()),
        ("Network OS", yes_no(platform.is_network_os).to_string()),
        ("WSL", yes_no(platform.is_wsl).to_string()),
        ("Container", yes_no(platform.is_container).to_string()),
        ("Live system", yes_no(platform.is_live_cd).to_string()),
        ("Portable", yes_no(platform.is_portable).to_string()),
        ("Security focused", yes_no(distro.is_security_focused).to_string()),
        ("Privacy focused", yes_no(distro.is_privacy_focused).to_string()),
    ];

    if let Some(mobile) = &platform.mobile_config {
        rows.push(("Rooted", yes_no(mobile.is_rooted).to_string()));
        rows.push(("proot available", yes_no(mobile.has_proot).to_string()));
        rows.push(("Mobile storage", mobile.storage_path.display().to_string()));
    }
    if let Some(embedded) = &platform.embedded_config {
        rows.push(("Device type", embedded.device_type.as_str().to_string()));
        rows.push(("Limited storage", yes_no(embedded.has_limited_storage).to_string()));
        rows.push(("Limited RAM", yes_no(embedded.has_limited_ram).to_string()));
    }
    if let Some(network) = &platform.network_config {
        rows.push((
            "Firewall",
            network
                .firewall_type
                .map_or("unknown", |fw| fw.as_str())
                .to_string(),
        ));
        rows.push(("Web interface", yes_no(network.has_web_interface).to_string()));
        rows.push(("Interfaces", network.default_interfaces.join(", ")));
    }
    if !distro.default_repos.is_empty() {
        rows.push(("Default repos", distro.default_repos.join(", ")));
    }

    rows.push(("Install dir", platform.paths.install_dir.display().to_string()));
    rows.push(("Config file", ctx.store.path().display().to_string()));
    rows
}

/// System details, one component's details, or a native package's details.
pub fn info(ctx: &AppContext, name: Option<String>, package: bool) -> Result<u8> {
    if package {
        let name = name.context("--package needs a package name")?;
        let runner = DuctRunner;
        let handler = ctx.handler(&runner)?;
        return Ok(package_info(&ctx.renderer, &handler, &name));
    }

    let platform = ctx.platform()?;
    if !platform.distribution.supports(platform.arch) {
        ctx.renderer.warn(
            "platform.arch_unsupported",
            &format!(
                "{} does not officially support {}",
                platform.distribution.name, platform.arch
            ),
        );
    }

    let Some(id) = name else {
        let rows = system_rows(ctx, platform);
        if ctx.renderer.is_json() {
            let map: serde_json::Map<String, serde_json::Value> = rows
                .into_iter()
                .map(|(k, v)| (k.to_lowercase().replace(' ', "_"), json!(v)))
                .collect();
            ctx.renderer
                .data("info.system", &platform.summary(), json!(map));
        } else {
            let mut out = table(vec!["Property", "Value"]);
            for (key, value) in rows {
                out.add_row(vec![key.to_string(), value]);
            }
            ctx.renderer.raw(&out.to_string());
        }
        return Ok(0);
    };

    let component = components::find(&id).with_context(|| {
        format!("Use `info --package {id}` to query the {} repositories", platform.package_manager)
    })?;
    let supported = component.check_platform(platform);
    let packages = component.packages_for(platform);
    let installed = component.is_installed();

    if ctx.renderer.is_json() {
        ctx.renderer.data(
            "info.component",
            component.name,
            json!({
                "id": component.id,
                "name": component.name,
                "category": component.category,
                "description": component.description,
                "supported": supported.is_ok(),
                "installed": installed,
                "removable": component.removable,
                "updateFirst": component.update_first,
                "platforms": component.platforms.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
                "packages": packages,
            }),
        );
        return Ok(0);
    }

    let mut out = table(vec!["Property", "Value"]);
    out.add_row(vec!["ID", component.id]);
    out.add_row(vec!["Name", component.name]);
    out.add_row(vec!["Category", component.category]);
    out.add_row(vec!["Description", component.description]);
    out.add_row(vec![
        "Platforms".to_string(),
        component
            .platforms
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    ]);
    out.add_row(vec!["Removable", yes_no(component.removable)]);
    out.add_row(vec!["Installed", yes_no(installed)]);
    ctx.renderer.raw(&out.to_string());

    match supported {
        Ok(()) => ctx.renderer.raw(&format!(
            "Packages via {}:\n  {}",
            platform.package_manager.display_name,
            packages.join("\n  ")
        )),
        Err(err) => ctx.renderer.warn("component.unsupported", &err.to_string()),
    }
    Ok(0)
}

/// Pass the package manager's own description of `name` through.
pub(crate) fn package_info(renderer: &Renderer, handler: &PackageManagerHandler, name: &str) -> u8 {
    match handler.info(name) {
        Ok(lines) => {
            if renderer.is_json() {
                renderer.data("info.package", name, json!(lines));
            } else {
                for line in &lines {
                    renderer.raw(line);
                }
            }
            0
        }
        Err(err) => {
            renderer.error("info.failed", &err.to_string());
            2
        }
    }
}

/// Search the native repositories and pass the output through.
pub fn search(ctx: &AppContext, query: &str) -> Result<u8> {
    let runner = DuctRunner;
    let handler = ctx.handler(&runner)?;
    Ok(search_with(&ctx.renderer, &handler, query))
}

pub(crate) fn search_with(renderer: &Renderer, handler: &PackageManagerHandler, query: &str) -> u8 {
    match handler.search(query) {
        Ok(lines) => {
            if renderer.is_json() {
                renderer.data("search", query, json!(lines));
            } else {
                for line in &lines {
                    renderer.raw(line);
                }
            }
            0
        }
        Err(err) => {
            renderer.error("search.failed", &err.to_string());
            2
        }
    }
}
