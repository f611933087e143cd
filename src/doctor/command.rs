use std::sync::Arc;

use anyhow::{Result, anyhow};
use colored::*;

use super::{
    CheckRegistry, CheckResult, DoctorCommands, DoctorContext, check_list_table, execute_check,
    results_table, run_all_checks,
};
use crate::ui::Renderer;

/// Dispatch `doctor` and return the process exit code.
pub async fn handle_doctor_command(
    command: Option<DoctorCommands>,
    max_concurrency: usize,
    ctx: DoctorContext,
    renderer: &Renderer,
) -> Result<u8> {
    let registry = CheckRegistry::new();
    match command {
        None => {
            let results = run_all_checks(registry.all_checks(), Arc::new(ctx), max_concurrency).await;
            print_results(&results, renderer)?;
            Ok(exit_code(&results))
        }
        Some(DoctorCommands::List) => {
            let checks = registry.all_checks();
            if renderer.is_json() {
                let ids: Vec<_> = checks
                    .iter()
                    .map(|c| serde_json::json!({ "id": c.id(), "name": c.name() }))
                    .collect();
                renderer.data("doctor.list", "Available checks", ids.into());
            } else {
                renderer.raw(&check_list_table(&checks).to_string());
            }
            Ok(0)
        }
        Some(DoctorCommands::Run { name }) => {
            let check = registry.create_check(&name).ok_or_else(|| {
                let known: Vec<_> = registry.ids().collect();
                anyhow!("Unknown check: {name} (available: {})", known.join(", "))
            })?;
            let result = execute_check(check.as_ref(), &ctx).await;
            let results = [result];
            print_results(&results, renderer)?;
            Ok(exit_code(&results))
        }
    }
}

fn exit_code(results: &[CheckResult]) -> u8 {
    if results.iter().any(|r| r.status.is_failure()) {
        2
    } else {
        0
    }
}

fn print_results(results: &[CheckResult], renderer: &Renderer) -> Result<()> {
    if renderer.is_json() {
        let failed = results.iter().filter(|r| r.status.is_failure()).count();
        renderer.data(
            "doctor.results",
            &format!("{failed} of {} checks failed", results.len()),
            serde_json::to_value(results)?,
        );
        return Ok(());
    }

    renderer.raw(&format!("{}", "System Health Check Results".bold()));
    renderer.raw(&results_table(results).to_string());

    let hints: Vec<_> = results
        .iter()
        .filter_map(|r| r.hint.as_ref().map(|hint| (r, hint)))
        .collect();
    if !hints.is_empty() {
        renderer.raw(&format!("\n{}", "Suggestions:".bold().yellow()));
        for (result, hint) in hints {
            renderer.raw(&format!("  - {}: {}", result.name, hint));
        }
    }
    Ok(())
}
