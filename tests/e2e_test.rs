mod common;
mod utils;

use anyhow::Result;
use common::TestEnvironment;
use utils::run_installer;

#[test]
fn test_list_shows_core_component() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["list", "--all"])?;
    assert_eq!(output.exit_code, 0, "list failed: {}", output.stderr);
    for id in ["core", "devtools", "security-research", "mobile-dev"] {
        assert!(output.stdout.contains(id), "missing {id}:\n{}", output.stdout);
    }
    Ok(())
}

#[test]
fn test_list_json_is_parseable() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["--output", "json", "ls", "--all"])?;
    assert_eq!(output.exit_code, 0, "list failed: {}", output.stderr);
    let events = json_lines(&output.stdout)?;
    let result = events
        .iter()
        .find(|e| e["level"] == "result")
        .expect("no result event");
    assert_eq!(result["code"], "list");
    let items = &result["data"];
    assert_eq!(items.as_array().map(Vec::len), Some(8));
    assert_eq!(items[0]["id"], "core");
    assert!(items[0]["installed"].is_boolean());
    Ok(())
}

/// Parse stdout as JSON lines, failing on any line that is not an object.
fn json_lines(stdout: &str) -> Result<Vec<serde_json::Value>> {
    stdout
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| anyhow::anyhow!("not JSON: {line:?}: {e}"))?;
            anyhow::ensure!(value.is_object(), "not an event: {line}");
            Ok(value)
        })
        .collect()
}

#[test]
fn test_json_install_dry_run_is_one_event_per_line() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["--output", "json", "-d", "-y", "install", "core"])?;
    assert_eq!(output.exit_code, 0, "dry run failed: {}", output.stderr);
    let events = json_lines(&output.stdout)?;
    let report = events
        .iter()
        .find(|e| e["code"] == "report")
        .expect("no report event");
    assert_eq!(report["data"]["dryRun"], true);
    assert_eq!(report["data"]["components"][0]["id"], "core");
    Ok(())
}

#[test]
fn test_quiet_still_prints_results() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["-q", "config", "get", "timeoutMinutes"])?;
    assert_eq!(output.exit_code, 0, "get failed: {}", output.stderr);
    assert_eq!(output.stdout.trim(), "30");

    let output = run_installer(&env, &["--output", "json", "-q", "list", "--all"])?;
    assert_eq!(output.exit_code, 0);
    let events = json_lines(&output.stdout)?;
    assert_eq!(events.len(), 1, "{}", output.stdout);
    assert_eq!(events[0]["level"], "result");
    Ok(())
}

#[test]
fn test_update_dry_run_prints_commands() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["-d", "-y", "update", "--clean"])?;
    assert_eq!(output.exit_code, 0, "update failed: {}", output.stderr);
    assert!(output.stdout.contains("would run:"), "{}", output.stdout);
    assert!(output.stdout.contains("no changes were made"), "{}", output.stdout);
    Ok(())
}

#[test]
fn test_search_and_package_info_dry_run() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["-d", "search", "vim"])?;
    assert_eq!(output.exit_code, 0, "search failed: {}", output.stderr);
    assert!(output.stdout.contains("would run:"), "{}", output.stdout);
    assert!(output.stdout.contains("vim"));

    let output = run_installer(&env, &["-d", "info", "--package", "git"])?;
    assert_eq!(output.exit_code, 0, "info failed: {}", output.stderr);
    assert!(output.stdout.contains("would run:"), "{}", output.stdout);
    Ok(())
}

#[test]
fn test_doctor_list_names_checks() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["doctor", "list"])?;
    assert_eq!(output.exit_code, 0, "doctor list failed: {}", output.stderr);
    for id in ["platform", "package-manager", "internet", "catalog"] {
        assert!(output.stdout.contains(id), "missing {id}:\n{}", output.stdout);
    }
    Ok(())
}

#[test]
fn test_info_unknown_component_is_fatal() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["info", "kitchen-sink"])?;
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("kitchen-sink"));
    Ok(())
}

#[test]
fn test_info_component_lists_packages() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["info", "core"])?;
    assert_eq!(output.exit_code, 0, "info failed: {}", output.stderr);
    assert!(output.stdout.contains("Core"));
    Ok(())
}

#[test]
fn test_install_dry_run_changes_nothing() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["--dry-run", "install", "core"])?;
    assert_eq!(output.exit_code, 0, "dry run failed: {}", output.stderr);
    assert!(output.stdout.contains("would run:"), "{}", output.stdout);
    assert!(output.stdout.contains("would be installed"), "{}", output.stdout);
    assert!(!output.stdout.contains("✓ install "), "{}", output.stdout);
    assert!(!env.settings_path().exists());
    Ok(())
}

#[test]
fn test_install_unknown_component_is_partial() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["-d", "-y", "install", "bogus"])?;
    assert_eq!(output.exit_code, 2);
    assert!(output.stderr.contains("bogus"));
    Ok(())
}

#[test]
fn test_completions_generate() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["completions", "generate", "bash"])?;
    assert_eq!(output.exit_code, 0);
    assert!(output.stdout.contains("ultimate-installer"));
    Ok(())
}

#[test]
fn test_config_set_get_roundtrip_through_file() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = run_installer(&env, &["config", "path"])?;
    assert_eq!(output.stdout.trim(), env.settings_path().display().to_string());

    let output = run_installer(&env, &["config", "set", "timeoutMinutes", "5"])?;
    assert_eq!(output.exit_code, 0, "set failed: {}", output.stderr);
    assert!(env.settings_path().exists());

    let output = run_installer(&env, &["config", "get", "timeoutMinutes"])?;
    assert_eq!(output.stdout.trim(), "5");

    let output = run_installer(&env, &["config", "set", "timeoutMinutes", "soon"])?;
    assert_eq!(output.exit_code, 1);
    Ok(())
}

#[test]
fn test_malformed_config_falls_back_to_defaults() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_settings("{ this is not json")?;
    let output = run_installer(&env, &["config", "get", "elevationCommand"])?;
    assert_eq!(output.exit_code, 0);
    assert_eq!(output.stdout.trim(), "sudo");
    assert!(output.stderr.contains("using defaults"));
    Ok(())
}

#[test]
fn test_malformed_config_is_not_overwritten() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write_settings("{ this is not json")?;

    let output = run_installer(&env, &["config", "set", "timeoutMinutes", "5"])?;
    assert_eq!(output.exit_code, 1);
    assert!(output.stderr.contains("config reset"), "{}", output.stderr);
    assert_eq!(
        std::fs::read_to_string(env.settings_path())?,
        "{ this is not json"
    );

    let output = run_installer(&env, &["config", "reset"])?;
    assert_eq!(output.exit_code, 0, "reset failed: {}", output.stderr);
    let backup = env.path().join("settings.json.bak");
    assert_eq!(std::fs::read_to_string(backup)?, "{ this is not json");

    let output = run_installer(&env, &["config", "get", "timeoutMinutes"])?;
    assert_eq!(output.stdout.trim(), "30");
    assert!(!output.stderr.contains("using defaults"));
    Ok(())
}

#[test]
fn test_config_init_writes_profiles() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["config", "init"])?;
    assert_eq!(output.exit_code, 0, "init failed: {}", output.stderr);
    assert!(env.path().join("profiles").join("developer.json").exists());

    let output = run_installer(&env, &["config", "profile", "developer"])?;
    assert!(output.stdout.contains("\"docker\""));
    Ok(())
}

#[test]
fn test_unknown_flag_exits_one() -> Result<()> {
    let env = TestEnvironment::new()?;
    let output = run_installer(&env, &["--definitely-not-a-flag"])?;
    assert_eq!(output.exit_code, 1);
    Ok(())
}
