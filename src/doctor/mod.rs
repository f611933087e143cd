use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::Settings;
use crate::platform::PlatformInfo;

mod checks;
mod command;
mod registry;

pub use checks::*;
pub use command::handle_doctor_command;
pub use registry::CheckRegistry;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

#[derive(Subcommand, Debug, Clone)]
pub enum DoctorCommands {
    /// List available checks
    List,
    /// Run a single check by id
    Run {
        /// Check id as shown by `doctor list`
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CheckStatus {
    Pass(String),
    Warning(String),
    Fail(String),
    Skipped(String),
}

impl CheckStatus {
    pub fn message(&self) -> &str {
        match self {
            CheckStatus::Pass(msg)
            | CheckStatus::Warning(msg)
            | CheckStatus::Fail(msg)
            | CheckStatus::Skipped(msg) => msg,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Fail(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass(_) => "PASS",
            CheckStatus::Warning(_) => "WARN",
            CheckStatus::Fail(_) => "FAIL",
            CheckStatus::Skipped(_) => "SKIP",
        }
    }

    fn table_color(&self) -> Color {
        match self {
            CheckStatus::Pass(_) => Color::Green,
            CheckStatus::Warning(_) => Color::Yellow,
            CheckStatus::Fail(_) => Color::Red,
            CheckStatus::Skipped(_) => Color::DarkGrey,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Snapshot of the host shared by every check.
#[derive(Debug)]
pub struct DoctorContext {
    /// Detection error message when the host is not supported.
    pub platform: Result<PlatformInfo, String>,
    pub config_path: PathBuf,
    pub settings: Settings,
    pub is_root: bool,
}

impl DoctorContext {
    pub fn platform(&self) -> Option<&PlatformInfo> {
        self.platform.as_ref().ok()
    }
}

#[async_trait::async_trait]
pub trait DoctorCheck: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &DoctorContext) -> CheckStatus;

    /// What the user can do about a warning or failure.
    fn hint(&self) -> Option<String> {
        None
    }
}

pub async fn execute_check(check: &dyn DoctorCheck, ctx: &DoctorContext) -> CheckResult {
    let status = check.execute(ctx).await;
    let hint = match status {
        CheckStatus::Warning(_) | CheckStatus::Fail(_) => check.hint(),
        _ => None,
    };
    CheckResult {
        id: check.id().to_string(),
        name: check.name().to_string(),
        status,
        hint,
    }
}

/// Run checks concurrently, at most `max_concurrency` at a time.
///
/// Results come back in the order the checks were given.
pub async fn run_all_checks(
    checks: Vec<Box<dyn DoctorCheck>>,
    ctx: Arc<DoctorContext>,
    max_concurrency: usize,
) -> Vec<CheckResult> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(checks.len());

    for check in checks {
        let ctx = Arc::clone(&ctx);
        let semaphore = Arc::clone(&semaphore);
        let id = check.id();
        let name = check.name();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            execute_check(check.as_ref(), &ctx).await
        });
        handles.push((id, name, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (id, name, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => CheckResult {
                id: id.to_string(),
                name: name.to_string(),
                status: CheckStatus::Fail(format!("check panicked: {err}")),
                hint: None,
            },
        };
        results.push(result);
    }
    results
}

pub fn results_table(results: &[CheckResult]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Check", "Status", "Message"]);
    for result in results {
        table.add_row(vec![
            Cell::new(&result.name),
            Cell::new(result.status.label()).fg(result.status.table_color()),
            Cell::new(result.status.message()),
        ]);
    }
    table
}

pub fn check_list_table(checks: &[Box<dyn DoctorCheck>]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Name"]);
    for check in checks {
        table.add_row(vec![check.id(), check.name()]);
    }
    table
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::platform::{FakeHost, detect_with};

    struct Fixed(&'static str, CheckStatus);

    #[async_trait::async_trait]
    impl DoctorCheck for Fixed {
        fn id(&self) -> &'static str {
            self.0
        }

        fn name(&self) -> &'static str {
            self.0
        }

        async fn execute(&self, _ctx: &DoctorContext) -> CheckStatus {
            self.1.clone()
        }

        fn hint(&self) -> Option<String> {
            Some(format!("fix {}", self.0))
        }
    }

    pub(crate) fn context() -> DoctorContext {
        DoctorContext {
            platform: detect_with(&FakeHost::linux().with_os_release("ID=debian\n"))
                .map_err(|e| e.to_string()),
            config_path: PathBuf::from("/nonexistent/settings.json"),
            settings: Settings::default(),
            is_root: false,
        }
    }

    #[tokio::test]
    async fn test_results_keep_registration_order() {
        let checks: Vec<Box<dyn DoctorCheck>> = vec![
            Box::new(Fixed("a", CheckStatus::Pass("ok".into()))),
            Box::new(Fixed("b", CheckStatus::Fail("broken".into()))),
            Box::new(Fixed("c", CheckStatus::Warning("meh".into()))),
        ];
        let results = run_all_checks(checks, Arc::new(context()), 1).await;
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results[1].status.is_failure());
        assert_eq!(results[0].hint, None);
        assert_eq!(results[1].hint.as_deref(), Some("fix b"));
    }

    #[test]
    fn test_status_serializes_flat() {
        let result = CheckResult {
            id: "x".into(),
            name: "X".into(),
            status: CheckStatus::Warning("careful".into()),
            hint: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "warning");
        assert_eq!(json["message"], "careful");
        assert!(json.get("hint").is_none());
    }

    #[test]
    fn test_results_table_shows_label_and_message() {
        let results = vec![CheckResult {
            id: "net".into(),
            name: "Network".into(),
            status: CheckStatus::Fail("no route".into()),
            hint: None,
        }];
        let rendered = results_table(&results).to_string();
        assert!(rendered.contains("Network"));
        assert!(rendered.contains("FAIL"));
        assert!(rendered.contains("no route"));
    }
}
