//! Subprocess execution.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use duct::cmd;

/// A fully built command line ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    /// Capture stdout/stderr instead of inheriting the terminal.
    pub capture: bool,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Human readable failure reason, e.g. `exit status 100`.
    pub fn failure_reason(&self) -> String {
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs package manager commands. Errors mean the process could not be
/// spawned or waited on; a non-zero exit is reported through [`RunOutput`].
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<RunOutput>;
}

/// Runs commands as real child processes through `duct`.
#[derive(Debug, Default)]
pub struct DuctRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

impl CommandRunner for DuctRunner {
    fn run(&self, invocation: &Invocation) -> Result<RunOutput> {
        let (program, args) = invocation
            .argv
            .split_first()
            .context("Cannot run an empty command")?;

        let mut expr = cmd(program.as_str(), args).unchecked();
        if invocation.capture {
            expr = expr.stdout_capture().stderr_capture();
        }

        let handle = expr
            .start()
            .with_context(|| format!("Failed to start {program}"))?;

        let output = match invocation.timeout {
            None => handle
                .wait()
                .with_context(|| format!("Failed to wait for {program}"))?,
            Some(limit) => {
                let started = Instant::now();
                loop {
                    if let Some(output) = handle
                        .try_wait()
                        .with_context(|| format!("Failed to poll {program}"))?
                    {
                        break output;
                    }
                    if started.elapsed() >= limit {
                        handle
                            .kill()
                            .with_context(|| format!("Failed to kill {program}"))?;
                        bail!("{program} timed out after {}s", limit.as_secs());
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            }
        };

        Ok(RunOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
