//! Subprocess invocation with captured output.
//!
//! The dashboard re-runs the fetch and clean steps, and the fetcher runs
//! the auth step, by re-invoking this binary with a subcommand. Output and
//! exit status are always captured so failures can be surfaced — never
//! fire-and-forget.

use std::process::Command;

use anyhow::{Context, Result};

/// Captured result of a finished subprocess.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl ProcessOutput {
    /// A one-line failure description: the last non-empty stderr line, or
    /// the exit code when the process wrote nothing.
    pub fn failure_summary(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .unwrap_or_else(|| match self.exit_code {
                Some(code) => format!("exited with status {code}"),
                None => "terminated by signal".to_string(),
            })
    }
}

/// Run the current executable with the given arguments, blocking until it
/// exits, and capture stdout/stderr.
pub fn run_self(args: &[&str]) -> Result<ProcessOutput> {
    let exe = std::env::current_exe().context("failed to locate current executable")?;

    let output = Command::new(&exe)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {} {}", exe.display(), args.join(" ")))?;

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
        success: output.status.success(),
    })
}
