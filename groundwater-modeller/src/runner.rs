//! Blocking invocation of the MODFLOW 6 executable.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const NORMAL_TERMINATION: &str = "Normal termination of simulation";
const TAIL_LINES: usize = 20;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub stdout: Vec<String>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn normal_termination(&self) -> bool {
        self.stdout.iter().any(|l| l.contains(NORMAL_TERMINATION))
    }
}

pub struct Mf6Runner {
    exe: String,
}

impl Mf6Runner {
    pub fn new(exe: &str) -> Self {
        Mf6Runner {
            exe: exe.to_string(),
        }
    }

    /// Runs the solver in `workspace` and waits for it to exit.
    ///
    /// Succeeds only if the process exits cleanly, reports normal termination
    /// and every path in `expected` exists afterwards.
    pub fn run(&self, workspace: &Path, expected: &[PathBuf]) -> Result<RunReport> {
        info!("Running {} in {}", self.exe, workspace.display());
        let start = Instant::now();

        let output = Command::new(&self.exe)
            .current_dir(workspace)
            .output()
            .with_context(|| {
                format!(
                    "Failed to start solver '{}'. Is it installed and on PATH?",
                    self.exe
                )
            })?;

        let report = RunReport {
            stdout: String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::to_string)
                .collect(),
            elapsed: start.elapsed(),
        };
        for l in &report.stdout {
            debug!("{}", l);
        }

        if !output.status.success() || !report.normal_termination() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Solver '{}' failed ({}):\n{}\n{}",
                self.exe,
                output.status,
                tail(&report.stdout),
                stderr.trim()
            );
        }

        let missing: Vec<String> = expected
            .iter()
            .filter(|p| !p.exists())
            .map(|p| p.display().to_string())
            .collect();
        if !missing.is_empty() {
            bail!("Solver finished but did not write: {}", missing.join(", "));
        }

        Ok(report)
    }
}

fn tail(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_executable_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Mf6Runner::new("definitely-not-a-modflow-binary");
        let err = runner.run(dir.path(), &[]).unwrap_err();
        assert!(err.to_string().contains("Failed to start solver"));
    }

    #[test]
    fn termination_marker_is_detected() {
        let report = RunReport {
            stdout: vec![" Normal termination of simulation.".to_string()],
            elapsed: Duration::from_secs(1),
        };
        assert!(report.normal_termination());
    }

    #[test]
    fn tail_keeps_last_lines() {
        let lines: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        let t = tail(&lines);
        assert!(t.starts_with("10\n"));
        assert!(t.ends_with("29"));
    }
}
