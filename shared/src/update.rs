//! External rule-update tool runner.
//!
//! Rule updates are delegated to an external command (`suricata-update` by
//! default). The run is bounded by a timeout and its output is always
//! captured, so a wedged or failing update surfaces to the operator as a
//! structured result instead of a hung request or a silent retry.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io;
use tokio::process::Command;

/// Captured output of a successful update run.
#[derive(Debug, Clone)]
pub struct UpdateOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Errors from running the update tool.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The configured command does not exist on this system.
    #[error("update command not found: {0}")]
    Missing(String),

    /// The run exceeded its timeout and was terminated.
    #[error("update timed out after {0:?}")]
    TimedOut(Duration),

    /// The tool ran but exited non-zero; output is preserved for the caller.
    #[error("update exited with status {status}")]
    Failed {
        /// Exit code, `-1` when the process was killed by a signal.
        status: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// Spawning or waiting on the process failed.
    #[error("update process I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Runs the update tool and captures its output, enforcing `timeout`.
///
/// On timeout the child is killed (it is spawned with kill-on-drop) and
/// [`UpdateError::TimedOut`] is returned; a timeout is a first-class
/// failure, never an indefinite hang.
///
/// # Errors
///
/// See [`UpdateError`] for the failure taxonomy.
pub async fn run_update(
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<UpdateOutput, UpdateError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(UpdateError::Missing(program.to_string()));
        }
        Err(error) => return Err(error.into()),
    };

    tracing::info!(%program, ?timeout, "Running rule update");

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            tracing::warn!(%program, ?timeout, "Rule update timed out");
            return Err(UpdateError::TimedOut(timeout));
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if output.status.success() {
        Ok(UpdateOutput { stdout, stderr })
    } else {
        Err(UpdateError::Failed {
            status: output.status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_successful_run_captures_output() {
        let output = run_update(
            "sh",
            &sh("echo fetched 41 rules; echo no remote errors >&2"),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(output.stdout.trim(), "fetched 41 rules");
        assert_eq!(output.stderr.trim(), "no remote errors");
    }

    #[tokio::test]
    async fn test_nonzero_exit_preserves_output() {
        let error = run_update(
            "sh",
            &sh("echo partial progress; echo fetch failed >&2; exit 3"),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        match error {
            UpdateError::Failed {
                status,
                stdout,
                stderr,
            } => {
                assert_eq!(status, 3);
                assert_eq!(stdout.trim(), "partial progress");
                assert_eq!(stderr.trim(), "fetch failed");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_first_class() {
        let error = run_update("sleep", &["30".to_string()], Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(error, UpdateError::TimedOut(_)));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let error = run_update(
            "definitely-not-a-real-update-tool",
            &[],
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, UpdateError::Missing(_)));
    }
}
