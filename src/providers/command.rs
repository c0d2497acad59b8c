//! Subprocess execution shared by every CLI adapter

use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::GenerationError;

/// How to launch one agent binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliSettings {
    /// Executable name or path
    pub binary: String,
    /// Kill the agent and fail the call after this long
    pub timeout: Option<Duration>,
}

impl CliSettings {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Run `settings.binary` with `args`, wait for it to exit and return its stdout.
///
/// The child is killed when the returned future is dropped, so a request that
/// goes away takes its agent process with it.
///
/// # Errors
/// * `ExecutionFailed` with the OS error text if the process cannot be spawned
/// * `ExecutionFailed` with captured stderr if it exits with a nonzero status
/// * `ExecutionFailed` with `"timed out after <duration>"` if the timeout elapses
pub async fn run_cli(settings: &CliSettings, args: &[String]) -> Result<Vec<u8>, GenerationError> {
    let mut cmd = Command::new(&settings.binary);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| GenerationError::ExecutionFailed {
        stderr: format!("failed to spawn '{}': {}", settings.binary, e),
    })?;

    tracing::debug!(binary = %settings.binary, pid = ?child.id(), "Spawned agent process");

    let waited = match settings.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_) => {
                return Err(GenerationError::ExecutionFailed {
                    stderr: format!("timed out after {:?}", limit),
                });
            }
        },
        None => child.wait_with_output().await,
    };

    let output = waited.map_err(|e| GenerationError::ExecutionFailed {
        stderr: format!("failed to collect output from '{}': {}", settings.binary, e),
    })?;

    if !output.status.success() {
        tracing::debug!(
            binary = %settings.binary,
            status = ?output.status.code(),
            stderr_len = output.stderr.len(),
            "Agent process exited unsuccessfully"
        );
        return Err(GenerationError::ExecutionFailed {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    tracing::debug!(
        binary = %settings.binary,
        stdout_len = output.stdout.len(),
        "Agent process finished"
    );

    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let out = run_cli(&CliSettings::new("sh"), &sh("printf hello")).await.unwrap();
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn test_stderr_kept_separate() {
        let out = run_cli(&CliSettings::new("sh"), &sh("echo noise >&2; printf answer"))
            .await
            .unwrap();
        assert_eq!(out, b"answer");
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let err = run_cli(&CliSettings::new("sh"), &sh("printf 'quota exceeded' >&2; exit 3"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::ExecutionFailed {
                stderr: "quota exceeded".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_execution_failure() {
        let settings = CliSettings::new("/nonexistent/agent-binary");
        let err = run_cli(&settings, &[]).await.unwrap_err();
        match err {
            GenerationError::ExecutionFailed { stderr } => {
                assert!(stderr.contains("/nonexistent/agent-binary"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let settings = CliSettings::new("sh").with_timeout(Some(Duration::from_millis(200)));
        let started = std::time::Instant::now();
        let err = run_cli(&settings, &sh("sleep 5")).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(
            err,
            GenerationError::ExecutionFailed {
                stderr: "timed out after 200ms".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_args_passed_verbatim() {
        let args = vec![
            "%s|%s".to_string(),
            "a b".to_string(),
            "line1\n\nline2".to_string(),
        ];
        let out = run_cli(&CliSettings::new("printf"), &args).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a b|line1\n\nline2");
    }
}
