use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};

mod error;

pub use error::ExecError;

/// Default wall-clock deadline for a single command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Captured outcome of one bounded command execution
///
/// A deadline expiry (`timed_out`) and an unsuccessful execution
/// (`exec_failed`) are reported as separate fields, so a command that exits
/// cleanly without producing output is distinguishable from one that hung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Combined stdout and stderr, possibly partial if the deadline fired
    pub text: String,
    /// The deadline elapsed and the child was forcibly terminated
    pub timed_out: bool,
    /// The child could not be spawned or exited unsuccessfully
    pub exec_failed: bool,
}

impl CommandOutput {
    /// True when the command neither timed out nor failed to produce output.
    ///
    /// A failed exit that still captured text (e.g. a pipeline whose filter
    /// matched nothing) is left for the caller to interpret.
    pub fn is_failure(&self) -> bool {
        self.timed_out || (self.exec_failed && self.text.trim().is_empty())
    }

    fn spawn_failed() -> Self {
        Self {
            text: String::new(),
            timed_out: false,
            exec_failed: true,
        }
    }
}

/// Runs shell commands with a wall-clock deadline, incremental output
/// draining, and guaranteed child reaping on every exit path.
pub struct CommandRunner {
    timeout: Duration,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with a custom default deadline
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `command` through the shell under the runner's default deadline
    pub async fn run(&self, command: &str) -> CommandOutput {
        self.run_with_timeout(command, self.timeout).await
    }

    /// Run `command` through the shell, forcing termination once `timeout`
    /// elapses. Never returns an error: a spawn failure degrades to a
    /// `CommandOutput` with the execution-failed marker set.
    pub async fn run_with_timeout(&self, command: &str, timeout: Duration) -> CommandOutput {
        match run_bounded(command, timeout).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Command `{}` could not be executed: {}", command, e);
                CommandOutput::spawn_failed()
            }
        }
    }
}

async fn run_bounded(command: &str, timeout: Duration) -> Result<CommandOutput, ExecError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // Backstop only; both exit paths below reap explicitly.
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExecError::Spawn {
            command: command.to_string(),
            source,
        })?;

    // The buffer lives outside the bounded future so partial output
    // survives a deadline expiry.
    let mut captured = Vec::new();

    // Drain and reap both count against the deadline: a child that closes
    // its pipes but keeps running still cannot block the caller.
    let bounded = tokio::time::timeout(timeout, async {
        drain(&mut child, &mut captured).await?;
        child.wait().await.map_err(ExecError::Reap)
    })
    .await;

    match bounded {
        Ok(Ok(status)) => Ok(CommandOutput {
            text: String::from_utf8_lossy(&captured).into_owned(),
            timed_out: false,
            exec_failed: !status.success(),
        }),
        Ok(Err(e)) => {
            // Failure mid-drain: terminate and reap before surfacing it.
            let _ = child.kill().await;
            Err(e)
        }
        Err(_elapsed) => {
            tracing::debug!("Command `{}` exceeded its {:?} deadline", command, timeout);
            child.kill().await.map_err(ExecError::Reap)?;
            Ok(CommandOutput {
                text: String::from_utf8_lossy(&captured).into_owned(),
                timed_out: true,
                exec_failed: false,
            })
        }
    }
}

/// Read both output pipes incrementally until EOF, appending chunks in
/// arrival order. Draining as the child writes avoids the deadlock where a
/// child fills its pipe buffer before exiting.
async fn drain(child: &mut Child, captured: &mut Vec<u8>) -> Result<(), ExecError> {
    let mut stdout = child.stdout.take().ok_or(ExecError::Capture)?;
    let mut stderr = child.stderr.take().ok_or(ExecError::Capture)?;

    let mut out_buf = [0u8; 4096];
    let mut err_buf = [0u8; 4096];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => {
                let n = read.map_err(ExecError::Read)?;
                if n == 0 {
                    out_open = false;
                } else {
                    captured.extend_from_slice(&out_buf[..n]);
                }
            }
            read = stderr.read(&mut err_buf), if err_open => {
                let n = read.map_err(ExecError::Read)?;
                if n == 0 {
                    err_open = false;
                } else {
                    captured.extend_from_slice(&err_buf[..n]);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let runner = CommandRunner::new();
        let output = runner.run("echo hello").await;

        assert_eq!(output.text.trim(), "hello");
        assert!(!output.timed_out);
        assert!(!output.exec_failed);
    }

    #[tokio::test]
    async fn test_captures_stderr() {
        let runner = CommandRunner::new();
        let output = runner.run("echo oops >&2").await;

        assert_eq!(output.text.trim(), "oops");
        assert!(!output.exec_failed);
    }

    #[tokio::test]
    async fn test_empty_output_success_is_not_a_failure() {
        let runner = CommandRunner::new();
        let output = runner.run("true").await;

        assert!(output.text.is_empty());
        assert!(!output.timed_out);
        assert!(!output.exec_failed);
        assert!(!output.is_failure());
    }

    #[tokio::test]
    async fn test_nonzero_exit_without_output() {
        let runner = CommandRunner::new();
        let output = runner.run("exit 3").await;

        assert!(output.text.is_empty());
        assert!(!output.timed_out);
        assert!(output.exec_failed);
        assert!(output.is_failure());
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_output_is_usable() {
        let runner = CommandRunner::new();
        let output = runner.run("echo partial; exit 1").await;

        assert_eq!(output.text.trim(), "partial");
        assert!(output.exec_failed);
        assert!(!output.is_failure());
    }

    #[tokio::test]
    async fn test_deadline_terminates_hanging_child() {
        let runner = CommandRunner::new();
        let started = std::time::Instant::now();
        let output = runner
            .run_with_timeout("sleep 5", Duration::from_millis(200))
            .await;

        assert!(output.timed_out);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_partial_output_survives_deadline() {
        let runner = CommandRunner::new();
        let output = runner
            .run_with_timeout("echo started; sleep 5", Duration::from_millis(300))
            .await;

        assert!(output.timed_out);
        assert_eq!(output.text.trim(), "started");
    }

    #[tokio::test]
    async fn test_large_output_does_not_deadlock() {
        // Well past the 64KiB pipe buffer; completes only if drained
        // while the child is still writing.
        let runner = CommandRunner::new();
        let output = runner.run("head -c 262144 /dev/zero").await;

        assert!(!output.timed_out);
        assert!(!output.exec_failed);
        assert_eq!(output.text.len(), 262144);
    }

    #[tokio::test]
    async fn test_runner_reusable_after_timeout() {
        let runner = CommandRunner::new();
        let _ = runner
            .run_with_timeout("sleep 5", Duration::from_millis(100))
            .await;
        let output = runner.run("echo again").await;

        assert_eq!(output.text.trim(), "again");
    }
}
