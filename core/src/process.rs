//! # Process Runner
//!
//! Every external tool goes through [`ProcessRunner::run`]. The runner owns the
//! single policy for interpreting how a process ended, expressed as the closed
//! [`Outcome`] enumeration:
//!
//! * A process that outlives its deadline is killed and reported as
//!   [`Outcome::TimedOut`], whatever it printed so far.
//! * A non-zero exit with some stdout is [`Outcome::FailedWithPartialOutput`].
//!   Scanners routinely signal "nothing of note" through their exit code, so
//!   this output is still handed to the caller.
//! * A non-zero exit with empty stdout is [`Outcome::FailedNoOutput`].
//!
//! Adapters never re-derive this; they call [`ToolOutput::into_usable`].

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ToolError;

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<String>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Text written to the child's standard input before it is closed.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Value following `flag` in the argument list, if any.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|idx| self.args.get(idx + 1))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    TimedOut,
    FailedNoOutput,
    FailedWithPartialOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub outcome: Outcome,
    pub code: Option<i32>,
}

impl ToolOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            outcome: Outcome::Success,
            code: Some(0),
        }
    }

    pub fn timed_out() -> Self {
        Self {
            stdout: String::new(),
            outcome: Outcome::TimedOut,
            code: None,
        }
    }

    /// Classifies a non-zero exit by whether anything reached stdout.
    pub fn failed(code: Option<i32>, stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        let outcome = if stdout.is_empty() {
            Outcome::FailedNoOutput
        } else {
            Outcome::FailedWithPartialOutput
        };
        Self {
            stdout,
            outcome,
            code,
        }
    }

    /// Turns the outcome into stage input: success and partial output both
    /// yield the captured text, timeouts and empty failures are errors.
    pub fn into_usable(self, invocation: &Invocation) -> Result<String, ToolError> {
        match self.outcome {
            Outcome::Success => Ok(self.stdout),
            Outcome::FailedWithPartialOutput => {
                warn!(
                    program = %invocation.program,
                    code = ?self.code,
                    "{} completed with errors but returned partial results",
                    invocation.program
                );
                Ok(self.stdout)
            }
            Outcome::TimedOut => Err(ToolError::TimedOut {
                program: invocation.program.clone(),
                timeout: invocation.timeout,
            }),
            Outcome::FailedNoOutput => Err(ToolError::FailedNoOutput {
                program: invocation.program.clone(),
                code: self.code,
            }),
        }
    }
}

/// Seam between the orchestration core and the operating system.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `invocation` to completion or until its deadline.
    ///
    /// `Err` is reserved for the process never running properly (missing
    /// binary, broken pipes). Every way a started process can end is
    /// expressed through [`ToolOutput::outcome`].
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let program = invocation.program.clone();
        debug!(program = %program, args = ?invocation.args, "spawning tool");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdin_pipe = child.stdin.take();
        let mut stdout_pipe = child.stdout.take().ok_or_else(|| ToolError::Io {
            program: program.clone(),
            source: std::io::Error::other("stdout was not captured"),
        })?;
        let input = invocation.stdin.clone();

        let work = async {
            let feed = async move {
                if let (Some(mut pipe), Some(input)) = (stdin_pipe, input) {
                    // A child that exits without draining stdin closes the pipe early.
                    let _ = pipe.write_all(input.as_bytes()).await;
                    let _ = pipe.shutdown().await;
                }
            };
            let mut buf = Vec::new();
            let (_, read) = tokio::join!(feed, stdout_pipe.read_to_end(&mut buf));
            read?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, buf))
        };

        let finished = tokio::time::timeout(invocation.timeout, work).await;
        match finished {
            Err(_) => {
                warn!(program = %program, "{program} exceeded its {}s deadline, killing it", invocation.timeout.as_secs());
                let _ = child.start_kill();
                let _ = child.wait().await;
                Ok(ToolOutput::timed_out())
            }
            Ok(Err(source)) => Err(ToolError::Io { program, source }),
            Ok(Ok((status, buf))) => {
                let stdout = String::from_utf8_lossy(&buf).into_owned();
                if status.success() {
                    Ok(ToolOutput::success(stdout))
                } else {
                    Ok(ToolOutput::failed(status.code(), stdout))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn shell(script: &str, timeout: Duration) -> Invocation {
        Invocation::new("sh", timeout).args(["-c", script])
    }

    #[test]
    fn value_of_returns_flag_argument() {
        let inv = Invocation::new("nuclei", Duration::from_secs(1)).args(["-u", "http://a", "-rl", "10"]);
        assert_eq!(inv.value_of("-rl"), Some("10"));
        assert_eq!(inv.value_of("-tags"), None);
    }

    #[test]
    fn failed_output_is_classified_by_content() {
        assert_eq!(ToolOutput::failed(Some(1), "").outcome, Outcome::FailedNoOutput);
        assert_eq!(ToolOutput::failed(Some(1), "x").outcome, Outcome::FailedWithPartialOutput);
    }

    #[test]
    fn partial_output_is_usable_but_timeout_is_not() {
        let inv = Invocation::new("arjun", Duration::from_secs(1));
        assert_eq!(ToolOutput::failed(Some(1), "id\n").into_usable(&inv).unwrap(), "id\n");
        assert!(matches!(
            ToolOutput::timed_out().into_usable(&inv),
            Err(ToolError::TimedOut { .. })
        ));
        assert!(matches!(
            ToolOutput::failed(Some(2), "").into_usable(&inv),
            Err(ToolError::FailedNoOutput { code: Some(2), .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_on_success() {
        let out = SystemRunner.run(&shell("echo hello", Duration::from_secs(5))).await.unwrap();
        assert_eq!(out.outcome, Outcome::Success);
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn feeds_stdin_to_the_child() {
        let inv = Invocation::new("cat", Duration::from_secs(5)).stdin("a.example.com\nb.example.com");
        let out = SystemRunner.run(&inv).await.unwrap();
        assert_eq!(out.stdout, "a.example.com\nb.example.com");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_keeps_partial_output() {
        let out = SystemRunner
            .run(&shell("echo partial; exit 3", Duration::from_secs(5)))
            .await
            .unwrap();
        assert_eq!(out.outcome, Outcome::FailedWithPartialOutput);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "partial");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_without_output() {
        let out = SystemRunner.run(&shell("exit 2", Duration::from_secs(5))).await.unwrap();
        assert_eq!(out.outcome, Outcome::FailedNoOutput);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_process_is_killed_at_deadline() {
        let started = Instant::now();
        let out = SystemRunner
            .run(&Invocation::new("sleep", Duration::from_millis(200)).arg("10"))
            .await
            .unwrap();
        assert_eq!(out.outcome, Outcome::TimedOut);
        assert!(out.stdout.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let inv = Invocation::new("crowscout-definitely-missing-binary", Duration::from_secs(1));
        assert!(matches!(SystemRunner.run(&inv).await, Err(ToolError::Spawn { .. })));
    }
}
