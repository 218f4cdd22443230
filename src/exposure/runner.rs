//! Process runner
//!
//! The one place that spawns external programs. Everything above it talks to
//! the `CommandRunner` trait so tests can substitute a recording fake.

use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::types::{FunnelError, Result};

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code; `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Short status such as `exit 1`
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit {}", code),
            None => "killed by signal".to_string(),
        }
    }

    /// Most useful diagnostic text, stderr first
    pub fn message(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Runs real processes with a per-invocation timeout
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let invocation = format!("{} {}", program, args.join(" "));
        debug!("Running {}", invocation);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FunnelError::ToolNotFound {
                tool: program.to_string(),
            },
            _ => FunnelError::tool(program, format!("failed to spawn: {}", e)),
        })?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| FunnelError::timeout(invocation.clone(), self.timeout))??;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        debug!("{} finished: {}", invocation, result.status_label());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefers_stderr() {
        let mut out = CommandOutput::failed(1, "  funnel not enabled\n");
        out.stdout = "usage".to_string();
        assert_eq!(out.message(), "funnel not enabled");
        assert_eq!(out.status_label(), "exit 1");

        assert_eq!(CommandOutput::ok("done\n").message(), "done");
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let runner = SystemRunner::new(Duration::from_secs(5));
        let result = runner
            .run("ts-funnel-definitely-not-installed", &["status".to_string()])
            .await;
        assert!(matches!(result, Err(FunnelError::ToolNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_output() {
        let runner = SystemRunner::new(Duration::from_secs(5));
        let out = runner
            .run("sh", &["-c".to_string(), "echo hi; exit 3".to_string()])
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, "hi\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let runner = SystemRunner::new(Duration::from_millis(100));
        let result = runner.run("sleep", &["5".to_string()]).await;
        assert!(matches!(result, Err(FunnelError::Timeout { .. })));
    }
}
