//! Tailscale driver
//!
//! Maps exposure requests onto `tailscale` subcommands. Invocations are
//! issued one at a time, in ascending port order.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::report::{ExposureEntry, ExposureOutcome, ExposureReport, public_url};
use super::runner::{CommandOutput, CommandRunner};
use crate::constants::exposure::{LOCAL_HOST, STOPPED_MARKER};
use crate::types::{ExposureMode, FunnelError, ReconciliationPlan, Result};

#[derive(Debug, Deserialize)]
struct StatusJson {
    #[serde(rename = "Self")]
    self_node: Option<SelfNode>,
}

#[derive(Debug, Deserialize)]
struct SelfNode {
    #[serde(rename = "DNSName", default)]
    dns_name: String,
}

pub struct Tailscale<R> {
    binary: String,
    runner: R,
}

impl<R: CommandRunner> Tailscale<R> {
    pub fn new(binary: impl Into<String>, runner: R) -> Self {
        Self {
            binary: binary.into(),
            runner,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner.run(&self.binary, &args).await
    }

    async fn run_checked(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(args).await?;
        if output.success {
            Ok(output)
        } else {
            Err(FunnelError::tool(
                &self.binary,
                format!("{} ({})", output.message(), output.status_label()),
            ))
        }
    }

    /// Whether the daemon is up and logged in
    pub async fn is_running(&self) -> Result<bool> {
        let output = self.run(&["status"]).await?;
        let stopped =
            output.stdout.contains(STOPPED_MARKER) || output.stderr.contains(STOPPED_MARKER);
        Ok(output.success && !stopped)
    }

    /// This machine's MagicDNS name, without the trailing dot
    pub async fn domain(&self) -> Result<String> {
        let output = self.run_checked(&["status", "--json"]).await?;
        let status: StatusJson = serde_json::from_str(&output.stdout)?;

        let domain = status
            .self_node
            .map(|node| node.dns_name.trim_end_matches('.').to_string())
            .unwrap_or_default();

        if domain.is_empty() {
            return Err(FunnelError::tool(&self.binary, "status reports no DNS name"));
        }
        Ok(domain)
    }

    pub fn expose_args(port: u16, mode: ExposureMode) -> Vec<String> {
        match mode {
            ExposureMode::Funnel => vec![
                "funnel".to_string(),
                format!("--https={}", port),
                "--bg".to_string(),
                port.to_string(),
            ],
            ExposureMode::Serve => vec![
                "serve".to_string(),
                "--bg".to_string(),
                format!("--https={}", port),
                format!("http://{}:{}", LOCAL_HOST, port),
            ],
        }
    }

    pub async fn expose(&self, port: u16, mode: ExposureMode) -> Result<CommandOutput> {
        let args = Self::expose_args(port, mode);
        self.runner.run(&self.binary, &args).await
    }

    /// Remove every serve and funnel configuration
    pub async fn reset(&self) -> Result<()> {
        self.run_checked(&["serve", "reset"]).await?;
        info!("Reset all serve/funnel configuration");
        Ok(())
    }

    pub async fn status_text(&self) -> Result<String> {
        let output = self.run_checked(&["funnel", "status"]).await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Expose each unique final port of `plan` in the plan's mode, ascending.
    ///
    /// A failure on one port is recorded and the remaining ports are still
    /// attempted. With `dry_run` nothing is invoked.
    pub async fn expose_all(
        &self,
        plan: &ReconciliationPlan,
        domain: Option<&str>,
        dry_run: bool,
    ) -> ExposureReport {
        let mode = plan.mode;
        let mut by_port: BTreeMap<u16, Vec<PathBuf>> = BTreeMap::new();
        for (project, port) in plan.final_ports() {
            by_port.entry(*port).or_default().push(project.clone());
        }

        let mut report = ExposureReport {
            mode,
            entries: Vec::with_capacity(by_port.len()),
        };

        for (port, projects) in by_port {
            let outcome = if dry_run {
                ExposureOutcome::Planned
            } else {
                self.expose_one(port, mode, domain).await
            };
            report.entries.push(ExposureEntry {
                port,
                projects,
                outcome,
            });
        }

        report
    }

    async fn expose_one(&self, port: u16, mode: ExposureMode, domain: Option<&str>) -> ExposureOutcome {
        match self.expose(port, mode).await {
            Ok(output) if output.success => {
                debug!("Exposed port {} via {}", port, mode);
                ExposureOutcome::Exposed {
                    url: domain.map(|d| public_url(d, port)),
                }
            }
            Ok(output) => {
                warn!("{} {} failed for port {}: {}", self.binary, mode, port, output.message());
                ExposureOutcome::Failed {
                    status: output.status_label(),
                    message: output.message(),
                }
            }
            Err(e) => {
                warn!("{} {} failed for port {}: {}", self.binary, mode, port, e);
                ExposureOutcome::Failed {
                    status: "error".to_string(),
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Replays canned output keyed by the joined argument list and records calls
    #[derive(Default)]
    struct RecordingRunner {
        responses: HashMap<String, CommandOutput>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingRunner {
        fn respond(mut self, args: &str, output: CommandOutput) -> Self {
            self.responses.insert(args.to_string(), output);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
            assert_eq!(program, "tailscale");
            let key = args.join(" ");
            self.calls.lock().unwrap().push(key.clone());
            Ok(self
                .responses
                .get(&key)
                .cloned()
                .unwrap_or_else(|| CommandOutput::ok("")))
        }
    }

    fn driver(runner: RecordingRunner) -> Tailscale<RecordingRunner> {
        Tailscale::new("tailscale", runner)
    }

    fn plan(entries: &[(&str, u16)], mode: ExposureMode) -> ReconciliationPlan {
        let ports = entries.iter().map(|(p, port)| (PathBuf::from(p), *port)).collect();
        ReconciliationPlan::exposing(ports).with_mode(mode)
    }

    #[tokio::test]
    async fn test_is_running() {
        let up = driver(RecordingRunner::default().respond("status", CommandOutput::ok("100.64.0.1 box")));
        assert!(up.is_running().await.unwrap());

        let stopped = driver(
            RecordingRunner::default().respond("status", CommandOutput::failed(1, "Tailscale is stopped.")),
        );
        assert!(!stopped.is_running().await.unwrap());
    }

    #[tokio::test]
    async fn test_domain_strips_trailing_dot() {
        let json = r#"{"BackendState":"Running","Self":{"DNSName":"box.tail1234.ts.net.","HostName":"box"}}"#;
        let ts = driver(RecordingRunner::default().respond("status --json", CommandOutput::ok(json)));
        assert_eq!(ts.domain().await.unwrap(), "box.tail1234.ts.net");
    }

    #[tokio::test]
    async fn test_domain_missing() {
        let ts = driver(RecordingRunner::default().respond("status --json", CommandOutput::ok("{}")));
        assert!(ts.domain().await.unwrap_err().is_tool_error());
    }

    #[test]
    fn test_expose_args() {
        assert_eq!(
            Tailscale::<RecordingRunner>::expose_args(3000, ExposureMode::Funnel).join(" "),
            "funnel --https=3000 --bg 3000"
        );
        assert_eq!(
            Tailscale::<RecordingRunner>::expose_args(8000, ExposureMode::Serve).join(" "),
            "serve --bg --https=8000 http://127.0.0.1:8000"
        );
    }

    #[tokio::test]
    async fn test_expose_all_ascending_and_continues_after_failure() {
        let runner = RecordingRunner::default().respond(
            "funnel --https=5173 --bg 5173",
            CommandOutput::failed(1, "Funnel not available on port 5173"),
        );
        let ts = driver(runner);
        let final_ports = plan(
            &[("/p/web", 5173), ("/p/api", 8000), ("/p/app", 3000), ("/p/dup", 3000)],
            ExposureMode::Funnel,
        );

        let report = ts
            .expose_all(&final_ports, Some("box.ts.net"), false)
            .await;

        let exposed: Vec<u16> = report.entries.iter().map(|e| e.port).collect();
        assert_eq!(exposed, vec![3000, 5173, 8000]);
        assert_eq!(
            ts.runner.calls(),
            vec![
                "funnel --https=3000 --bg 3000",
                "funnel --https=5173 --bg 5173",
                "funnel --https=8000 --bg 8000",
            ]
        );
        assert_eq!(report.entries[0].projects.len(), 2);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(
            report.exposed_urls(),
            vec!["https://box.ts.net:3000/", "https://box.ts.net:8000/"]
        );
        match &report.entries[1].outcome {
            ExposureOutcome::Failed { status, message } => {
                assert_eq!(status, "exit 1");
                assert!(message.contains("5173"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dry_run_invokes_nothing() {
        let ts = driver(RecordingRunner::default());
        let report = ts
            .expose_all(&plan(&[("/p/a", 3000)], ExposureMode::Serve), None, true)
            .await;

        assert!(ts.runner.calls().is_empty());
        assert_eq!(report.mode, ExposureMode::Serve);
        assert_eq!(report.entries[0].outcome, ExposureOutcome::Planned);
    }

    #[tokio::test]
    async fn test_reset_failure() {
        let ts = driver(RecordingRunner::default().respond("serve reset", CommandOutput::failed(2, "denied")));
        let err = ts.reset().await.unwrap_err();
        assert!(err.to_string().contains("denied"));
    }
}
