use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::types::ExposureMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ExposureOutcome {
    /// Tool accepted the port; `url` is known once the domain is
    Exposed { url: Option<String> },
    /// Tool rejected the port or could not be run
    Failed { status: String, message: String },
    /// Dry run: nothing invoked
    Planned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExposureEntry {
    pub port: u16,
    /// Projects served on this port
    pub projects: Vec<PathBuf>,
    pub outcome: ExposureOutcome,
}

/// One entry per unique port, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExposureReport {
    pub mode: ExposureMode,
    pub entries: Vec<ExposureEntry>,
}

impl ExposureReport {
    pub fn failures(&self) -> impl Iterator<Item = &ExposureEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, ExposureOutcome::Failed { .. }))
    }

    pub fn exposed_urls(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match &e.outcome {
                ExposureOutcome::Exposed { url } => url.as_deref(),
                _ => None,
            })
            .collect()
    }
}

/// `https://<domain>:<port>/`
pub fn public_url(domain: &str, port: u16) -> String {
    format!("https://{}:{}/", domain, port)
}

impl fmt::Display for ExposureEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ExposureOutcome::Exposed { url: Some(url) } => write!(f, "{}  {}", self.port, url),
            ExposureOutcome::Exposed { url: None } => write!(f, "{}  exposed", self.port),
            ExposureOutcome::Failed { status, message } => {
                write!(f, "{}  failed ({}): {}", self.port, status, message)
            }
            ExposureOutcome::Planned => write!(f, "{}  dry-run", self.port),
        }
    }
}
