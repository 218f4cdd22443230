//! Rewrite report
//!
//! Describes every config edit, real or simulated. A dry run and a real run
//! produce the same entries; only `outcome` differs.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum Outcome {
    /// File written
    Applied,
    /// Dry run: would have been written
    Planned,
    /// Already in the desired state
    Unchanged,
    /// File could not be edited; other entries still processed
    Failed(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied => write!(f, "applied"),
            Outcome::Planned => write!(f, "dry-run"),
            Outcome::Unchanged => write!(f, "unchanged"),
            Outcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteEntry {
    pub project: PathBuf,
    pub file: PathBuf,
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: String,
    pub outcome: Outcome,
}

impl RewriteEntry {
    /// The edit itself, without its outcome
    pub fn change(&self) -> (&PathBuf, &str, Option<&str>, &str) {
        (
            &self.file,
            self.key.as_str(),
            self.old_value.as_deref(),
            self.new_value.as_str(),
        )
    }
}

impl fmt::Display for RewriteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {}: {} -> {}  [{}]",
            self.project.display(),
            self.file.display(),
            self.key,
            self.old_value.as_deref().unwrap_or("(none)"),
            self.new_value,
            self.outcome
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub entries: Vec<RewriteEntry>,
}

impl RewriteReport {
    pub fn push(&mut self, entry: RewriteEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, other: RewriteReport) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &RewriteEntry> {
        self.entries.iter().filter(|e| e.outcome.is_failure())
    }

    pub fn count(&self, outcome: &Outcome) -> usize {
        self.entries.iter().filter(|e| &e.outcome == outcome).count()
    }
}

impl fmt::Display for RewriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
