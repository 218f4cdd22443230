//! Lightweight manifest readers
//!
//! Only the fields needed for framework detection and port lookup are
//! parsed. An unreadable or malformed manifest reads as `None`.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::types::{FunnelError, Result};

/// The parts of `package.json` that matter here
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeManifest {
    pub scripts: BTreeMap<String, Value>,
    pub dependencies: BTreeMap<String, Value>,
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, Value>,
}

impl NodeManifest {
    pub fn parse(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read a manifest from disk; failures are logged and yield `None`
    pub fn read(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                debug!("Cannot read {}: {}", path.display(), e);
                return None;
            }
        };

        match Self::parse(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                debug!("Ignoring malformed {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn script(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).and_then(|v| v.as_str())
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

/// Dependency names declared by a Python project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PythonManifest {
    pub dependencies: Vec<String>,
}

impl PythonManifest {
    /// Collect dependencies from `pyproject.toml` and `requirements.txt`, if present
    pub fn read(dir: &Path) -> Option<Self> {
        use crate::constants::files::{PYPROJECT, REQUIREMENTS};

        let mut dependencies = Vec::new();
        let mut found = false;

        let pyproject = dir.join(PYPROJECT);
        if pyproject.is_file() {
            found = true;
            match Self::read_pyproject(&pyproject) {
                Ok(deps) => dependencies.extend(deps),
                Err(e) => debug!("Ignoring malformed {}: {}", pyproject.display(), e),
            }
        }

        let requirements = dir.join(REQUIREMENTS);
        if let Ok(content) = fs::read_to_string(&requirements) {
            found = true;
            dependencies.extend(Self::parse_requirements(&content));
        }

        found.then_some(Self { dependencies })
    }

    fn read_pyproject(path: &Path) -> Result<Vec<String>> {
        let content = fs::read_to_string(path)?;
        Self::parse_pyproject(&content).map_err(|e| FunnelError::parse(path, e.to_string()))
    }

    /// `project.dependencies` entries and `tool.poetry.dependencies` keys
    pub fn parse_pyproject(content: &str) -> std::result::Result<Vec<String>, toml::de::Error> {
        let doc: toml::Table = toml::from_str(content)?;
        let mut deps = Vec::new();

        if let Some(list) = doc
            .get("project")
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_array())
        {
            deps.extend(
                list.iter()
                    .filter_map(|v| v.as_str())
                    .map(dependency_name),
            );
        }

        if let Some(table) = doc
            .get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            deps.extend(table.keys().map(|k| dependency_name(k)));
        }

        Ok(deps)
    }

    pub fn parse_requirements(content: &str) -> Vec<String> {
        content
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty() && !line.starts_with('-'))
            .map(dependency_name)
            .collect()
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }
}

/// Normalized package name of a requirement spec (`FastAPI[all]>=0.1` → `fastapi`)
fn dependency_name(spec: &str) -> String {
    spec.trim()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect::<String>()
        .to_lowercase()
        .replace('_', "-")
}
