//! Port extraction
//!
//! Walks a project's config files in priority order and returns the first
//! explicit port override. Lookups are best-effort: a malformed file or an
//! out-of-range value reads as "not found" and the next file is tried.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use super::manifest::NodeManifest;
use crate::constants::files::{ENV_FILE, ENV_PORT_KEYS, PACKAGE_JSON, PORT_SCRIPTS};
use crate::types::{
    ConfigFile, ConfigFileKind, DeclaredPort, Family, FrameworkKind, parse_port,
};

static PORT_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--port[=\s]+(\d+)").expect("valid regex"));

static SHORT_PORT_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)-p\s+(\d+)").expect("valid regex"));

/// Config files consulted for a framework, highest priority first.
///
/// The environment file is always listed, present or not, because it is
/// where a new port declaration gets added.
pub fn candidate_config_files(dir: &Path, framework: FrameworkKind) -> Vec<ConfigFile> {
    let mut files = vec![ConfigFile::new(dir.join(ENV_FILE), ConfigFileKind::DotEnv)];

    if framework.family() == Some(Family::Node) {
        let manifest = dir.join(PACKAGE_JSON);
        if manifest.is_file() {
            files.push(ConfigFile::new(manifest, ConfigFileKind::PackageJson));
        }
    }

    files
}

/// First explicit port declared across `files`
pub fn find_declared_port(files: &[ConfigFile]) -> Option<DeclaredPort> {
    files.iter().find_map(|file| {
        let found = match file.kind {
            ConfigFileKind::DotEnv => port_from_env_file(&file.path),
            ConfigFileKind::PackageJson => port_from_manifest_file(&file.path),
        };

        found.map(|(port, key)| DeclaredPort {
            port,
            file: file.clone(),
            key,
        })
    })
}

/// Effective port for a framework plus the declaration it came from, if any
pub fn extract_port(
    files: &[ConfigFile],
    framework: FrameworkKind,
) -> (Option<u16>, Option<DeclaredPort>) {
    match find_declared_port(files) {
        Some(declared) => (Some(declared.port), Some(declared)),
        None => (framework.default_port(), None),
    }
}

fn port_from_env_file(path: &Path) -> Option<(u16, String)> {
    if !path.is_file() {
        return None;
    }

    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            debug!("Cannot read {}: {}", path.display(), e);
            return None;
        }
    };

    let mut vars = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                vars.entry(key).or_insert(value);
            }
            Err(e) => {
                debug!("Ignoring malformed {}: {}", path.display(), e);
                return None;
            }
        }
    }

    port_from_env_vars(&vars)
}

/// First port-like key with a valid value
pub fn port_from_env_vars(vars: &HashMap<String, String>) -> Option<(u16, String)> {
    ENV_PORT_KEYS.iter().find_map(|key| {
        vars.get(*key)
            .and_then(|v| parse_port(v))
            .map(|port| (port, key.to_string()))
    })
}

fn port_from_manifest_file(path: &Path) -> Option<(u16, String)> {
    NodeManifest::read(path).and_then(|m| port_from_manifest(&m))
}

/// Port flag passed to the dev/start/serve script
pub fn port_from_manifest(manifest: &NodeManifest) -> Option<(u16, String)> {
    PORT_SCRIPTS.iter().find_map(|name| {
        manifest
            .script(name)
            .and_then(port_from_script)
            .map(|port| (port, format!("scripts.{}", name)))
    })
}

/// Port given by `--port N`, `--port=N` or `-p N` in a command line
pub fn port_from_script(script: &str) -> Option<u16> {
    [&*PORT_FLAG, &*SHORT_PORT_FLAG].iter().find_map(|re| {
        re.captures(script)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_port(m.as_str()))
    })
}

/// Byte range of the port number inside a script, for in-place edits
pub fn port_span_in_script(script: &str) -> Option<std::ops::Range<usize>> {
    [&*PORT_FLAG, &*SHORT_PORT_FLAG].iter().find_map(|re| {
        re.captures(script)
            .and_then(|c| c.get(1))
            .filter(|m| parse_port(m.as_str()).is_some())
            .map(|m| m.range())
    })
}
