//! Framework marker rules
//!
//! An ordered table of (marker, framework) pairs evaluated top to bottom.
//! More specific markers come first: config files named after a framework
//! beat script heuristics, which beat plain dependency lookups. The first
//! matching rule wins; no match classifies the directory as `Unknown`.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use super::manifest::{NodeManifest, PythonManifest};
use crate::constants::files::{MARKER_SCRIPTS, PACKAGE_JSON};
use crate::types::FrameworkKind;

/// What a directory looks like to the marker rules
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    /// Immediate child file and directory names
    pub entries: BTreeSet<String>,
    pub node: Option<NodeManifest>,
    pub python: Option<PythonManifest>,
}

impl DirectoryListing {
    pub fn read(dir: &Path) -> io::Result<Self> {
        let entries: BTreeSet<String> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();

        let node = if entries.contains(PACKAGE_JSON) {
            NodeManifest::read(&dir.join(PACKAGE_JSON))
        } else {
            None
        };

        let python = PythonManifest::read(dir);

        Ok(Self {
            entries,
            node,
            python,
        })
    }

    /// Build a listing from bare file names
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_node(mut self, manifest: NodeManifest) -> Self {
        self.node = Some(manifest);
        self
    }

    pub fn with_python(mut self, manifest: PythonManifest) -> Self {
        self.python = Some(manifest);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Concatenated `dev` and `start` scripts
    fn marker_scripts(&self) -> String {
        self.node
            .as_ref()
            .map(|m| {
                MARKER_SCRIPTS
                    .iter()
                    .filter_map(|s| m.script(s))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Marker {
    /// Any of these names is present in the directory
    AnyFile(&'static [&'static str]),
    /// The dev/start script mentions this command
    Script(&'static str),
    /// package.json depends on this package
    NodeDependency(&'static str),
    /// pyproject.toml or requirements.txt depends on this package
    PythonDependency(&'static str),
}

impl Marker {
    fn matches(&self, listing: &DirectoryListing) -> bool {
        match self {
            Marker::AnyFile(names) => names.iter().any(|n| listing.has(n)),
            Marker::Script(needle) => listing.marker_scripts().contains(needle),
            Marker::NodeDependency(name) => listing
                .node
                .as_ref()
                .is_some_and(|m| m.has_dependency(name)),
            Marker::PythonDependency(name) => listing
                .python
                .as_ref()
                .is_some_and(|m| m.has_dependency(name)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    pub marker: Marker,
    pub framework: FrameworkKind,
}

const fn rule(marker: Marker, framework: FrameworkKind) -> MarkerRule {
    MarkerRule { marker, framework }
}

/// Detection rules in priority order
pub const RULES: &[MarkerRule] = &[
    rule(
        Marker::AnyFile(&["nuxt.config.ts", "nuxt.config.js", "nuxt.config.mjs"]),
        FrameworkKind::Nuxt,
    ),
    rule(
        Marker::AnyFile(&["next.config.js", "next.config.mjs", "next.config.ts"]),
        FrameworkKind::NextJs,
    ),
    rule(
        Marker::AnyFile(&["vite.config.ts", "vite.config.js", "vite.config.mjs"]),
        FrameworkKind::Vite,
    ),
    rule(Marker::AnyFile(&["angular.json"]), FrameworkKind::Angular),
    rule(Marker::AnyFile(&["vue.config.js"]), FrameworkKind::VueCli),
    rule(Marker::AnyFile(&["manage.py"]), FrameworkKind::Django),
    rule(Marker::AnyFile(&["nest-cli.json"]), FrameworkKind::NestJs),
    rule(Marker::Script("react-scripts"), FrameworkKind::Cra),
    rule(Marker::Script("nuxt"), FrameworkKind::Nuxt),
    rule(Marker::Script("next"), FrameworkKind::NextJs),
    rule(Marker::Script("vite"), FrameworkKind::Vite),
    rule(Marker::PythonDependency("fastapi"), FrameworkKind::FastApi),
    rule(Marker::PythonDependency("flask"), FrameworkKind::Flask),
    rule(Marker::NodeDependency("express"), FrameworkKind::Express),
];

/// Classify a directory by the first matching rule
pub fn classify(listing: &DirectoryListing) -> FrameworkKind {
    RULES
        .iter()
        .find(|r| r.marker.matches(listing))
        .map(|r| r.framework)
        .unwrap_or(FrameworkKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(json: &str) -> NodeManifest {
        NodeManifest::parse(json).unwrap()
    }

    #[test]
    fn test_manage_py_is_django() {
        let listing = DirectoryListing::from_names(["manage.py"]);
        assert_eq!(classify(&listing), FrameworkKind::Django);
    }

    #[test]
    fn test_empty_listing_is_unknown() {
        let listing = DirectoryListing::from_names(["README.md", "src"]);
        assert_eq!(classify(&listing), FrameworkKind::Unknown);
    }

    #[test]
    fn test_config_file_beats_dependency() {
        // Nuxt projects pull in generic server deps; the config file decides
        let listing = DirectoryListing::from_names(["nuxt.config.ts", "package.json"])
            .with_node(node(r#"{"dependencies": {"express": "^4"}}"#));
        assert_eq!(classify(&listing), FrameworkKind::Nuxt);
    }

    #[test]
    fn test_nest_cli_beats_express() {
        let listing = DirectoryListing::from_names(["nest-cli.json", "package.json"])
            .with_node(node(
                r#"{"scripts": {"start": "nest start"}, "dependencies": {"express": "^4"}}"#,
            ));
        assert_eq!(classify(&listing), FrameworkKind::NestJs);
    }

    #[test]
    fn test_script_markers() {
        let cra = DirectoryListing::from_names(["package.json"])
            .with_node(node(r#"{"scripts": {"start": "react-scripts start"}}"#));
        assert_eq!(classify(&cra), FrameworkKind::Cra);

        let next = DirectoryListing::from_names(["package.json"])
            .with_node(node(r#"{"scripts": {"dev": "next dev"}}"#));
        assert_eq!(classify(&next), FrameworkKind::NextJs);

        let vite = DirectoryListing::from_names(["package.json"])
            .with_node(node(r#"{"scripts": {"dev": "vite"}}"#));
        assert_eq!(classify(&vite), FrameworkKind::Vite);
    }

    #[test]
    fn test_build_script_is_not_a_marker() {
        let listing = DirectoryListing::from_names(["package.json"])
            .with_node(node(r#"{"scripts": {"build": "vite build"}}"#));
        assert_eq!(classify(&listing), FrameworkKind::Unknown);
    }

    #[test]
    fn test_python_dependencies() {
        let fastapi = DirectoryListing::from_names(["pyproject.toml"]).with_python(PythonManifest {
            dependencies: vec!["fastapi".to_string(), "flask".to_string()],
        });
        assert_eq!(classify(&fastapi), FrameworkKind::FastApi);

        let flask = DirectoryListing::from_names(["requirements.txt"]).with_python(PythonManifest {
            dependencies: vec!["flask".to_string()],
        });
        assert_eq!(classify(&flask), FrameworkKind::Flask);
    }

    #[test]
    fn test_express_fallback() {
        let listing = DirectoryListing::from_names(["package.json", "server.js"])
            .with_node(node(r#"{"scripts": {"start": "node server.js"}, "dependencies": {"express": "^4"}}"#));
        assert_eq!(classify(&listing), FrameworkKind::Express);
    }

    #[test]
    fn test_read_from_disk() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("vite.config.js"), "export default {}").unwrap();
        std::fs::write(temp.path().join("package.json"), "{ not json").unwrap();

        let listing = DirectoryListing::read(temp.path()).unwrap();
        assert!(listing.node.is_none());
        assert_eq!(classify(&listing), FrameworkKind::Vite);
    }
}
