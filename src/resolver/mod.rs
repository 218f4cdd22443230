//! Port Conflict Resolution
//!
//! Groups classified projects by effective port and, for every group with
//! more than one member, keeps the anchor (smallest path) on its port and
//! moves everyone else to the lowest free port at or above their own
//! framework default.
//!
//! Groups are processed in ascending port order and members in path order,
//! so the plan depends only on the set of projects, never on scan order.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use crate::constants::files::{DEFAULT_ENV_PORT_KEY, ENV_FILE};
use crate::constants::ports::{DEFAULT_SEARCH_WINDOW, MAX_PORT};
use crate::types::{
    ConfigFile, ConfigFileKind, ExposureMode, PlanEntry, PortConflict, Project, ReconciliationPlan,
    RewriteTarget, UnresolvedConflict,
};

pub struct ConflictResolver {
    search_window: u16,
    mode: ExposureMode,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_WINDOW)
    }
}

impl ConflictResolver {
    /// `search_window` bounds the replacement search to `[default, default + window]`
    pub fn new(search_window: u16) -> Self {
        Self {
            search_window,
            mode: ExposureMode::default(),
        }
    }

    /// Exposure mode recorded on every plan this resolver produces
    pub fn with_mode(mut self, mode: ExposureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn resolve(&self, projects: &[Project]) -> ReconciliationPlan {
        let mut classified: Vec<(&Project, u16)> = projects
            .iter()
            .filter(|p| p.framework().is_known())
            .filter_map(|p| p.effective_port().map(|port| (p, port)))
            .collect();
        classified.sort_by(|a, b| a.0.path.cmp(&b.0.path));

        let mut groups: BTreeMap<u16, Vec<&Project>> = BTreeMap::new();
        let mut taken: BTreeSet<u16> = BTreeSet::new();
        let mut plan = ReconciliationPlan::default().with_mode(self.mode);

        for (project, port) in &classified {
            groups.entry(*port).or_default().push(project);
            taken.insert(*port);
            plan.assignments.insert(project.path.clone(), *port);
        }

        for (port, members) in &groups {
            let Some((anchor, displaced)) = members.split_first() else {
                continue;
            };
            if displaced.is_empty() {
                continue;
            }

            info!(
                "Port {} shared by {} projects; {} keeps it",
                port,
                members.len(),
                anchor.path.display()
            );

            plan.conflicts.push(PortConflict {
                port: *port,
                anchor: anchor.path.clone(),
                displaced: displaced.iter().map(|p| p.path.clone()).collect(),
            });

            for project in displaced {
                let start = project.framework().default_port().unwrap_or(*port);
                let end = self.search_end(start);

                match (start..=end).find(|candidate| !taken.contains(candidate)) {
                    Some(new_port) => {
                        taken.insert(new_port);
                        plan.assignments.insert(project.path.clone(), new_port);
                        plan.entries.push(PlanEntry {
                            project: project.path.clone(),
                            framework: project.framework(),
                            old_port: *port,
                            new_port,
                            target: rewrite_target(project),
                        });
                    }
                    None => {
                        warn!(
                            "No free port for {} in {}-{}",
                            project.path.display(),
                            start,
                            end
                        );
                        plan.unresolved.push(UnresolvedConflict {
                            project: project.path.clone(),
                            port: *port,
                            searched_from: start,
                            searched_to: end,
                        });
                    }
                }
            }
        }

        plan
    }

    fn search_end(&self, start: u16) -> u16 {
        start.saturating_add(self.search_window).min(MAX_PORT)
    }
}

/// The file that declared the port, else the first config file as an insertion
fn rewrite_target(project: &Project) -> RewriteTarget {
    if let Some(declared) = &project.declared {
        return RewriteTarget {
            file: declared.file.clone(),
            key: declared.key.clone(),
            existing: true,
        };
    }

    let file = project
        .config_files
        .iter()
        .find(|f| f.kind.accepts_insert())
        .or_else(|| project.config_files.first())
        .cloned()
        .unwrap_or_else(|| ConfigFile::new(project.path.join(ENV_FILE), ConfigFileKind::DotEnv));

    RewriteTarget {
        file,
        key: DEFAULT_ENV_PORT_KEY.to_string(),
        existing: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeclaredPort, FrameworkKind};
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn project(path: &str, framework: FrameworkKind) -> Project {
        Project::new(path, framework).with_config_files(vec![ConfigFile::new(
            format!("{}/.env", path),
            ConfigFileKind::DotEnv,
        )])
    }

    fn declared(path: &str, framework: FrameworkKind, port: u16) -> Project {
        let file = ConfigFile::new(format!("{}/.env", path), ConfigFileKind::DotEnv);
        project(path, framework).with_declared(DeclaredPort {
            port,
            file,
            key: "PORT".to_string(),
        })
    }

    #[test]
    fn test_plan_carries_mode() {
        let projects = vec![project("/p/web", FrameworkKind::Vite)];
        let plan = ConflictResolver::default()
            .with_mode(ExposureMode::Serve)
            .resolve(&projects);
        assert_eq!(plan.mode, ExposureMode::Serve);
        assert_eq!(ConflictResolver::default().resolve(&projects).mode, ExposureMode::Funnel);
    }

    #[test]
    fn test_two_next_apps() {
        let projects = vec![
            project("/p/appB", FrameworkKind::NextJs),
            project("/p/appA", FrameworkKind::NextJs),
        ];

        let plan = ConflictResolver::default().resolve(&projects);

        assert_eq!(plan.conflicts.len(), 1);
        assert_eq!(plan.conflicts[0].anchor, PathBuf::from("/p/appA"));
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/appA")], 3000);
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/appB")], 3001);

        let entry = &plan.entries[0];
        assert_eq!(entry.project, PathBuf::from("/p/appB"));
        assert_eq!((entry.old_port, entry.new_port), (3000, 3001));
        assert_eq!(entry.target.file.path, PathBuf::from("/p/appB/.env"));
        assert_eq!(entry.target.key, "PORT");
        assert!(!entry.target.existing);
    }

    #[test]
    fn test_no_conflicts() {
        let projects = vec![
            project("/p/web", FrameworkKind::Vite),
            project("/p/api", FrameworkKind::Django),
        ];
        let plan = ConflictResolver::default().resolve(&projects);
        assert!(plan.is_clean());
        assert_eq!(plan.final_ports().len(), 2);
    }

    #[test]
    fn test_skips_ports_used_elsewhere() {
        // 3001 is already an effective port, so the displaced app lands on 3002
        let projects = vec![
            project("/p/a", FrameworkKind::NextJs),
            project("/p/b", FrameworkKind::Express),
            declared("/p/c", FrameworkKind::Nuxt, 3001),
        ];
        let plan = ConflictResolver::default().resolve(&projects);
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/b")], 3002);
    }

    #[test]
    fn test_multiple_groups_never_collide() {
        let projects = vec![
            project("/p/a", FrameworkKind::NextJs),
            project("/p/b", FrameworkKind::NextJs),
            declared("/p/c", FrameworkKind::Express, 4000),
            declared("/p/d", FrameworkKind::Express, 4000),
        ];
        let plan = ConflictResolver::default().resolve(&projects);

        // Both displaced projects search up from 3000; the second takes 3002
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/b")], 3001);
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/d")], 3002);

        let d = plan.entry_for(std::path::Path::new("/p/d")).unwrap();
        assert!(d.target.existing);
        assert_eq!(d.old_port, 4000);
    }

    #[test]
    fn test_search_starts_at_displaced_framework_default() {
        // A Vite app declared on 8000 collides with Django; it moves back to 5173
        let projects = vec![
            project("/p/api", FrameworkKind::Django),
            declared("/p/web", FrameworkKind::Vite, 8000),
        ];
        let plan = ConflictResolver::default().resolve(&projects);
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/api")], 8000);
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/web")], 5173);
    }

    #[test]
    fn test_unknown_never_participates() {
        let unknown = declared("/p/a-misc", FrameworkKind::Unknown, 3000);
        let projects = vec![unknown, project("/p/b", FrameworkKind::NextJs)];
        let plan = ConflictResolver::default().resolve(&projects);
        assert!(plan.is_clean());
        assert!(!plan.final_ports().contains_key(&PathBuf::from("/p/a-misc")));
    }

    #[test]
    fn test_exhausted_window_is_unresolved() {
        let projects = vec![
            project("/p/a", FrameworkKind::Flask),
            project("/p/b", FrameworkKind::Flask),
            declared("/p/c", FrameworkKind::Django, 5001),
        ];
        let plan = ConflictResolver::new(1).resolve(&projects);

        assert!(plan.entries.is_empty());
        assert_eq!(plan.unresolved.len(), 1);
        let unresolved = &plan.unresolved[0];
        assert_eq!(unresolved.project, PathBuf::from("/p/b"));
        assert_eq!((unresolved.searched_from, unresolved.searched_to), (5000, 5001));
        // Still mapped to its current port
        assert_eq!(plan.final_ports()[&PathBuf::from("/p/b")], 5000);
    }

    #[test]
    fn test_manifest_declaration_is_target() {
        let manifest = ConfigFile::new("/p/b/package.json", ConfigFileKind::PackageJson);
        let b = project("/p/b", FrameworkKind::NextJs).with_declared(DeclaredPort {
            port: 3000,
            file: manifest.clone(),
            key: "scripts.dev".to_string(),
        });
        let projects = vec![project("/p/a", FrameworkKind::NextJs), b];

        let plan = ConflictResolver::default().resolve(&projects);
        let entry = &plan.entries[0];
        assert_eq!(entry.target.file, manifest);
        assert_eq!(entry.target.key, "scripts.dev");
        assert!(entry.target.existing);
    }

    const FRAMEWORKS: &[FrameworkKind] = &[
        FrameworkKind::Nuxt,
        FrameworkKind::NextJs,
        FrameworkKind::Vite,
        FrameworkKind::Django,
        FrameworkKind::Flask,
        FrameworkKind::Express,
        FrameworkKind::Unknown,
    ];

    fn arb_projects() -> impl Strategy<Value = Vec<Project>> {
        prop::collection::btree_map(
            "[a-h]{1,3}",
            (0..FRAMEWORKS.len(), prop::option::of(2990u16..3010)),
            0..24,
        )
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(name, (fw, port))| {
                    let path = format!("/p/{}", name);
                    match port {
                        Some(port) => declared(&path, FRAMEWORKS[fw], port),
                        None => project(&path, FRAMEWORKS[fw]),
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_final_ports_are_unique(projects in arb_projects()) {
            let plan = ConflictResolver::default().resolve(&projects);
            prop_assert!(plan.unresolved.is_empty());

            let ports: Vec<u16> = plan.final_ports().values().copied().collect();
            let unique: BTreeSet<u16> = ports.iter().copied().collect();
            prop_assert_eq!(ports.len(), unique.len());
        }

        #[test]
        fn prop_order_does_not_matter(projects in arb_projects(), seed in any::<u64>()) {
            let mut shuffled = projects.clone();
            let len = shuffled.len();
            if len > 1 {
                shuffled.rotate_left((seed as usize) % len);
                shuffled.reverse();
            }

            let a = ConflictResolver::default().resolve(&projects);
            let b = ConflictResolver::default().resolve(&shuffled);
            prop_assert_eq!(a, b);
        }
    }
}
