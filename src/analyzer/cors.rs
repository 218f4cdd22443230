//! CORS config locator
//!
//! Finds the file holding a project's CORS/CSRF allow-list, if the framework
//! has one the rewriter understands.

use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::scanner::SkipFilter;
use crate::types::FrameworkKind;

/// How deep below a project to look for the allow-list file
const CORS_SEARCH_DEPTH: usize = 4;

struct CorsLookup {
    patterns: &'static [&'static str],
    /// Substrings, any of which marks the file as relevant
    needles: &'static [&'static str],
    case_insensitive: bool,
}

fn lookup_for(framework: FrameworkKind) -> Option<CorsLookup> {
    match framework {
        FrameworkKind::Django => Some(CorsLookup {
            patterns: &[
                "**/settings.py",
                "**/settings/dev.py",
                "**/settings/local.py",
                "**/settings/base.py",
            ],
            needles: &["CORS", "CSRF_TRUSTED"],
            case_insensitive: false,
        }),
        FrameworkKind::FastApi => Some(CorsLookup {
            patterns: &["main.py", "app.py", "app/main.py", "src/main.py"],
            needles: &["cors"],
            case_insensitive: true,
        }),
        FrameworkKind::Express | FrameworkKind::NestJs => Some(CorsLookup {
            patterns: &["**/cors*.ts", "**/cors*.js", "**/app.ts", "**/main.ts", "**/index.ts"],
            needles: &["cors"],
            case_insensitive: true,
        }),
        _ => None,
    }
}

impl CorsLookup {
    fn mentions(&self, path: &Path) -> bool {
        let Ok(content) = fs::read_to_string(path) else {
            return false;
        };
        let haystack = if self.case_insensitive {
            content.to_lowercase()
        } else {
            content
        };
        self.needles.iter().any(|n| haystack.contains(n))
    }
}

/// First file matching the framework's patterns, in pattern order, that
/// mentions CORS
pub fn locate_cors_config(
    project_dir: &Path,
    framework: FrameworkKind,
    filter: &SkipFilter,
) -> Option<PathBuf> {
    let lookup = lookup_for(framework)?;

    let files: Vec<(PathBuf, PathBuf)> = filter
        .walker(project_dir, CORS_SEARCH_DEPTH, false)
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(project_dir).ok()?.to_path_buf();
            Some((relative, e.path().to_path_buf()))
        })
        .collect();

    for raw in lookup.patterns {
        let pattern = match Pattern::new(raw) {
            Ok(p) => p,
            Err(e) => {
                debug!("Bad CORS pattern {}: {}", raw, e);
                continue;
            }
        };

        let found = files
            .iter()
            .filter(|(relative, _)| matches_relative(&pattern, raw, relative))
            .find(|(_, absolute)| lookup.mentions(absolute));

        if let Some((_, absolute)) = found {
            debug!("CORS config for {}: {}", project_dir.display(), absolute.display());
            return Some(absolute.clone());
        }
    }

    None
}

/// `**/x` also matches `x` at the project root
fn matches_relative(pattern: &Pattern, raw: &str, relative: &Path) -> bool {
    if pattern.matches_path(relative) {
        return true;
    }
    raw.strip_prefix("**/")
        .and_then(|rest| Pattern::new(rest).ok())
        .is_some_and(|p| p.matches_path(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_django_settings() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "manage.py", "");
        touch(temp.path(), "mysite/settings.py", "CSRF_TRUSTED_ORIGINS = []\n");

        let found = locate_cors_config(temp.path(), FrameworkKind::Django, &SkipFilter::new());
        assert_eq!(found, Some(temp.path().join("mysite/settings.py")));
    }

    #[test]
    fn test_settings_without_cors_ignored() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "mysite/settings.py", "DEBUG = True\n");

        let found = locate_cors_config(temp.path(), FrameworkKind::Django, &SkipFilter::new());
        assert!(found.is_none());
    }

    #[test]
    fn test_gitignored_settings_found() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        touch(temp.path(), ".gitignore", "local.py\n");
        touch(temp.path(), "manage.py", "");
        touch(temp.path(), "mysite/settings/local.py", "CORS_ALLOWED_ORIGINS = []\n");

        let found = locate_cors_config(temp.path(), FrameworkKind::Django, &SkipFilter::new());
        assert_eq!(found, Some(temp.path().join("mysite/settings/local.py")));
    }

    #[test]
    fn test_fastapi_main() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "app.py", "print('hi')\n");
        touch(
            temp.path(),
            "app/main.py",
            "from fastapi.middleware.cors import CORSMiddleware\n",
        );

        let found = locate_cors_config(temp.path(), FrameworkKind::FastApi, &SkipFilter::new());
        assert_eq!(found, Some(temp.path().join("app/main.py")));
    }

    #[test]
    fn test_express_skips_node_modules() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "node_modules/cors/cors.js", "module.exports = cors");
        touch(temp.path(), "src/app.ts", "app.use(cors({ origin: [] }))");

        let found = locate_cors_config(temp.path(), FrameworkKind::Express, &SkipFilter::new());
        assert_eq!(found, Some(temp.path().join("src/app.ts")));
    }

    #[test]
    fn test_frontends_have_no_cors_config() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "main.ts", "cors");
        assert!(locate_cors_config(temp.path(), FrameworkKind::Vite, &SkipFilter::new()).is_none());
    }
}
