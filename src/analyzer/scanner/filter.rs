use ignore::{Walk, WalkBuilder};
use std::path::Path;

use crate::constants::scan::SKIP_DIRS;

/// Directory-name filter for dependency, build and hidden directories
#[derive(Debug, Clone, Default)]
pub struct SkipFilter {
    extra: Vec<String>,
}

impl SkipFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add directory names excluded on top of the built-in list
    pub fn with_extra<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_skipped_name(&self, name: &str) -> bool {
        name.starts_with('.') || SKIP_DIRS.contains(&name) || self.extra.iter().any(|e| e == name)
    }

    /// Sorted walker below `root` that never descends into skipped directories.
    ///
    /// With `respect_gitignore` off, only the skip list prunes the walk.
    pub fn walker(&self, root: &Path, max_depth: usize, respect_gitignore: bool) -> Walk {
        let filter = self.clone();

        WalkBuilder::new(root)
            .hidden(false)
            .ignore(respect_gitignore)
            .git_ignore(respect_gitignore)
            .git_global(false)
            .git_exclude(respect_gitignore)
            .follow_links(false)
            .max_depth(Some(max_depth))
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                // The walk root is never filtered, even if it is hidden
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && filter.is_skipped_name(&entry.file_name().to_string_lossy()))
            })
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_and_hidden() {
        let filter = SkipFilter::new();
        assert!(filter.is_skipped_name("node_modules"));
        assert!(filter.is_skipped_name(".venv"));
        assert!(filter.is_skipped_name(".cache"));
        assert!(!filter.is_skipped_name("frontend"));
    }

    #[test]
    fn test_extra_names() {
        let filter = SkipFilter::new().with_extra(["archive"]);
        assert!(filter.is_skipped_name("archive"));
        assert!(!filter.is_skipped_name("src"));
    }
}
