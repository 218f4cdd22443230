use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{FunnelError, Result};

/// Replace `path` with `content` via a sibling temp file and rename.
///
/// Readers see either the old or the new file, never a partial write.
/// An existing file keeps its permissions.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::Builder::new()
        .prefix(".ts-funnel-")
        .tempfile_in(dir)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| FunnelError::Io(e.error))?;
    Ok(())
}

/// Reject edit targets that resolve outside the project directory
pub fn ensure_within(path: &Path, project: &Path) -> Result<PathBuf> {
    let unsafe_path = || FunnelError::UnsafePath {
        path: path.to_path_buf(),
        project: project.to_path_buf(),
    };

    let base = project.canonicalize().map_err(|_| unsafe_path())?;
    let target = path.canonicalize().map_err(|_| unsafe_path())?;

    if target.starts_with(&base) {
        Ok(target)
    } else {
        Err(unsafe_path())
    }
}
