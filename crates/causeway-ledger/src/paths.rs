//! Project path resolution.
//!
//! Review hosts name projects hierarchically with `/` separators. The
//! ledger maps that hierarchy onto the filesystem: the segments before the
//! last separator become a directory chain under the ledger root, and the
//! final segment names the store file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LedgerError;

/// File extension for per-project ledger stores.
const STORE_EXT: &str = "db";

/// Resolves the store file path for `project` under `root`.
///
/// `proj1` maps to `<root>/proj1.db`; `team/service` maps to
/// `<root>/team/service.db`. Nesting is unbounded: every separator but the
/// last contributes a directory level.
pub(crate) fn store_path(root: &Path, project: &str) -> PathBuf {
    let (parent, tail) = match project.rsplit_once('/') {
        Some((parent, tail)) => (Some(parent), tail),
        None => (None, project),
    };

    let mut path = root.to_path_buf();
    if let Some(parent) = parent {
        path.push(parent);
    }
    path.push(format!("{tail}.{STORE_EXT}"));
    path
}

/// Creates the store file's parent directories if they are missing.
///
/// Already-existing directories are success: two first-writers racing to
/// create a brand-new project's directory chain must both succeed. Any
/// other failure (permissions, a plain file where a directory should be)
/// surfaces as [`LedgerError::Unavailable`].
pub(crate) fn ensure_parent_dirs(store_path: &Path) -> Result<(), LedgerError> {
    let Some(dir) = store_path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).map_err(|source| LedgerError::Unavailable {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_project_lives_under_root() {
        let path = store_path(Path::new("/var/lib/causeway"), "proj1");
        assert_eq!(path, Path::new("/var/lib/causeway/proj1.db"));
    }

    #[test]
    fn hierarchical_project_gets_parent_directories() {
        let path = store_path(Path::new("/var/lib/causeway"), "team/service");
        assert_eq!(path, Path::new("/var/lib/causeway/team/service.db"));

        let deep = store_path(Path::new("/var/lib/causeway"), "org/team/service");
        assert_eq!(deep, Path::new("/var/lib/causeway/org/team/service.db"));
    }

    #[test]
    fn parent_creation_is_idempotent() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        let path = store_path(dir.path(), "org/team/service");

        ensure_parent_dirs(&path).expect("first creation should succeed");
        ensure_parent_dirs(&path).expect("repeat creation should succeed");

        assert!(dir.path().join("org/team").is_dir());
    }

    #[test]
    fn parent_collision_with_file_is_unavailable() {
        let dir = tempfile::tempdir().expect("should create tempdir");
        std::fs::write(dir.path().join("team"), b"not a directory")
            .expect("should write blocking file");

        let path = store_path(dir.path(), "team/service");
        let err = ensure_parent_dirs(&path).expect_err("creation should fail");

        match err {
            LedgerError::Unavailable { path, .. } => {
                assert!(path.ends_with("team"), "unexpected path: {}", path.display())
            }
            other => panic!("unexpected error type: {other:?}"),
        }
    }
}
