//! Helpers for tests that need a filesystem operation to fail.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Makes a directory read-only until dropped.
pub(crate) struct ReadOnlyDir(PathBuf);

impl ReadOnlyDir {
    /// Returns `None` when the mode is not enforced (root ignores it), so the
    /// caller can skip its failure assertions.
    pub(crate) fn lock(dir: &Path) -> Option<Self> {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).unwrap();
        let guard = Self(dir.to_path_buf());
        let check = dir.join(".write-check");
        if fs::create_dir(&check).is_ok() {
            fs::remove_dir(&check).unwrap();
            return None;
        }
        Some(guard)
    }
}

impl Drop for ReadOnlyDir {
    fn drop(&mut self) {
        let _ = fs::set_permissions(&self.0, fs::Permissions::from_mode(0o755));
    }
}
