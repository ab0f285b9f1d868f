//! Directory and link primitives shared by the remove and create phases.
//!
//! A directory whose only entry is `.stfs` counts as empty: it is purged
//! with its contents instead of being kept.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sharelink_core::events;

use crate::error::{io_err, SyncError};

/// Marker entry that does not keep a directory alive.
pub(crate) const STFS_MARKER: &str = ".stfs";

/// Result of [`delete_empty_dir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DirOutcome {
    /// Empty directory removed.
    Deleted,
    /// `.stfs`-only directory removed with its contents.
    Purged,
    /// Not a directory, or a directory with real content.
    Kept,
    /// Deletion or purge failed (already logged).
    Failed,
}

/// Delete `dir` if it is an empty (or `.stfs`-only) real directory.
///
/// Symlinks are never followed: a link to a directory is `Kept`.
pub(crate) fn delete_empty_dir(dir: &Path) -> DirOutcome {
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        _ => return DirOutcome::Kept,
    }

    let remove_err = match fs::remove_dir(dir) {
        Ok(()) => {
            tracing::info!(
                code = events::REMOVE_PRUNED,
                dir = %dir.display(),
                "deleted empty directory"
            );
            return DirOutcome::Deleted;
        }
        Err(err) => err,
    };

    match entry_names(dir) {
        Ok(names) if names.len() == 1 && names[0] == STFS_MARKER => purge_dir(dir),
        Ok(names) if !names.is_empty() => DirOutcome::Kept,
        Ok(_) | Err(_) => {
            tracing::warn!(
                code = events::REMOVE_DIR_FAILED,
                dir = %dir.display(),
                error = %remove_err,
                "could not delete directory"
            );
            DirOutcome::Failed
        }
    }
}

/// Recursively delete `dir` and everything beneath it without following links.
pub(crate) fn purge_dir(dir: &Path) -> DirOutcome {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::info!(
                code = events::REMOVE_PURGED,
                dir = %dir.display(),
                "purged marker-only directory"
            );
            DirOutcome::Purged
        }
        Err(err) => {
            tracing::warn!(
                code = events::REMOVE_PURGE_FAILED,
                dir = %dir.display(),
                error = %err,
                "could not purge directory"
            );
            DirOutcome::Failed
        }
    }
}

/// What [`delete_empty_dir`] would do to `dir`, without touching it.
///
/// Entries listed in `gone` are treated as already deleted, so a dry run can
/// chain through links and directories removed earlier in the same run.
pub(crate) fn preview_dir(dir: &Path, gone: &BTreeSet<PathBuf>) -> DirOutcome {
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        _ => return DirOutcome::Kept,
    }

    let names = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|e| !gone.contains(&e.path()))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>(),
        Err(_) => return DirOutcome::Failed,
    };

    match names.as_slice() {
        [] => DirOutcome::Deleted,
        [only] if only == STFS_MARKER => DirOutcome::Purged,
        _ => DirOutcome::Kept,
    }
}

/// Lowest free sibling `<name>.N` (N ≥ 1) of `path`.
///
/// Candidates are checked without following symlinks, so a dangling link
/// still occupies its name.
pub(crate) fn unique_name(path: &Path) -> Result<PathBuf, SyncError> {
    let name = path
        .file_name()
        .ok_or_else(|| SyncError::NoFileName {
            path: path.to_path_buf(),
        })?
        .to_string_lossy()
        .into_owned();

    let mut n = 1u32;
    let mut candidate = path.with_file_name(format!("{name}.{n}"));
    while fs::symlink_metadata(&candidate).is_ok() {
        n += 1;
        candidate = path.with_file_name(format!("{name}.{n}"));
    }
    Ok(candidate)
}

/// Move `path` to [`unique_name`].
pub(crate) fn rename_unique(path: &Path) -> Result<PathBuf, SyncError> {
    let candidate = unique_name(path)?;
    fs::rename(path, &candidate).map_err(|e| io_err(path, e))?;
    Ok(candidate)
}

/// Delete the link node itself, never its target.
pub(crate) fn remove_link(link: &Path) -> Result<(), SyncError> {
    remove_link_node(link).map_err(|e| io_err(link, e))
}

/// Create `link -> target` as a directory symlink.
pub(crate) fn create_dir_link(target: &Path, link: &Path) -> Result<(), SyncError> {
    symlink_dir(target, link).map_err(|e| io_err(link, e))
}

fn entry_names(dir: &Path) -> io::Result<Vec<String>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect()
}

#[cfg(unix)]
fn remove_link_node(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_link_node(link: &Path) -> io::Result<()> {
    // Directory symlinks are directories to the Win32 API.
    fs::remove_dir(link).or_else(|_| fs::remove_file(link))
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
