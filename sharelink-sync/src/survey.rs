//! Filesystem survey: find every symlink-to-directory under a home tree.
//!
//! The walk never descends through a link, so self-referential or
//! cross-linked shares cannot loop and share contents are never scanned.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use sharelink_core::events;

/// Collect the absolute paths of all symlinks under `home` whose target is a
/// directory.
///
/// Traversal errors are logged and skipped; whatever was reachable is
/// returned. `home` itself is never part of the result.
pub fn survey(home: &Path) -> BTreeSet<PathBuf> {
    let mut found = BTreeSet::new();

    for entry in WalkDir::new(home).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| home.display().to_string());
                tracing::warn!(
                    code = events::SURVEY_ERROR,
                    path = %path,
                    error = %err,
                    "survey traversal error; continuing with partial results"
                );
                continue;
            }
        };

        if entry.path_is_symlink() && entry.path().is_dir() {
            tracing::debug!(
                code = events::SURVEY_FOUND,
                path = %entry.path().display(),
                "found shared folder"
            );
            found.insert(entry.into_path());
        }
    }

    found
}
