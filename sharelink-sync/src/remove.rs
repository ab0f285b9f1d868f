//! Stale link removal with upward pruning of emptied directories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use sharelink_core::events;

use crate::action::LinkAction;
use crate::fsops::{self, DirOutcome};

/// Remove every link in `paths`, then prune parents that became empty.
///
/// Pruning walks upward from the link's parent and stops at the first
/// directory that is kept or fails to delete, or on reaching `home`, which is
/// never evaluated. A failed link deletion is logged and skipped.
///
/// With `dry_run` nothing is touched; see `preview_stale`.
pub fn remove_stale(paths: &BTreeSet<PathBuf>, home: &Path, dry_run: bool) -> Vec<LinkAction> {
    if dry_run {
        return preview_stale(paths, home, &mut BTreeSet::new());
    }

    let mut actions = Vec::new();
    for link in paths {
        if let Err(err) = fsops::remove_link(link) {
            tracing::warn!(
                code = events::REMOVE_FAILED,
                link = %link.display(),
                error = %err,
                "could not delete stale symlink"
            );
            actions.push(LinkAction::RemoveFailed {
                link: link.clone(),
                reason: err.to_string(),
            });
            continue;
        }

        tracing::info!(
            code = events::REMOVE_DELETED,
            link = %link.display(),
            "deleted symlink"
        );
        actions.push(LinkAction::Removed { link: link.clone() });
        prune_parents(link, home, &mut actions);
    }

    actions
}

fn prune_parents(link: &Path, home: &Path, actions: &mut Vec<LinkAction>) {
    let mut next = link.parent();
    while let Some(dir) = next {
        if dir == home || !dir.starts_with(home) {
            return;
        }
        match fsops::delete_empty_dir(dir) {
            DirOutcome::Deleted => actions.push(LinkAction::Pruned {
                dir: dir.to_path_buf(),
            }),
            DirOutcome::Purged => actions.push(LinkAction::Purged {
                dir: dir.to_path_buf(),
            }),
            DirOutcome::Kept | DirOutcome::Failed => return,
        }
        next = dir.parent();
    }
}

/// Report what [`remove_stale`] would do, including the pruning.
///
/// Every path the real run would delete is added to `gone`, so the create
/// preview can see which obstructions are already cleared.
pub(crate) fn preview_stale(
    paths: &BTreeSet<PathBuf>,
    home: &Path,
    gone: &mut BTreeSet<PathBuf>,
) -> Vec<LinkAction> {
    let mut actions = Vec::new();

    for link in paths {
        tracing::info!("[dry-run] would remove: {}", link.display());
        actions.push(LinkAction::WouldRemove { link: link.clone() });
        gone.insert(link.clone());

        let mut next = link.parent();
        while let Some(dir) = next {
            if dir == home || !dir.starts_with(home) {
                break;
            }
            let action = match fsops::preview_dir(dir, gone) {
                DirOutcome::Deleted => LinkAction::WouldPrune {
                    dir: dir.to_path_buf(),
                },
                DirOutcome::Purged => LinkAction::WouldPurge {
                    dir: dir.to_path_buf(),
                },
                DirOutcome::Kept | DirOutcome::Failed => break,
            };
            tracing::info!("[dry-run] {}: {}", action.label(), dir.display());
            actions.push(action);
            gone.insert(dir.to_path_buf());
            next = dir.parent();
        }
    }

    actions
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::symlink;

    use tempfile::TempDir;

    use super::*;
    use crate::fsops::STFS_MARKER;

    fn one(path: PathBuf) -> BTreeSet<PathBuf> {
        [path].into_iter().collect()
    }

    #[test]
    fn removes_link_but_not_target_contents() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        fs::write(share.path().join("data.csv"), "1,2").unwrap();
        let link = home.path().join("A");
        symlink(share.path(), &link).unwrap();

        let actions = remove_stale(&one(link.clone()), home.path(), false);
        assert_eq!(actions, vec![LinkAction::Removed { link: link.clone() }]);
        assert!(fs::symlink_metadata(&link).is_err());
        assert!(share.path().join("data.csv").exists());
        assert!(home.path().exists(), "home is never pruned");
    }

    #[test]
    fn prunes_empty_and_marker_only_parents_up_to_home() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let outer = home.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(inner.join(STFS_MARKER)).unwrap();
        let link = inner.join("link");
        symlink(share.path(), &link).unwrap();

        let actions = remove_stale(&one(link.clone()), home.path(), false);
        assert_eq!(
            actions,
            vec![
                LinkAction::Removed { link },
                LinkAction::Purged { dir: inner },
                LinkAction::Pruned { dir: outer },
            ]
        );
        assert!(home.path().is_dir());
    }

    #[test]
    fn pruning_stops_at_first_non_empty_directory() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let outer = home.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(&inner).unwrap();
        fs::write(outer.join("keep.txt"), "x").unwrap();
        let link = inner.join("link");
        symlink(share.path(), &link).unwrap();

        let actions = remove_stale(&one(link.clone()), home.path(), false);
        assert_eq!(
            actions,
            vec![
                LinkAction::Removed { link },
                LinkAction::Pruned { dir: inner },
            ]
        );
        assert!(outer.join("keep.txt").exists());
    }

    #[test]
    fn empty_home_is_left_in_place() {
        let root = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let home = root.path().join("acct");
        fs::create_dir(&home).unwrap();
        let link = home.join("A");
        symlink(share.path(), &link).unwrap();

        remove_stale(&one(link), &home, false);
        assert!(home.is_dir());
        let mut entries = fs::read_dir(&home).unwrap();
        assert!(entries.next().is_none());
    }

    #[test]
    fn failed_delete_is_recorded_and_others_continue() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let gone = home.path().join("already-gone");
        let real = home.path().join("real");
        symlink(share.path(), &real).unwrap();
        let paths: BTreeSet<PathBuf> = [gone.clone(), real.clone()].into_iter().collect();

        let actions = remove_stale(&paths, home.path(), false);
        assert!(matches!(&actions[0], LinkAction::RemoveFailed { link, .. } if link == &gone));
        assert_eq!(actions[1], LinkAction::Removed { link: real.clone() });
        assert!(fs::symlink_metadata(&real).is_err());
    }

    #[test]
    fn dry_run_touches_nothing() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let link = home.path().join("A");
        symlink(share.path(), &link).unwrap();

        let actions = remove_stale(&one(link.clone()), home.path(), true);
        assert_eq!(actions, vec![LinkAction::WouldRemove { link: link.clone() }]);
        assert!(fs::symlink_metadata(&link).is_ok());
    }

    #[test]
    fn dry_run_reports_pruning_once_the_last_link_goes() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let outer = home.path().join("outer");
        let inner = outer.join("inner");
        fs::create_dir_all(inner.join(STFS_MARKER)).unwrap();
        let first = inner.join("a");
        let second = inner.join("b");
        symlink(share.path(), &first).unwrap();
        symlink(share.path(), &second).unwrap();
        let paths: BTreeSet<PathBuf> = [first.clone(), second.clone()].into_iter().collect();

        let actions = remove_stale(&paths, home.path(), true);
        assert_eq!(
            actions,
            vec![
                LinkAction::WouldRemove { link: first.clone() },
                LinkAction::WouldRemove {
                    link: second.clone()
                },
                LinkAction::WouldPurge { dir: inner.clone() },
                LinkAction::WouldPrune { dir: outer.clone() },
            ]
        );
        assert!(fs::symlink_metadata(&first).is_ok());
        assert!(fs::symlink_metadata(&second).is_ok());
        assert!(inner.join(STFS_MARKER).is_dir());
    }

    #[test]
    fn failed_purge_stops_pruning_and_later_links_are_removed() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let outer = home.path().join("outer");
        let inner = outer.join("inner");
        let marker = inner.join(STFS_MARKER);
        fs::create_dir_all(&marker).unwrap();
        fs::write(marker.join("state"), "x").unwrap();
        let link = inner.join("link");
        symlink(share.path(), &link).unwrap();
        let later = home.path().join("z-later");
        symlink(share.path(), &later).unwrap();
        let paths: BTreeSet<PathBuf> = [link.clone(), later.clone()].into_iter().collect();

        let Some(_locked) = crate::testutil::ReadOnlyDir::lock(&marker) else {
            // running as root: the read-only marker would not stop the purge
            return;
        };
        let actions = remove_stale(&paths, home.path(), false);
        assert_eq!(
            actions,
            vec![
                LinkAction::Removed { link },
                LinkAction::Removed { link: later },
            ]
        );
        assert!(marker.join("state").exists());
        assert!(outer.is_dir(), "grandparent survives a failed purge");
    }
}
