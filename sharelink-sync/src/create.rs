//! Link creation with obstruction handling.
//!
//! Whatever already sits at a link path is either deleted (an empty or
//! `.stfs`-only directory) or renamed aside to `<name>.N`, so existing data
//! is never destroyed.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use sharelink_core::{events, DesiredLink};

use crate::action::LinkAction;
use crate::error::io_err;
use crate::fsops::{self, DirOutcome};

/// Create every link in `desired`, clearing obstructions first.
///
/// Failures are logged and recorded; the remaining entries are still
/// processed. With `dry_run` nothing is touched; see `preview_links`.
pub fn create_links(desired: &[DesiredLink], dry_run: bool) -> Vec<LinkAction> {
    if dry_run {
        return preview_links(desired, &BTreeSet::new());
    }

    let mut actions = Vec::new();
    for entry in desired {
        clear_obstruction(entry, &mut actions);
        actions.push(create_one(entry));
    }

    actions
}

/// Report what [`create_links`] would do, obstruction handling included.
///
/// Paths in `gone` are treated as already deleted by the remove phase.
pub(crate) fn preview_links(desired: &[DesiredLink], gone: &BTreeSet<PathBuf>) -> Vec<LinkAction> {
    let mut actions = Vec::new();

    for entry in desired {
        let path = entry.link();
        if !gone.contains(path) && fs::symlink_metadata(path).is_ok() {
            let cleared = match fsops::preview_dir(path, gone) {
                DirOutcome::Deleted => LinkAction::WouldPrune {
                    dir: path.to_path_buf(),
                },
                DirOutcome::Purged => LinkAction::WouldPurge {
                    dir: path.to_path_buf(),
                },
                DirOutcome::Kept | DirOutcome::Failed => match fsops::unique_name(path) {
                    Ok(to) => LinkAction::WouldRenameAside {
                        from: path.to_path_buf(),
                        to,
                    },
                    Err(err) => LinkAction::RenameFailed {
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    },
                },
            };
            tracing::info!("[dry-run] {}: {}", cleared.label(), path.display());
            actions.push(cleared);
        }

        tracing::info!("[dry-run] would link: {entry}");
        actions.push(LinkAction::WouldCreate {
            link: path.to_path_buf(),
            target: entry.target().to_path_buf(),
        });
    }

    actions
}

fn clear_obstruction(entry: &DesiredLink, actions: &mut Vec<LinkAction>) {
    let path = entry.link();
    if fs::symlink_metadata(path).is_err() {
        return;
    }

    match fsops::delete_empty_dir(path) {
        DirOutcome::Deleted => actions.push(LinkAction::Pruned {
            dir: path.to_path_buf(),
        }),
        DirOutcome::Purged => actions.push(LinkAction::Purged {
            dir: path.to_path_buf(),
        }),
        DirOutcome::Kept | DirOutcome::Failed => match fsops::rename_unique(path) {
            Ok(to) => {
                tracing::warn!(
                    code = events::CREATE_RENAMED,
                    from = %path.display(),
                    to = %to.display(),
                    "renamed existing entry out of the way"
                );
                actions.push(LinkAction::RenamedAside {
                    from: path.to_path_buf(),
                    to,
                });
            }
            Err(err) => {
                tracing::warn!(
                    code = events::CREATE_RENAME_FAILED,
                    path = %path.display(),
                    error = %err,
                    "unable to rename existing entry"
                );
                actions.push(LinkAction::RenameFailed {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        },
    }
}

fn create_one(entry: &DesiredLink) -> LinkAction {
    let failed = |reason: String| LinkAction::CreateFailed {
        link: entry.link().to_path_buf(),
        target: entry.target().to_path_buf(),
        reason,
    };

    if let Some(parent) = entry.link().parent() {
        if let Err(err) = fs::create_dir_all(parent).map_err(|e| io_err(parent, e)) {
            tracing::warn!(
                code = events::CREATE_PARENT_FAILED,
                link = %entry.link().display(),
                error = %err,
                "unable to create parent directory"
            );
            return failed(err.to_string());
        }
    }

    match fsops::create_dir_link(entry.target(), entry.link()) {
        Ok(()) => {
            tracing::info!(
                code = events::CREATE_LINKED,
                link = %entry.link().display(),
                target = %entry.target().display(),
                "linked"
            );
            LinkAction::Created {
                link: entry.link().to_path_buf(),
                target: entry.target().to_path_buf(),
            }
        }
        Err(err) => {
            tracing::warn!(
                code = events::CREATE_FAILED,
                link = %entry.link().display(),
                target = %entry.target().display(),
                error = %err,
                "unable to link"
            );
            failed(err.to_string())
        }
    }
}
