//! Outcome records for every decision a reconciliation run makes.

use std::path::PathBuf;

use serde::Serialize;

/// One applied (or, in dry-run mode, planned) change or check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LinkAction {
    /// Link already points at its target; nothing touched.
    Matched { link: PathBuf, target: PathBuf },
    /// Stale or orphan link deleted.
    Removed { link: PathBuf },
    /// Stale link could not be deleted; left for the next run.
    RemoveFailed { link: PathBuf, reason: String },
    /// Empty directory deleted (upward pruning or cleared obstruction).
    Pruned { dir: PathBuf },
    /// `.stfs`-only directory deleted with its contents.
    Purged { dir: PathBuf },
    /// Obstruction at a link path moved to a free `.N` sibling.
    RenamedAside { from: PathBuf, to: PathBuf },
    /// Obstruction could not be moved.
    RenameFailed { path: PathBuf, reason: String },
    /// New link created.
    Created { link: PathBuf, target: PathBuf },
    /// Link could not be created; left for the next run.
    CreateFailed {
        link: PathBuf,
        target: PathBuf,
        reason: String,
    },
    /// `--dry-run`: the link *would* have been removed.
    WouldRemove { link: PathBuf },
    /// `--dry-run`: the link *would* have been created.
    WouldCreate { link: PathBuf, target: PathBuf },
    /// `--dry-run`: the empty directory *would* have been deleted.
    WouldPrune { dir: PathBuf },
    /// `--dry-run`: the `.stfs`-only directory *would* have been purged.
    WouldPurge { dir: PathBuf },
    /// `--dry-run`: the obstruction *would* have been moved aside.
    WouldRenameAside { from: PathBuf, to: PathBuf },
}

impl LinkAction {
    /// `true` when the action changed the filesystem.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            LinkAction::Removed { .. }
                | LinkAction::Pruned { .. }
                | LinkAction::Purged { .. }
                | LinkAction::RenamedAside { .. }
                | LinkAction::Created { .. }
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            LinkAction::RemoveFailed { .. }
                | LinkAction::RenameFailed { .. }
                | LinkAction::CreateFailed { .. }
        )
    }

    /// Short lowercase label for human output.
    pub fn label(&self) -> &'static str {
        match self {
            LinkAction::Matched { .. } => "matched",
            LinkAction::Removed { .. } => "removed",
            LinkAction::RemoveFailed { .. } => "remove failed",
            LinkAction::Pruned { .. } => "pruned",
            LinkAction::Purged { .. } => "purged",
            LinkAction::RenamedAside { .. } => "renamed",
            LinkAction::RenameFailed { .. } => "rename failed",
            LinkAction::Created { .. } => "created",
            LinkAction::CreateFailed { .. } => "create failed",
            LinkAction::WouldRemove { .. } => "would remove",
            LinkAction::WouldCreate { .. } => "would create",
            LinkAction::WouldPrune { .. } => "would prune",
            LinkAction::WouldPurge { .. } => "would purge",
            LinkAction::WouldRenameAside { .. } => "would rename",
        }
    }
}
