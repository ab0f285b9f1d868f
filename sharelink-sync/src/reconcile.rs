//! Diff desired links against surveyed links.
//!
//! Per desired link:
//! 1. `Matched`: surveyed and resolving to the desired target: dropped from
//!    both collections.
//! 2. `Mismatched`: surveyed but resolving elsewhere: kept in both, so it is
//!    removed and then recreated.
//! 3. `Unresolvable`: surveyed but resolution failed: same as `Mismatched`.
//! 4. `Missing`: not surveyed: kept in the desired list only.
//!
//! Surveyed links left over afterwards are stale and get removed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use sharelink_core::{events, DesiredLink};

/// Classification of one desired link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Verdict {
    Matched,
    Mismatched { actual: PathBuf },
    Unresolvable { reason: String },
    Missing,
}

/// Reduced working sets after reconciliation.
///
/// `stale` holds only links to remove and `missing` only links to create;
/// a correctly linked path appears in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub stale: BTreeSet<PathBuf>,
    pub missing: Vec<DesiredLink>,
    pub verdicts: Vec<(DesiredLink, Verdict)>,
}

impl Reconciliation {
    pub fn matched(&self) -> impl Iterator<Item = &DesiredLink> {
        self.verdicts
            .iter()
            .filter(|(_, verdict)| *verdict == Verdict::Matched)
            .map(|(link, _)| link)
    }

    /// Stale links that no desired entry will recreate.
    pub fn orphans(&self) -> impl Iterator<Item = &Path> {
        self.stale
            .iter()
            .filter(|path| !self.missing.iter().any(|d| d.link() == path.as_path()))
            .map(PathBuf::as_path)
    }
}

/// Reconcile `discovered` links against `desired` links.
pub fn reconcile(mut discovered: BTreeSet<PathBuf>, desired: Vec<DesiredLink>) -> Reconciliation {
    let mut missing = Vec::new();
    let mut verdicts = Vec::with_capacity(desired.len());

    for link in desired {
        let verdict = classify(&discovered, &link);
        match &verdict {
            Verdict::Matched => {
                tracing::debug!(
                    code = events::RECONCILE_MATCHED,
                    link = %link.link().display(),
                    target = %link.target().display(),
                    "shared folder is correct"
                );
                discovered.remove(link.link());
            }
            Verdict::Mismatched { actual } => {
                tracing::info!(
                    code = events::RECONCILE_MISMATCHED,
                    link = %link.link().display(),
                    actual = %actual.display(),
                    target = %link.target().display(),
                    "shared folder points elsewhere; will relink"
                );
                missing.push(link.clone());
            }
            Verdict::Unresolvable { reason } => {
                tracing::info!(
                    code = events::RECONCILE_UNRESOLVABLE,
                    link = %link.link().display(),
                    error = %reason,
                    "shared folder does not resolve; will relink"
                );
                missing.push(link.clone());
            }
            Verdict::Missing => {
                tracing::debug!(
                    code = events::RECONCILE_NEW,
                    link = %link.link().display(),
                    target = %link.target().display(),
                    "new shared folder"
                );
                missing.push(link.clone());
            }
        }
        verdicts.push((link, verdict));
    }

    Reconciliation {
        stale: discovered,
        missing,
        verdicts,
    }
}

fn classify(discovered: &BTreeSet<PathBuf>, link: &DesiredLink) -> Verdict {
    if !discovered.contains(link.link()) {
        return Verdict::Missing;
    }
    match std::fs::canonicalize(link.link()) {
        Ok(actual) if same_target(&actual, link.target()) => Verdict::Matched,
        Ok(actual) => Verdict::Mismatched { actual },
        Err(err) => Verdict::Unresolvable {
            reason: err.to_string(),
        },
    }
}

/// Compare a fully resolved link against a desired target.
///
/// Equal means equal after canonicalizing both sides, so a target reached
/// through a symlinked prefix (e.g. `/tmp` on macOS) still matches. A link
/// to `/real` therefore matches a desired `/alias -> /real` even though its
/// `read_link` differs from the desired path.
fn same_target(actual: &Path, desired: &Path) -> bool {
    actual == desired
        || std::fs::canonicalize(desired)
            .map(|canonical| canonical == actual)
            .unwrap_or(false)
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::os::unix::fs::symlink;

    use tempfile::TempDir;

    use super::*;

    fn set(paths: &[PathBuf]) -> BTreeSet<PathBuf> {
        paths.iter().cloned().collect()
    }

    #[test]
    fn matched_link_leaves_both_sets() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let link = home.path().join("D");
        symlink(share.path(), &link).unwrap();

        let rec = reconcile(set(&[link.clone()]), vec![DesiredLink::new(&link, share.path())]);
        assert!(rec.stale.is_empty());
        assert!(rec.missing.is_empty());
        assert_eq!(rec.matched().count(), 1);
    }

    #[test]
    fn trailing_slash_target_still_matches() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let link = home.path().join("D");
        symlink(share.path(), &link).unwrap();
        let target = PathBuf::from(format!("{}/", share.path().display()));

        let rec = reconcile(set(&[link.clone()]), vec![DesiredLink::new(&link, target)]);
        assert_eq!(rec.matched().count(), 1);
    }

    #[test]
    fn target_behind_alias_matches_link_to_real_directory() {
        let home = TempDir::new().unwrap();
        let shares = TempDir::new().unwrap();
        let real = shares.path().join("real");
        fs::create_dir(&real).unwrap();
        let alias = shares.path().join("alias");
        symlink(&real, &alias).unwrap();
        let link = home.path().join("D");
        symlink(&real, &link).unwrap();

        let rec = reconcile(set(&[link.clone()]), vec![DesiredLink::new(&link, &alias)]);
        assert_eq!(rec.matched().count(), 1);
        assert!(rec.stale.is_empty());
        assert_ne!(fs::read_link(&link).unwrap(), alias);
    }

    #[test]
    fn mismatched_link_stays_in_both_sets() {
        let home = TempDir::new().unwrap();
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        let link = home.path().join("A");
        symlink(old.path(), &link).unwrap();

        let desired = DesiredLink::new(&link, new.path());
        let rec = reconcile(set(&[link.clone()]), vec![desired.clone()]);
        assert!(rec.stale.contains(&link));
        assert_eq!(rec.missing, vec![desired]);
        assert!(matches!(rec.verdicts[0].1, Verdict::Mismatched { .. }));
        assert_eq!(rec.orphans().count(), 0);
    }

    #[test]
    fn unresolvable_link_is_treated_as_mismatch() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let link = home.path().join("broken");
        symlink(home.path().join("gone"), &link).unwrap();

        let desired = DesiredLink::new(&link, share.path());
        let rec = reconcile(set(&[link.clone()]), vec![desired.clone()]);
        assert!(rec.stale.contains(&link));
        assert_eq!(rec.missing, vec![desired]);
        assert!(matches!(rec.verdicts[0].1, Verdict::Unresolvable { .. }));
    }

    #[test]
    fn undiscovered_link_is_missing_only() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let desired = DesiredLink::new(home.path().join("B"), share.path());
        let rec = reconcile(BTreeSet::new(), vec![desired.clone()]);
        assert!(rec.stale.is_empty());
        assert_eq!(rec.missing, vec![desired]);
        assert_eq!(rec.verdicts[0].1, Verdict::Missing);
    }

    #[test]
    fn leftover_discovered_links_are_orphans() {
        let home = TempDir::new().unwrap();
        let share = TempDir::new().unwrap();
        let orphan = home.path().join("A");
        symlink(share.path(), &orphan).unwrap();
        fs::create_dir(home.path().join("unrelated")).unwrap();

        let rec = reconcile(set(&[orphan.clone()]), vec![]);
        assert_eq!(rec.orphans().collect::<Vec<_>>(), vec![orphan.as_path()]);
    }
}
