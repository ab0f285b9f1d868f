//! Reconciliation pipeline shared by `sharelink sync` and `sharelink status`.
//!
//! Phase order is fixed: survey and resolve, reconcile, remove, create.
//! Removal completes before any creation so a relinked path is never
//! recreated before its stale link is gone.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use sharelink_core::{
    events, resolve_desired, DesiredLink, MetadataSource, Rejection, ResolveError,
    SessionContext,
};

use crate::action::LinkAction;
use crate::create::{create_links, preview_links};
use crate::reconcile::{reconcile, Reconciliation};
use crate::remove::{preview_stale, remove_stale};
use crate::survey::survey;

/// Summary of one run. `completed` is `true` whenever the run finished,
/// however many individual items failed.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub account: String,
    pub home: PathBuf,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Number of symlinked directories found by the survey.
    pub discovered: usize,
    pub rejected: Vec<Rejection>,
    pub actions: Vec<LinkAction>,
    /// Set when the desired state could not be resolved; no mutations ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
    pub completed: bool,
}

impl RunReport {
    pub fn mutation_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_mutation()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_failure()).count()
    }
}

/// Read-only view used by `sharelink status`.
#[derive(Debug, Clone)]
pub struct Plan {
    pub discovered: BTreeSet<PathBuf>,
    pub rejected: Vec<Rejection>,
    pub reconciliation: Reconciliation,
}

/// Converge `home` onto `desired` and return every action taken.
///
/// This is the core entry point: no metadata source, no context, just the
/// home boundary and an already-resolved desired set.
pub fn reconcile_home(home: &Path, desired: Vec<DesiredLink>, dry_run: bool) -> Vec<LinkAction> {
    apply(home, survey(home), desired, dry_run)
}

/// Resolve the desired set for `ctx` from `source`, then reconcile.
pub fn run(ctx: &SessionContext, source: &dyn MetadataSource, dry_run: bool) -> RunReport {
    let started_at = Utc::now();
    let home = ctx.home();
    let discovered = survey(home);
    let discovered_count = discovered.len();

    let (rejected, actions, skipped) = match resolve_desired(source, ctx) {
        Ok(resolution) => {
            let actions = apply(home, discovered, resolution.desired, dry_run);
            (resolution.rejected, actions, None)
        }
        Err(err) => {
            tracing::warn!(
                code = events::RESOLVE_LIST_FAILED,
                account = %ctx.account(),
                error = %err,
                "could not resolve desired links; leaving home untouched"
            );
            (Vec::new(), Vec::new(), Some(err.to_string()))
        }
    };

    let report = RunReport {
        account: ctx.account().to_string(),
        home: home.to_path_buf(),
        dry_run,
        started_at,
        finished_at: Utc::now(),
        discovered: discovered_count,
        rejected,
        actions,
        skipped,
        completed: true,
    };
    tracing::info!(
        account = %report.account,
        discovered = report.discovered,
        mutations = report.mutation_count(),
        failures = report.failure_count(),
        "reconciliation finished"
    );
    report
}

/// Survey, resolve and reconcile without touching the filesystem.
pub fn plan(ctx: &SessionContext, source: &dyn MetadataSource) -> Result<Plan, ResolveError> {
    let discovered = survey(ctx.home());
    let resolution = resolve_desired(source, ctx)?;
    let reconciliation = reconcile(discovered.clone(), resolution.desired);
    Ok(Plan {
        discovered,
        rejected: resolution.rejected,
        reconciliation,
    })
}

fn apply(
    home: &Path,
    discovered: BTreeSet<PathBuf>,
    desired: Vec<DesiredLink>,
    dry_run: bool,
) -> Vec<LinkAction> {
    let reconciliation = reconcile(discovered, desired);

    let mut actions: Vec<LinkAction> = reconciliation
        .matched()
        .map(|link| LinkAction::Matched {
            link: link.link().to_path_buf(),
            target: link.target().to_path_buf(),
        })
        .collect();
    if dry_run {
        let mut gone = BTreeSet::new();
        actions.extend(preview_stale(&reconciliation.stale, home, &mut gone));
        actions.extend(preview_links(&reconciliation.missing, &gone));
    } else {
        actions.extend(remove_stale(&reconciliation.stale, home, false));
        actions.extend(create_links(&reconciliation.missing, false));
    }
    actions
}
