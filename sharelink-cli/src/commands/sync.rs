//! `sharelink sync`: converge the home directory onto the catalog.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use sharelink_sync::{pipeline, LinkAction, RunReport};

use super::ContextArgs;

/// Arguments for `sharelink sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Show what would change without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let ctx = self.context.session()?;
        let catalog = self.context.load_catalog()?;

        let report = pipeline::run(&ctx, &catalog, self.dry_run);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if let Some(reason) = &report.skipped {
        println!(
            "{prefix}{} '{}' — skipped: {reason}",
            "!".yellow(),
            report.account
        );
        return;
    }

    let mutations = report.mutation_count();
    let failures = report.failure_count();
    if report.actions.iter().all(|a| matches!(a, LinkAction::Matched { .. }))
        && report.rejected.is_empty()
    {
        println!("{prefix}✓ '{}' — nothing to do", report.account);
        return;
    }

    println!(
        "{prefix}✓ '{}' reconciled ({mutations} changed, {failures} failed, {} rejected)",
        report.account,
        report.rejected.len()
    );

    for action in &report.actions {
        match action {
            LinkAction::Matched { link, .. } => println!("  ·  {}", link.display()),
            LinkAction::Removed { link } => println!("  -  {}", link.display()),
            LinkAction::WouldRemove { link } => println!("  ~- {}", link.display()),
            LinkAction::Pruned { dir } | LinkAction::Purged { dir } => {
                println!("  -  {} ({})", dir.display(), action.label())
            }
            LinkAction::RenamedAside { from, to } => {
                println!("  ↷  {} → {}", from.display(), to.display())
            }
            LinkAction::Created { link, target } => {
                println!("  +  {} → {}", link.display(), target.display())
            }
            LinkAction::WouldCreate { link, target } => {
                println!("  ~+ {} → {}", link.display(), target.display())
            }
            LinkAction::WouldPrune { dir } | LinkAction::WouldPurge { dir } => {
                println!("  ~- {} ({})", dir.display(), action.label())
            }
            LinkAction::WouldRenameAside { from, to } => {
                println!("  ~↷ {} → {}", from.display(), to.display())
            }
            LinkAction::RemoveFailed { link, reason } => {
                println!("  {}  {}: {reason}", "✗".red(), link.display())
            }
            LinkAction::RenameFailed { path, reason } => {
                println!("  {}  {}: {reason}", "✗".red(), path.display())
            }
            LinkAction::CreateFailed { link, reason, .. } => {
                println!("  {}  {}: {reason}", "✗".red(), link.display())
            }
        }
    }

    for rejection in &report.rejected {
        println!("  {}  {}", "?".yellow(), describe_rejection(rejection));
    }
}

pub(crate) fn describe_rejection(rejection: &sharelink_core::Rejection) -> String {
    use sharelink_core::Rejection;

    match rejection {
        Rejection::ApplicationLookup {
            folder,
            application,
            message,
        } => format!("{folder}: application '{application}' unavailable ({message})"),
        Rejection::RootFolder { folder } => format!("{folder}: refusing to link the home root"),
        Rejection::EscapesHome { folder } => format!("{folder}: folder escapes home"),
        Rejection::RelativeTarget { folder, target } => {
            format!("{folder}: target {} is not absolute", target.display())
        }
        Rejection::MissingTarget { folder, target } => {
            format!("{folder}: target {} does not exist", target.display())
        }
        Rejection::DuplicateLink { folder, link } => {
            format!("{folder}: {} already claimed", link.display())
        }
    }
}
