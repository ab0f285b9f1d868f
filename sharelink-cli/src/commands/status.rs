//! `sharelink status`: per-link reconciliation state, read-only.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sharelink_core::Rejection;
use sharelink_sync::{pipeline, Plan, Verdict};

use super::{sync::describe_rejection, ContextArgs};

/// Arguments for `sharelink status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub context: ContextArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let ctx = self.context.session()?;
        let catalog = self.context.load_catalog()?;
        let plan = pipeline::plan(&ctx, &catalog)
            .with_context(|| format!("could not resolve shares for '{}'", ctx.account()))?;

        let rows = build_rows(ctx.home(), &plan);
        if self.json {
            print_json(&rows, &plan.rejected)?;
            return Ok(());
        }

        print_table(ctx.account().to_string(), rows, &plan.rejected);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct LinkRow {
    #[tabled(rename = "link")]
    link: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "detail")]
    detail: String,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    links: &'a [LinkRow],
    rejected: &'a [Rejection],
}

fn build_rows(home: &Path, plan: &Plan) -> Vec<LinkRow> {
    let display = |path: &Path| {
        path.strip_prefix(home)
            .unwrap_or(path)
            .display()
            .to_string()
    };

    let mut rows: Vec<LinkRow> = plan
        .reconciliation
        .verdicts
        .iter()
        .map(|(link, verdict)| {
            let (state, detail) = match verdict {
                Verdict::Matched => ("ok", link.target().display().to_string()),
                Verdict::Mismatched { actual } => (
                    "stale",
                    format!(
                        "points at {}, want {}",
                        actual.display(),
                        link.target().display()
                    ),
                ),
                Verdict::Unresolvable { reason } => ("broken", reason.clone()),
                Verdict::Missing => ("missing", link.target().display().to_string()),
            };
            LinkRow {
                link: display(link.link()),
                state: state.to_string(),
                detail,
            }
        })
        .collect();

    rows.extend(plan.reconciliation.orphans().map(|path| LinkRow {
        link: display(path),
        state: "orphan".to_string(),
        detail: "no subscription; will be removed".to_string(),
    }));
    rows
}

fn print_json(rows: &[LinkRow], rejected: &[Rejection]) -> Result<()> {
    let payload = StatusJson {
        links: rows,
        rejected,
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_table(account: String, rows: Vec<LinkRow>, rejected: &[Rejection]) {
    if rows.is_empty() && rejected.is_empty() {
        println!("No shared folders for '{account}'.");
        return;
    }

    let pending = rows.iter().filter(|r| r.state != "ok").count();
    let summary = if pending == 0 {
        format!("✓ '{account}' is up to date").green().to_string()
    } else {
        format!("! '{account}' has {pending} link(s) to fix")
            .yellow()
            .to_string()
    };
    println!("{summary}");

    if !rows.is_empty() {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    for rejection in rejected {
        println!("  {}  {}", "?".yellow(), describe_rejection(rejection));
    }
}
