//! sharelink: converge an account's shared folder symlinks.
//!
//! # Usage
//!
//! ```text
//! sharelink sync   [--home <dir>] [--account <id>] [--catalog <file>] [--dry-run] [--json]
//! sharelink status [--home <dir>] [--account <id>] [--catalog <file>] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "sharelink",
    version,
    about = "Reconcile shared folder symlinks in an account home directory",
    long_about = None,
)]
struct Cli {
    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove stale share links and create missing ones.
    Sync(SyncArgs),

    /// Show each share link's state without changing anything.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
