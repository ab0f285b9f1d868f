pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use sharelink_core::{
    catalog,
    context::{ACCOUNT_ENV, HOME_ENV},
    Catalog, SessionContext,
};

/// Account and metadata selection shared by every subcommand.
#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Account home directory (defaults to the current user's home).
    #[arg(long, env = HOME_ENV)]
    pub home: Option<PathBuf>,

    /// Account identifier (defaults to `$USER`).
    #[arg(long, env = ACCOUNT_ENV)]
    pub account: Option<String>,

    /// Subscription catalog YAML (defaults to `~/.sharelink/catalog.yaml`).
    #[arg(long, env = "SHARELINK_CATALOG")]
    pub catalog: Option<PathBuf>,
}

impl ContextArgs {
    pub fn session(&self) -> Result<SessionContext> {
        SessionContext::resolve(self.account.clone(), self.home.clone())
            .context("could not determine account context")
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        let path = match &self.catalog {
            Some(path) => path.clone(),
            None => catalog::catalog_path().context("could not locate default catalog")?,
        };
        Catalog::load_at(&path).with_context(|| format!("failed to load {}", path.display()))
    }
}
