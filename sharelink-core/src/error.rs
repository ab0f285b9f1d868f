//! Error types for sharelink-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AccountId, ApplicationId};

/// Errors building the account context for a run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No account identifier was supplied and none could be inferred.
    #[error("no account id; set SHARELINK_ACCOUNT_ID or pass --account")]
    AccountNotFound,

    /// `dirs::home_dir()` returned `None` and no explicit home was given.
    #[error("cannot determine home directory; set SHARELINK_HOME_DIR or pass --home")]
    HomeNotFound,

    /// Home directories must be absolute so link paths are absolute too.
    #[error("home directory must be an absolute path, got {path}")]
    RelativeHome { path: PathBuf },
}

/// Errors from the YAML metadata catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying I/O failure reading the catalog.
    #[error("I/O error reading catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and serde_yaml context.
    #[error("failed to parse catalog at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The catalog file did not exist at the expected path.
    #[error("catalog not found at {path}")]
    CatalogNotFound { path: PathBuf },

    /// A subscription references an application the catalog does not define.
    #[error("no such application '{id}'")]
    NoSuchApplication { id: ApplicationId },
}

/// Failure to enumerate an account's subscriptions at all.
///
/// Per-subscription problems never surface here; they become
/// [`crate::Rejection`]s instead.
#[derive(Debug, Error)]
#[error("could not list subscriptions for account '{account}': {message}")]
pub struct ResolveError {
    pub account: AccountId,
    pub message: String,
}
