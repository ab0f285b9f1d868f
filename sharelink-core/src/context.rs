//! Account context for a reconciliation run.
//!
//! The invoking environment supplies the account id and its home directory.
//! [`SessionContext::resolve`] takes explicit overrides first, then reads
//! `SHARELINK_ACCOUNT_ID` and `SHARELINK_HOME_DIR`, falling back to `$USER`
//! and `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::AccountId;

pub const ACCOUNT_ENV: &str = "SHARELINK_ACCOUNT_ID";
pub const HOME_ENV: &str = "SHARELINK_HOME_DIR";

/// The account being reconciled and the home directory bounding every
/// filesystem mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    account: AccountId,
    home: PathBuf,
}

impl SessionContext {
    /// Build a context, rejecting relative home directories.
    pub fn new(account: AccountId, home: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let home = home.into();
        if !home.is_absolute() {
            return Err(ConfigError::RelativeHome { path: home });
        }
        Ok(Self { account, home })
    }

    /// Build a context from explicit overrides, then the environment.
    pub fn resolve(account: Option<String>, home: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve_with(account, home, |key| std::env::var(key).ok())
    }

    fn resolve_with(
        account: Option<String>,
        home: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let account = account
            .or_else(|| env(ACCOUNT_ENV))
            .or_else(|| env("USER"))
            .filter(|a| !a.trim().is_empty())
            .ok_or(ConfigError::AccountNotFound)?;
        let home = home
            .or_else(|| env(HOME_ENV).map(PathBuf::from))
            .or_else(dirs::home_dir)
            .ok_or(ConfigError::HomeNotFound)?;
        Self::new(AccountId::from(account), home)
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}
