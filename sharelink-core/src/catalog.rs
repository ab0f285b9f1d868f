//! YAML subscription catalog.
//!
//! # File format
//!
//! ```yaml
//! applications:
//!   - id: finance-drop
//!     notes: |
//!       owner: ops
//!       share = /srv/shares/finance
//! subscriptions:
//!   - account: alice
//!     application: finance-drop
//!     folder: /inbox/finance
//! ```
//!
//! # API pattern
//!
//! - `fn_at(path: &Path, …)`: explicit location; used in tests with `TempDir`
//! - `fn(…)`: derives `<home>/.sharelink/catalog.yaml` from `dirs::home_dir()`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, ConfigError, ResolveError};
use crate::resolver::MetadataSource;
use crate::types::{AccountId, Application, ApplicationId, Subscription};

/// On-disk catalog payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

/// In-memory catalog indexed by application id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    applications: HashMap<ApplicationId, Application>,
    subscriptions: Vec<Subscription>,
}

/// `<home>/.sharelink/catalog.yaml`: pure, no I/O.
pub fn catalog_path_at(home: &Path) -> PathBuf {
    home.join(".sharelink").join("catalog.yaml")
}

/// `catalog_path_at` for the operator's home directory.
pub fn catalog_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| catalog_path_at(&home))
        .ok_or(ConfigError::HomeNotFound)
}

impl Catalog {
    /// Load a catalog from `path`.
    ///
    /// Returns `CatalogError::CatalogNotFound` if absent,
    /// `CatalogError::Parse` (with path + line context) if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::CatalogNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: CatalogFile =
            serde_yaml::from_str(&contents).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from(file))
    }

    /// Application lookup without the trait indirection.
    pub fn get_application(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications.get(id)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        let applications = file
            .applications
            .into_iter()
            .map(|app| (app.id.clone(), app))
            .collect();
        Self {
            applications,
            subscriptions: file.subscriptions,
        }
    }
}

impl MetadataSource for Catalog {
    fn subscriptions(&self, account: &AccountId) -> Result<Vec<Subscription>, ResolveError> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|sub| &sub.account == account)
            .cloned()
            .collect())
    }

    fn application(&self, id: &ApplicationId) -> Result<Application, CatalogError> {
        self.get_application(id)
            .cloned()
            .ok_or_else(|| CatalogError::NoSuchApplication { id: id.clone() })
    }
}
