//! Desired-state resolution: account subscriptions → [`DesiredLink`]s.
//!
//! Each subscription whose application notes carry a `share=` directive
//! becomes one desired link `home/<folder> -> <target>`, unless it is
//! rejected:
//!
//! 1. application lookup fails → [`Rejection::ApplicationLookup`]
//! 2. folder resolves to home itself (`/`, empty, `.`) → [`Rejection::RootFolder`]
//! 3. folder contains `..` → [`Rejection::EscapesHome`]
//! 4. target is relative → [`Rejection::RelativeTarget`]
//! 5. target is not an existing directory → [`Rejection::MissingTarget`]
//! 6. link path already claimed by an earlier subscription → [`Rejection::DuplicateLink`]
//!
//! Rejections never affect other subscriptions.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::context::SessionContext;
use crate::error::{CatalogError, ResolveError};
use crate::events;
use crate::notes::parse_share_directive;
use crate::types::{AccountId, Application, ApplicationId, DesiredLink, Subscription};

/// Source of subscription and application metadata.
pub trait MetadataSource {
    /// Every subscription held by `account`, in a stable order.
    fn subscriptions(&self, account: &AccountId) -> Result<Vec<Subscription>, ResolveError>;

    /// Look up a single application. `NoSuchApplication` skips only the
    /// subscription that referenced it.
    fn application(&self, id: &ApplicationId) -> Result<Application, CatalogError>;
}

/// Why a shared subscription did not become a desired link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    ApplicationLookup {
        folder: String,
        application: ApplicationId,
        message: String,
    },
    RootFolder {
        folder: String,
    },
    EscapesHome {
        folder: String,
    },
    RelativeTarget {
        folder: String,
        target: PathBuf,
    },
    MissingTarget {
        folder: String,
        target: PathBuf,
    },
    DuplicateLink {
        folder: String,
        link: PathBuf,
    },
}

/// Output of [`resolve_desired`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub desired: Vec<DesiredLink>,
    pub rejected: Vec<Rejection>,
}

/// Derive the desired link set for the context's account.
///
/// Only a failure to list subscriptions is returned as an error; everything
/// per subscription is logged and collected in [`Resolution::rejected`].
pub fn resolve_desired(
    source: &dyn MetadataSource,
    ctx: &SessionContext,
) -> Result<Resolution, ResolveError> {
    let subscriptions = source.subscriptions(ctx.account())?;
    let mut resolution = Resolution::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for sub in subscriptions {
        let app = match source.application(&sub.application) {
            Ok(app) => app,
            Err(err) => {
                tracing::warn!(
                    code = events::RESOLVE_LOOKUP_FAILED,
                    folder = %sub.folder,
                    application = %sub.application,
                    error = %err,
                    "application lookup failed; subscription skipped"
                );
                resolution.rejected.push(Rejection::ApplicationLookup {
                    folder: sub.folder,
                    application: sub.application,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let Some(target) = parse_share_directive(&app.notes) else {
            continue;
        };

        match resolve_one(ctx.home(), &sub.folder, PathBuf::from(target)) {
            Ok(link) if !claimed.insert(link.link().to_path_buf()) => {
                tracing::warn!(
                    code = events::RESOLVE_DUPLICATE,
                    folder = %sub.folder,
                    link = %link.link().display(),
                    "link path already claimed by another subscription"
                );
                resolution.rejected.push(Rejection::DuplicateLink {
                    folder: sub.folder,
                    link: link.link().to_path_buf(),
                });
            }
            Ok(link) => {
                tracing::debug!(
                    code = events::RESOLVE_SHARED,
                    folder = %sub.folder,
                    target = %link.target().display(),
                    "subscription is shared"
                );
                resolution.desired.push(link);
            }
            Err(rejection) => resolution.rejected.push(rejection),
        }
    }

    Ok(resolution)
}

fn resolve_one(home: &Path, folder: &str, target: PathBuf) -> Result<DesiredLink, Rejection> {
    let relative = match home_relative(folder) {
        Ok(relative) => relative,
        Err(rejection) => {
            match &rejection {
                Rejection::RootFolder { .. } => tracing::warn!(
                    code = events::RESOLVE_ROOT_FOLDER,
                    folder,
                    "subscription folder is the home root; refusing to link"
                ),
                _ => tracing::warn!(
                    code = events::RESOLVE_ESCAPES_HOME,
                    folder,
                    "subscription folder escapes the home directory"
                ),
            }
            return Err(rejection);
        }
    };

    if !target.is_absolute() {
        tracing::warn!(
            code = events::RESOLVE_RELATIVE_TARGET,
            folder,
            target = %target.display(),
            "share target is not an absolute path; ignored"
        );
        return Err(Rejection::RelativeTarget {
            folder: folder.to_string(),
            target,
        });
    }

    // Only directories are surveyed back, so a file target could never
    // reconcile as matched.
    if !target.is_dir() {
        tracing::warn!(
            code = events::RESOLVE_MISSING_TARGET,
            folder,
            target = %target.display(),
            "share target is not an existing directory; ignored"
        );
        return Err(Rejection::MissingTarget {
            folder: folder.to_string(),
            target,
        });
    }

    Ok(DesiredLink::new(home.join(relative), target))
}

/// Normalise a metadata folder path into a path relative to home.
///
/// Root and current-dir components are dropped so `/inbox` and `inbox` both
/// land at `home/inbox`. An empty result would make home itself the link.
fn home_relative(folder: &str) -> Result<PathBuf, Rejection> {
    let mut relative = PathBuf::new();
    for component in Path::new(folder).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                return Err(Rejection::EscapesHome {
                    folder: folder.to_string(),
                })
            }
            Component::Normal(part) => relative.push(part),
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(Rejection::RootFolder {
            folder: folder.to_string(),
        });
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct FakeSource {
        subscriptions: Vec<Subscription>,
        applications: HashMap<ApplicationId, Application>,
        fail_listing: bool,
    }

    impl FakeSource {
        fn with(mut self, folder: &str, app: &str, notes: Option<&str>) -> Self {
            self.subscriptions.push(Subscription {
                account: AccountId::from("alice"),
                application: ApplicationId::from(app),
                folder: folder.to_string(),
            });
            if let Some(notes) = notes {
                self.applications.insert(
                    ApplicationId::from(app),
                    Application {
                        id: ApplicationId::from(app),
                        name: None,
                        notes: notes.to_string(),
                    },
                );
            }
            self
        }
    }

    impl MetadataSource for FakeSource {
        fn subscriptions(&self, account: &AccountId) -> Result<Vec<Subscription>, ResolveError> {
            if self.fail_listing {
                return Err(ResolveError {
                    account: account.clone(),
                    message: "backend offline".into(),
                });
            }
            Ok(self.subscriptions.clone())
        }

        fn application(&self, id: &ApplicationId) -> Result<Application, CatalogError> {
            self.applications
                .get(id)
                .cloned()
                .ok_or_else(|| CatalogError::NoSuchApplication { id: id.clone() })
        }
    }

    fn ctx(home: &Path) -> SessionContext {
        SessionContext::new(AccountId::from("alice"), home).expect("ctx")
    }

    #[test]
    fn shared_subscription_becomes_desired_link() {
        let home = TempDir::new().expect("home");
        let share = TempDir::new().expect("share");
        let notes = format!("owner: ops\nshare = {}\n", share.path().display());
        let source = FakeSource::default().with("/inbox/finance", "finance", Some(&notes));

        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert!(resolution.rejected.is_empty());
        assert_eq!(
            resolution.desired,
            vec![DesiredLink::new(
                home.path().join("inbox").join("finance"),
                share.path()
            )]
        );
    }

    #[test]
    fn unshared_subscription_is_ignored_silently() {
        let home = TempDir::new().expect("home");
        let source = FakeSource::default().with("/plain", "plain", Some("just a description"));
        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert!(resolution.desired.is_empty());
        assert!(resolution.rejected.is_empty());
    }

    #[test]
    fn root_folder_is_rejected() {
        let home = TempDir::new().expect("home");
        let share = TempDir::new().expect("share");
        let notes = format!("share={}", share.path().display());
        let source = FakeSource::default()
            .with("/", "a", Some(&notes))
            .with("", "b", Some(&notes))
            .with("/./", "c", Some(&notes));

        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert!(resolution.desired.is_empty());
        assert_eq!(resolution.rejected.len(), 3);
        assert!(resolution
            .rejected
            .iter()
            .all(|r| matches!(r, Rejection::RootFolder { .. })));
    }

    #[test]
    fn parent_components_are_rejected() {
        let home = TempDir::new().expect("home");
        let share = TempDir::new().expect("share");
        let notes = format!("share={}", share.path().display());
        let source = FakeSource::default().with("/inbox/../../etc", "a", Some(&notes));

        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert!(resolution.desired.is_empty());
        assert!(matches!(
            resolution.rejected[0],
            Rejection::EscapesHome { .. }
        ));
    }

    #[test]
    fn missing_and_relative_targets_are_rejected() {
        let home = TempDir::new().expect("home");
        let gone = home.path().join("does-not-exist");
        let source = FakeSource::default()
            .with("/a", "a", Some(&format!("share={}", gone.display())))
            .with("/b", "b", Some("share=relative/share"));

        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert!(resolution.desired.is_empty());
        assert_eq!(
            resolution.rejected,
            vec![
                Rejection::MissingTarget {
                    folder: "/a".into(),
                    target: gone,
                },
                Rejection::RelativeTarget {
                    folder: "/b".into(),
                    target: PathBuf::from("relative/share"),
                },
            ]
        );
    }

    #[test]
    fn lookup_failure_skips_only_that_subscription() {
        let home = TempDir::new().expect("home");
        let share = TempDir::new().expect("share");
        let notes = format!("share={}", share.path().display());
        let source = FakeSource::default()
            .with("/broken", "ghost", None)
            .with("/ok", "ok", Some(&notes));

        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert_eq!(resolution.desired.len(), 1);
        assert_eq!(resolution.desired[0].link(), home.path().join("ok"));
        assert!(matches!(
            resolution.rejected[0],
            Rejection::ApplicationLookup { .. }
        ));
    }

    #[test]
    fn first_subscription_wins_a_duplicate_link() {
        let home = TempDir::new().expect("home");
        let first = TempDir::new().expect("first");
        let second = TempDir::new().expect("second");
        let source = FakeSource::default()
            .with("/x", "a", Some(&format!("share={}", first.path().display())))
            .with("x", "b", Some(&format!("share={}", second.path().display())));

        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert_eq!(resolution.desired.len(), 1);
        assert_eq!(resolution.desired[0].target(), first.path());
        assert!(matches!(
            resolution.rejected[0],
            Rejection::DuplicateLink { .. }
        ));
    }

    #[test]
    fn listing_failure_is_returned() {
        let home = TempDir::new().expect("home");
        let source = FakeSource {
            fail_listing: true,
            ..FakeSource::default()
        };
        let err = resolve_desired(&source, &ctx(home.path())).unwrap_err();
        assert!(err.to_string().contains("backend offline"));
    }

    #[test]
    fn file_target_is_treated_as_missing() {
        let home = TempDir::new().expect("home");
        let file = home.path().join("note.txt");
        fs::write(&file, "x").expect("write");
        let source =
            FakeSource::default().with("/n", "n", Some(&format!("share={}", file.display())));
        let resolution = resolve_desired(&source, &ctx(home.path())).expect("resolve");
        assert!(resolution.desired.is_empty());
        assert!(matches!(
            resolution.rejected[0],
            Rejection::MissingTarget { .. }
        ));
    }
}
