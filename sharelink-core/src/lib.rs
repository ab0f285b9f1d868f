//! sharelink core library: domain types, account context, metadata
//! catalog, and desired-state resolution.
//!
//! - [`types`]: newtypes and domain structs
//! - [`context`]: [`SessionContext`] (account + home directory)
//! - [`notes`]: `share=` directive parsing
//! - [`catalog`]: YAML-backed [`MetadataSource`]
//! - [`resolver`]: subscriptions → [`DesiredLink`]s
//! - [`events`]: log event codes shared across crates

pub mod catalog;
pub mod context;
pub mod error;
pub mod events;
pub mod notes;
pub mod resolver;
pub mod types;

pub use catalog::Catalog;
pub use context::SessionContext;
pub use error::{CatalogError, ConfigError, ResolveError};
pub use resolver::{resolve_desired, MetadataSource, Rejection, Resolution};
pub use types::{AccountId, Application, ApplicationId, DesiredLink, Subscription};
