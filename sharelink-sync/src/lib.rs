//! # sharelink-sync
//!
//! Survey, reconcile, remove and create share links under an account home.
//!
//! Call [`reconcile_home`] with an already-resolved desired link set, or
//! [`run`] to resolve the set from a [`sharelink_core::MetadataSource`]
//! first. Neither aborts on a single item's failure: every outcome is
//! recorded as a [`LinkAction`] and logged with an event code.

pub mod action;
pub mod create;
pub mod error;
mod fsops;
pub mod pipeline;
pub mod reconcile;
pub mod remove;
pub mod survey;

#[cfg(all(test, unix))]
mod testutil;

pub use action::LinkAction;
pub use error::SyncError;
pub use pipeline::{plan, reconcile_home, run, Plan, RunReport};
pub use reconcile::{reconcile, Reconciliation, Verdict};
