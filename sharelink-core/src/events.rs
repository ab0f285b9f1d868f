//! Event codes attached to every reconciliation log line as the `code` field.
//!
//! Codes are grouped by phase: `SL1xx` survey, `SL2xx` resolve,
//! `SL3xx` reconcile, `SL4xx` remove, `SL5xx` create.

pub const SURVEY_FOUND: &str = "SL100";
pub const SURVEY_ERROR: &str = "SL101";

pub const RESOLVE_SHARED: &str = "SL200";
pub const RESOLVE_MISSING_TARGET: &str = "SL201";
pub const RESOLVE_ROOT_FOLDER: &str = "SL202";
pub const RESOLVE_ESCAPES_HOME: &str = "SL203";
pub const RESOLVE_LOOKUP_FAILED: &str = "SL204";
pub const RESOLVE_DUPLICATE: &str = "SL205";
pub const RESOLVE_LIST_FAILED: &str = "SL206";
pub const RESOLVE_RELATIVE_TARGET: &str = "SL207";

pub const RECONCILE_MATCHED: &str = "SL300";
pub const RECONCILE_MISMATCHED: &str = "SL301";
pub const RECONCILE_UNRESOLVABLE: &str = "SL302";
pub const RECONCILE_NEW: &str = "SL303";

pub const REMOVE_DELETED: &str = "SL400";
pub const REMOVE_FAILED: &str = "SL401";
pub const REMOVE_PRUNED: &str = "SL402";
pub const REMOVE_PURGED: &str = "SL403";
pub const REMOVE_PURGE_FAILED: &str = "SL404";
pub const REMOVE_DIR_FAILED: &str = "SL405";

pub const CREATE_LINKED: &str = "SL500";
pub const CREATE_FAILED: &str = "SL501";
pub const CREATE_RENAMED: &str = "SL502";
pub const CREATE_RENAME_FAILED: &str = "SL503";
pub const CREATE_PARENT_FAILED: &str = "SL504";
