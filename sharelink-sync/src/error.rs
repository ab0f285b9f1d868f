//! Error types for sharelink-sync.

use std::path::PathBuf;

use thiserror::Error;

/// Per-item filesystem failures.
///
/// These never escape a phase: the phase logs them and records a failure
/// [`crate::LinkAction`] instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A path that should have a file name (link paths, rename sources) did not.
    #[error("path has no file name: {path}")]
    NoFileName { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
