//! Schedule loading error types.

use std::path::PathBuf;

/// Errors from reading a schedule snapshot.
///
/// Inconsistent individual records are not errors: they are skipped and
/// counted in the load report. Only an unreadable snapshot fails.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The snapshot file could not be read
    #[error("failed to read schedule snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON of the expected shape
    #[error("failed to parse schedule snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
