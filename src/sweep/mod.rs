//! The archive-then-delete sweep.
//!
//! One pass per invocation:
//! 1. Compute the retention cutoff (midnight UTC, `retention_days` ago)
//! 2. Stream qualifying messages oldest-first, writing each with its
//!    delivery events into the current archive file
//! 3. When the file's message budget is reached, rotate: close the file,
//!    upload it, remove the local copy, then delete exactly the guids
//!    written to that file
//! 4. Final flush/upload/delete for the last partial file
//! 5. Purge bulk-class messages through the dedicated, archival-free path
//! 6. Report counts and file names
//!
//! Deletion never precedes a successful upload. A failure anywhere aborts
//! the run; completed rotation cycles stay archived-and-deleted, the rest of
//! the data is untouched, and re-running with the same cutoff is safe.

mod cutoff;
mod report;
mod runner;

pub use cutoff::retention_cutoff;
pub use report::{SweepOutcome, SweepReport};
pub use runner::ArchiveSweep;
use thiserror::Error;

use crate::{archive::ArchiveError, config::ConfigError, db::DbError, storage::UploadError};

/// Fatal sweep failures. None are retried within a run; retry policy belongs
/// to the invoking scheduler.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Could not reach the database. Raised before any deletion.
    #[error("Database connection failed: {0}")]
    Connect(#[source] DbError),

    #[error("Database query failed: {0}")]
    Query(#[from] DbError),

    /// Local archive write failed; the broken file is never uploaded and
    /// its records are never deleted.
    #[error("Archive write failed: {0}")]
    Archive(#[from] ArchiveError),

    /// Upload failed; the delete that would have followed is not attempted.
    #[error("Upload of archive {file} failed: {source}")]
    Upload {
        file: String,
        #[source]
        source: UploadError,
    },

    /// Delete failed after a successful upload. Leaves an archived-but-not-
    /// deleted file: the one tolerated inconsistency (a later run archives
    /// the same records again, never the other way around).
    #[error("Delete after archiving {file} failed: {source}")]
    Delete {
        file: String,
        #[source]
        source: DbError,
    },
}
