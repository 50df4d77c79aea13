//! CSV archival of message groups with file rotation.
//!
//! Each archive file holds one row per (message, delivery event) pair, with
//! the message columns repeated for every event. A message with no events
//! still produces exactly one row, carrying [`NO_EVENTS_PLACEHOLDER`] in the
//! event-type column, and still joins the file's delete manifest.
//!
//! Quoting of delimiter-bearing payload fields is handled by the `csv`
//! writer; rows are never hand-joined strings.

mod writer;

use std::path::PathBuf;

use thiserror::Error;
pub use writer::ArchiveWriter;

/// Marker written in place of event fields for a message with no delivery
/// events.
pub const NO_EVENTS_PLACEHOLDER: &str = "no events associated with this email";

/// Errors while writing an archive file. Fatal to the sweep: the broken
/// file is never uploaded and its records are never deleted.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive serialization error: {0}")]
    Csv(#[from] csv::Error),
}

/// A closed archive file, ready for upload.
///
/// `manifest` is the exact set of message guids written to this file, in
/// write order; the delete that follows a successful upload is scoped to
/// precisely this set.
#[derive(Debug)]
pub struct FinishedFile {
    pub path: PathBuf,
    pub name: String,
    pub manifest: Vec<String>,
    pub rows: u64,
}
