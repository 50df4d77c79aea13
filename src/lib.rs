//! Retention sweep for mail delivery logs.
//!
//! `mailsweep` finds message records older than a configurable cutoff,
//! archives them together with their delivery events to object storage as
//! CSV, and only then deletes them from the live database. Bulk mail is
//! purged through a dedicated path without archival.
//!
//! The sweep is a single sequential pass per invocation; the scheduler that
//! runs the binary owns periodicity and retries. Re-running with the same
//! cutoff is always safe: records are deleted only after their archive file
//! has been uploaded, so an aborted run leaves the database as it was before
//! the interrupted rotation cycle.

pub mod archive;
pub mod config;
pub mod db;
pub mod models;
pub mod observability;
pub mod storage;
pub mod sweep;
